use serde::{Deserialize, Serialize};

use super::language_types::{LanguageType, ValueType};

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct TypeSection {
    pub entries: Vec<TypeEntry>,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct TypeEntry {
    pub form: LanguageType, // almost certainly 'func'
    pub params: Vec<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<ValueType>,
}

impl TypeEntry {
    pub fn func(params: Vec<ValueType>, return_type: Option<ValueType>) -> TypeEntry {
        TypeEntry {
            form: LanguageType::Func,
            params,
            return_type,
        }
    }
}
