use serde::{Deserialize, Serialize};

use super::language_types::{Instruction, ValueType};

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct CodeSection {
    pub entries: Vec<FunctionBody>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct FunctionBody {
    pub locals: Vec<LocalEntry>,
    pub code: Vec<Instruction>,
}

/// `count` consecutive locals of the same type.
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct LocalEntry {
    pub count: u32,
    #[serde(rename = "type")]
    pub ty: ValueType,
}
