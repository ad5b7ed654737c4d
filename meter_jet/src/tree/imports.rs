use serde::{Deserialize, Serialize};

use super::language_types::{GlobalType, ResizableLimits, TableType};

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct ImportSection {
    pub entries: Vec<ImportEntry>,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct ImportEntry {
    pub module: String,
    pub field: String,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Function(u32), // index into the type section
    Table(TableType),
    Memory(ResizableLimits),
    Global(GlobalType),
}

impl ImportEntry {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, ImportKind::Function(_))
    }
}
