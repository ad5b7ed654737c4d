use serde::{Deserialize, Serialize};

use super::language_types::ExternalKind;

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct ExportSection {
    pub entries: Vec<ExportEntry>,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct ExportEntry {
    pub field: String,
    pub kind: ExternalKind,
    pub index: u32,
}
