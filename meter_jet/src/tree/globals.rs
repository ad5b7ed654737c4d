use serde::{Deserialize, Serialize};

use super::language_types::{GlobalType, Instruction};

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct GlobalSection {
    pub entries: Vec<GlobalEntry>,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct GlobalEntry {
    #[serde(rename = "type")]
    pub ty: GlobalType,
    pub init: Instruction,
}
