use serde::{Deserialize, Serialize};

use super::language_types::Instruction;

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct ElementSection {
    pub entries: Vec<ElementSegment>,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct ElementSegment {
    pub index: u32, // table index, 0 in wasm 1.0
    pub offset: Instruction,
    pub elements: Vec<u32>,
}
