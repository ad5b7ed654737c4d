use serde::{Deserialize, Serialize};

use super::language_types::Instruction;

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct DataSection {
    pub entries: Vec<DataSegment>,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct DataSegment {
    pub index: u32, // memory index, 0 in wasm 1.0
    pub offset: Instruction,
    pub data: Vec<u8>,
}
