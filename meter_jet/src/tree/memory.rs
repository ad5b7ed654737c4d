use serde::{Deserialize, Serialize};

use super::language_types::ResizableLimits;

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct MemorySection {
    pub entries: Vec<ResizableLimits>,
}
