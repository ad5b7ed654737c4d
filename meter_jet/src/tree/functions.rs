use serde::{Deserialize, Serialize};

/// Type indices of the functions defined by the module, in code section order.
#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct FunctionSection {
    pub entries: Vec<u32>,
}
