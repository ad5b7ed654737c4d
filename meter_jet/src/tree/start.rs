use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct StartSection {
    pub index: u32,
}
