use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct CustomSection {
    #[serde(rename = "section_name")]
    pub name: String,
    pub payload: Vec<u8>,
}
