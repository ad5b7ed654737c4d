use serde::{Deserialize, Serialize};

use super::language_types::TableType;

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct TableSection {
    pub entries: Vec<TableType>,
}
