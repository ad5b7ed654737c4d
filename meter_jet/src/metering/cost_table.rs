use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tree::code::LocalEntry;
use crate::tree::language_types::Instruction;
use crate::tree::types::TypeEntry;

/// Key consulted when a table has no entry for the name being priced.
pub const DEFAULT_KEY: &str = "DEFAULT";

/// A node of a cost table: either a flat cost or a nested table.
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cost {
    Flat(u64),
    Table(CostTable),
}

impl From<u64> for Cost {
    fn from(cost: u64) -> Cost {
        Cost::Flat(cost)
    }
}

impl From<CostTable> for Cost {
    fn from(table: CostTable) -> Cost {
        Cost::Table(table)
    }
}

impl Cost {
    /// The node for `key` one level down. A flat cost stands in for a table
    /// that charges it for every key, so it is its own child.
    pub fn child(&self, key: &str) -> Option<&Cost> {
        match self {
            Cost::Flat(_) => Some(self),
            Cost::Table(table) => table.get(key),
        }
    }

    /// The cost of a single leaf named `key`. A nested table where a number
    /// is expected charges nothing.
    pub fn charge(&self, key: &str) -> u64 {
        match self.child(key) {
            Some(Cost::Flat(cost)) => *cost,
            _ => 0,
        }
    }
}

/// Names mapped to costs, loaded from JSON documents shaped like
/// `{"type": {...}, "code": {"locals": {...}, "code": {"i32.add": 1}}}`.
#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostTable {
    entries: BTreeMap<String, Cost>,
}

impl CostTable {
    pub fn new() -> CostTable {
        CostTable::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<CostTable> {
        serde_json::from_str(json)
    }

    pub fn insert<C: Into<Cost>>(&mut self, key: &str, cost: C) {
        self.entries.insert(key.to_string(), cost.into());
    }

    pub fn with<C: Into<Cost>>(mut self, key: &str, cost: C) -> CostTable {
        self.insert(key, cost);
        self
    }

    fn flat(costs: &[(&str, u64)]) -> CostTable {
        costs.iter().fold(CostTable::new(), |table, (key, cost)| table.with(key, *cost))
    }

    /// The entry for `key`, falling back to `DEFAULT`.
    pub fn get(&self, key: &str) -> Option<&Cost> {
        self.entries.get(key).or_else(|| self.entries.get(DEFAULT_KEY))
    }

    /// The `type` sub-table, used to price function signatures.
    pub fn signatures(&self) -> Option<&Cost> {
        self.get("type")
    }

    /// The `code.locals` sub-table.
    pub fn locals(&self) -> Option<&Cost> {
        self.get("code").and_then(|code| code.child("locals"))
    }

    /// The `code.code` sub-table, keyed by instruction name.
    pub fn instructions(&self) -> Option<&Cost> {
        self.get("code").and_then(|code| code.child("code"))
    }

    /// Sum of the `form`, `params` and `return_type` costs of a signature.
    pub fn signature_cost(&self, entry: &TypeEntry) -> u64 {
        let table = match self.signatures() {
            Some(table) => table,
            None => return 0,
        };
        let form = table.child("form").map_or(0, |form| form.charge(entry.form.name()));
        let params = table.child("params").map_or(0, |params| {
            entry.params.iter()
                .map(|param| params.charge(param.name()))
                .fold(0u64, u64::saturating_add)
        });
        let return_type = match (table.child("return_type"), entry.return_type) {
            (Some(returns), Some(return_type)) => returns.charge(return_type.name()),
            _ => 0,
        };
        form.saturating_add(params).saturating_add(return_type)
    }

    /// Every declared local is charged the cost of its type.
    pub fn locals_cost(&self, locals: &[LocalEntry]) -> u64 {
        let table = match self.locals() {
            Some(table) => table,
            None => return 0,
        };
        locals.iter()
            .map(|local| (local.count as u64).saturating_mul(table.charge(local.ty.name())))
            .fold(0, u64::saturating_add)
    }

    /// Looked up by qualified name (`i32.add`), then bare name (`add`), then `DEFAULT`.
    pub fn instruction_cost(&self, instruction: &Instruction) -> u64 {
        match self.instructions() {
            Some(Cost::Flat(cost)) => *cost,
            Some(Cost::Table(table)) => {
                let full_name = instruction.full_name();
                let cost = table.entries.get(&*full_name)
                    .or_else(|| table.entries.get(&instruction.name))
                    .or_else(|| table.entries.get(DEFAULT_KEY));
                match cost {
                    Some(Cost::Flat(cost)) => *cost,
                    _ => 0,
                }
            }
            None => 0,
        }
    }

    /// The table used when no other is configured.
    pub fn builtin() -> CostTable {
        let signatures = CostTable::new()
            .with("params", CostTable::new().with(DEFAULT_KEY, 1))
            .with("return_type", CostTable::new().with(DEFAULT_KEY, 1));

        let instructions = CostTable::flat(&[
            ("unreachable", 1),
            ("nop", 1),
            ("block", 1),
            ("loop", 1),
            ("if", 1),
            ("else", 90),
            ("br", 90),
            ("br_if", 90),
            ("br_table", 120),
            ("return", 90),
            ("call", 90),
            ("call_indirect", 10000),
            ("drop", 120),
            ("select", 120),
            ("get_local", 120),
            ("set_local", 120),
            ("tee_local", 120),
            ("get_global", 120),
            ("set_global", 120),
            ("load", 120),
            ("load8_s", 120),
            ("load8_u", 120),
            ("load16_s", 120),
            ("load16_u", 120),
            ("load32_s", 120),
            ("load32_u", 120),
            ("store", 120),
            ("store8", 120),
            ("store16", 120),
            ("store32", 120),
            ("current_memory", 100),
            ("grow_memory", 10000),
            ("const", 1),
            ("add", 45),
            ("sub", 45),
            ("mul", 45),
            ("div_s", 36000),
            ("div_u", 36000),
            ("rem_s", 36000),
            ("rem_u", 36000),
            ("and", 45),
            ("or", 45),
            ("xor", 45),
            ("shl", 67),
            ("shr_s", 67),
            ("shr_u", 67),
            ("rotl", 90),
            ("rotr", 90),
            ("eqz", 45),
            ("eq", 45),
            ("ne", 45),
            ("lt_s", 45),
            ("lt_u", 45),
            ("le_s", 45),
            ("le_u", 45),
            ("gt_s", 45),
            ("gt_u", 45),
            ("ge_s", 45),
            ("ge_u", 45),
            ("clz", 45),
            ("ctz", 45),
            ("popcnt", 45),
            ("end", 0),
        ]);

        let code = CostTable::new()
            .with("locals", CostTable::new().with(DEFAULT_KEY, 1))
            .with("code", instructions);

        CostTable::new()
            .with("type", signatures)
            .with("code", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::language_types::ValueType;

    #[test]
    fn loads_nested_tables_from_json() {
        let table = CostTable::from_json(r#"{"code": {"code": {"i32.add": 3, "DEFAULT": 1}}}"#).unwrap();
        let expected = CostTable::new().with(
            "code",
            CostTable::new().with("code", CostTable::new().with("i32.add", 3).with(DEFAULT_KEY, 1)),
        );
        assert_eq!(table, expected);
        assert!(CostTable::from_json(r#"{"code": "cheap"}"#).is_err());
    }

    #[test]
    fn instruction_lookup_order() {
        let table = CostTable::new().with(
            "code",
            CostTable::new().with(
                "code",
                CostTable::new().with("i64.add", 7).with("add", 5).with(DEFAULT_KEY, 2),
            ),
        );
        assert_eq!(table.instruction_cost(&Instruction::typed(ValueType::I64, "add")), 7);
        assert_eq!(table.instruction_cost(&Instruction::typed(ValueType::I32, "add")), 5);
        assert_eq!(table.instruction_cost(&Instruction::new("nop")), 2);
        assert_eq!(CostTable::new().instruction_cost(&Instruction::new("nop")), 0);
    }

    #[test]
    fn flat_cost_applies_to_every_element() {
        let table = CostTable::new()
            .with("type", CostTable::new().with("params", 2))
            .with("code", CostTable::new().with("locals", 3).with("code", 4));
        let signature = TypeEntry::func(vec![ValueType::I32, ValueType::F64], Some(ValueType::I32));
        assert_eq!(table.signature_cost(&signature), 4);
        let locals = [
            LocalEntry { count: 2, ty: ValueType::I32 },
            LocalEntry { count: 1, ty: ValueType::I64 },
        ];
        assert_eq!(table.locals_cost(&locals), 9);
        assert_eq!(table.instruction_cost(&Instruction::new("drop")), 4);
    }

    #[test]
    fn default_applies_at_the_top_level_too() {
        let table = CostTable::new().with(DEFAULT_KEY, 1);
        let signature = TypeEntry::func(vec![ValueType::I32], None);
        // form 1 + one param 1
        assert_eq!(table.signature_cost(&signature), 2);
        assert_eq!(table.instruction_cost(&Instruction::new("nop")), 1);
    }

    #[test]
    fn builtin_prices_common_instructions() {
        let table = CostTable::builtin();
        assert_eq!(table.instruction_cost(&Instruction::typed(ValueType::I32, "add")), 45);
        assert_eq!(table.instruction_cost(&Instruction::new("end")), 0);
        assert_eq!(table.locals_cost(&[LocalEntry { count: 4, ty: ValueType::F32 }]), 4);
        assert_eq!(table.signature_cost(&TypeEntry::func(vec![ValueType::I32], Some(ValueType::I32))), 2);
    }
}
