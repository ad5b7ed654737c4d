//! Gas metering: every block of straight-line code is prefixed with a call
//! to an imported function that is charged the block's cost up front.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::opcodes;
use crate::text::{TextError, TextParser};
use crate::tree::code::FunctionBody;
use crate::tree::imports::{ImportEntry, ImportKind};
use crate::tree::language_types::{ExternalKind, Immediate, Instruction, ValueType};
use crate::tree::section::{Section, SectionId};
use crate::tree::types::TypeEntry;
use crate::tree::Module;

pub mod cost_table;

pub use self::cost_table::{Cost, CostTable};

#[derive(Debug, Error)]
pub enum MeteringError {
    #[error("module already imports the metering function {module}.{field}")]
    DuplicateImport { module: String, field: String },
    #[error("no signature for function body {0}")]
    MissingSignature(usize),
    #[error("cost {cost} does not fit in an {meter_type}")]
    CostOverflow { cost: u64, meter_type: ValueType },
    #[error("function index {0} cannot be shifted past the metering import")]
    IndexOverflow(u32),
    #[error("invalid metering statement: {0}")]
    Text(#[from] TextError),
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct MeterOptions {
    pub cost_table: CostTable,
    pub import_module: String,
    pub import_field: String,
    pub meter_type: ValueType,
}

impl Default for MeterOptions {
    fn default() -> MeterOptions {
        MeterOptions {
            cost_table: CostTable::builtin(),
            import_module: "metering".to_string(),
            import_field: "usegas".to_string(),
            meter_type: ValueType::I32,
        }
    }
}

pub struct Metering<'o> {
    options: &'o MeterOptions,
    text: TextParser,
}

impl<'o> Metering<'o> {
    pub fn new(options: &'o MeterOptions) -> Metering<'o> {
        Metering {
            options,
            text: TextParser::new(),
        }
    }

    /// Returns a metered copy of `module`; `module` itself is never modified.
    pub fn meter(&mut self, module: &Module) -> Result<Module, MeteringError> {
        let mut module = module.clone();
        for id in [SectionId::Type, SectionId::Import] {
            if !module.has_section(id) {
                if let Some(section) = Section::empty(id) {
                    module.insert_section(section);
                }
            }
        }

        let meter_index = self.inject_import(&mut module)?;
        remap_references(&mut module, meter_index)?;

        let start_costs = self.start_costs(&module)?;
        let overhead = self.overhead()?;
        if let Some(code) = module.code_mut() {
            for (body, start_cost) in code.entries.iter_mut().zip(start_costs) {
                body.code = self.meter_body(body, start_cost, overhead, meter_index)?;
            }
        }
        Ok(module)
    }

    /// Adds the metering signature and import. Returns the function index
    /// of the import.
    fn inject_import(&self, module: &mut Module) -> Result<u32, MeteringError> {
        let options = self.options;
        let meter_index = module.function_import_count();

        if let Some(imports) = module.imports() {
            let duplicate = imports.entries.iter()
                .any(|entry| entry.module == options.import_module && entry.field == options.import_field);
            if duplicate {
                return Err(MeteringError::DuplicateImport {
                    module: options.import_module.clone(),
                    field: options.import_field.clone(),
                });
            }
        }

        let type_index = match module.types_mut() {
            Some(types) => {
                types.entries.push(TypeEntry::func(vec![options.meter_type], None));
                types.entries.len() as u32 - 1
            }
            None => 0,
        };
        if let Some(imports) = module.imports_mut() {
            imports.entries.push(ImportEntry {
                module: options.import_module.clone(),
                field: options.import_field.clone(),
                kind: ImportKind::Function(type_index),
            });
        }
        info!(
            "Injected {}.{} as function {} with type {}",
            options.import_module, options.import_field, meter_index, type_index
        );
        Ok(meter_index)
    }

    /// The cost each body starts with: its signature plus its locals.
    fn start_costs(&self, module: &Module) -> Result<Vec<u64>, MeteringError> {
        let table = &self.options.cost_table;
        let bodies = match module.code() {
            Some(code) => &code.entries,
            None => return Ok(vec![]),
        };
        bodies.iter().enumerate()
            .map(|(index, body)| {
                let signature = module.functions()
                    .and_then(|functions| functions.entries.get(index))
                    .and_then(|type_index| module.types()?.entries.get(*type_index as usize))
                    .ok_or(MeteringError::MissingSignature(index))?;
                Ok(table.signature_cost(signature).saturating_add(table.locals_cost(&body.locals)))
            })
            .collect()
    }

    fn overhead(&mut self) -> Result<u64, MeteringError> {
        let statement = self.statement_text(0, 0);
        let code = self.text.parse(&statement)?;
        Ok(self.code_cost(&code))
    }

    fn code_cost(&self, code: &[Instruction]) -> u64 {
        code.iter()
            .map(|instruction| self.options.cost_table.instruction_cost(instruction))
            .fold(0, u64::saturating_add)
    }

    fn statement_text(&self, cost: u64, meter_index: u32) -> String {
        format!("{}.const {} call {}", self.options.meter_type, cost, meter_index)
    }

    fn statement(&mut self, cost: u64, meter_index: u32) -> Result<Vec<Instruction>, MeteringError> {
        let meter_type = self.options.meter_type;
        let limit = match meter_type {
            ValueType::I32 => Some(i32::MAX as u64),
            ValueType::I64 => Some(i64::MAX as u64),
            ValueType::F32 | ValueType::F64 => None,
        };
        if limit.map_or(false, |limit| cost > limit) {
            return Err(MeteringError::CostOverflow { cost, meter_type });
        }
        let text = self.statement_text(cost, meter_index);
        Ok(self.text.parse(&text)?)
    }

    fn meter_body(
        &mut self,
        body: &FunctionBody,
        start_cost: u64,
        overhead: u64,
        meter_index: u32,
    ) -> Result<Vec<Instruction>, MeteringError> {
        let mut metered = Vec::with_capacity(body.code.len() * 2);
        let mut cost = start_cost;
        let mut block_start = 0;
        for (index, instruction) in body.code.iter().enumerate() {
            cost = cost.saturating_add(self.options.cost_table.instruction_cost(instruction));
            let last = index + 1 == body.code.len();
            if !opcodes::is_branching(&instruction.name) && !last {
                continue;
            }
            // zero-cost blocks are left alone, the overhead included
            if cost != 0 {
                let statement = self.statement(cost.saturating_add(overhead), meter_index)?;
                metered.extend(statement);
            }
            for instruction in &body.code[block_start..=index] {
                metered.push(remap_call(instruction, meter_index)?);
            }
            block_start = index + 1;
            cost = 0;
        }
        trace!("Metered body: {} -> {} instructions", body.code.len(), metered.len());
        Ok(metered)
    }
}

fn shift_index(index: &mut u32, meter_index: u32) -> Result<(), MeteringError> {
    if *index >= meter_index {
        *index = index.checked_add(1).ok_or(MeteringError::IndexOverflow(*index))?;
    }
    Ok(())
}

fn remap_call(instruction: &Instruction, meter_index: u32) -> Result<Instruction, MeteringError> {
    let mut instruction = instruction.clone();
    if instruction.name == "call" {
        if let Some(Immediate::VarUint32(index)) = instruction.immediate.as_mut() {
            shift_index(index, meter_index)?;
        }
    }
    Ok(instruction)
}

/// Shifts every function index at or past the inserted import.
fn remap_references(module: &mut Module, meter_index: u32) -> Result<(), MeteringError> {
    if let Some(exports) = module.exports_mut() {
        for entry in exports.entries.iter_mut().filter(|entry| entry.kind == ExternalKind::Function) {
            shift_index(&mut entry.index, meter_index)?;
        }
    }
    if let Some(elements) = module.elements_mut() {
        for index in elements.entries.iter_mut().flat_map(|segment| segment.elements.iter_mut()) {
            shift_index(index, meter_index)?;
        }
    }
    if let Some(start) = module.start_mut() {
        shift_index(&mut start.index, meter_index)?;
    }
    Ok(())
}
