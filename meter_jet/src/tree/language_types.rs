use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug)]
#[derive(Clone, Copy)]
#[derive(PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
        }
    }

    pub fn from_name(name: &str) -> Option<ValueType> {
        match name {
            "i32" => Some(ValueType::I32),
            "i64" => Some(ValueType::I64),
            "f32" => Some(ValueType::F32),
            "f64" => Some(ValueType::F64),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The type constructors of the binary format, each encoded as a single
/// negative varint7 byte.
#[derive(PartialEq, Eq)]
#[derive(Debug)]
#[derive(Clone, Copy)]
#[derive(Serialize, Deserialize)]
pub enum LanguageType {
    #[serde(rename = "i32")]
    I32,
    #[serde(rename = "i64")]
    I64,
    #[serde(rename = "f32")]
    F32,
    #[serde(rename = "f64")]
    F64,
    #[serde(rename = "anyFunc")]
    AnyFunc,
    #[serde(rename = "func")]
    Func,
    #[serde(rename = "block_type")]
    EmptyBlock,
}

impl LanguageType {
    pub fn name(self) -> &'static str {
        match self {
            LanguageType::I32 => "i32",
            LanguageType::I64 => "i64",
            LanguageType::F32 => "f32",
            LanguageType::F64 => "f64",
            LanguageType::AnyFunc => "anyFunc",
            LanguageType::Func => "func",
            LanguageType::EmptyBlock => "block_type",
        }
    }

    pub fn from_name(name: &str) -> Option<LanguageType> {
        match name {
            "anyFunc" => Some(LanguageType::AnyFunc),
            "func" => Some(LanguageType::Func),
            "block_type" => Some(LanguageType::EmptyBlock),
            other => ValueType::from_name(other).map(LanguageType::from),
        }
    }
}

impl From<ValueType> for LanguageType {
    fn from(value: ValueType) -> LanguageType {
        match value {
            ValueType::I32 => LanguageType::I32,
            ValueType::I64 => LanguageType::I64,
            ValueType::F32 => LanguageType::F32,
            ValueType::F64 => LanguageType::F64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalKind {
    Function,
    Table,
    Memory,
    Global,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct TableType {
    pub element_type: LanguageType,
    pub limits: ResizableLimits,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct ResizableLimits {
    pub initial: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct GlobalType {
    pub content_type: ValueType,
    pub mutable: bool,
}

/// A single operation. `name` is the opcode name without its type prefix,
/// which lives in `return_type` (`i32.add` is `{ name: "add", return_type: i32 }`).
#[derive(Clone, Debug, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Instruction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immediate: Option<Immediate>,
}

impl Instruction {
    pub fn new(name: &str) -> Instruction {
        Instruction {
            name: name.to_string(),
            return_type: None,
            immediate: None,
        }
    }

    pub fn typed(return_type: ValueType, name: &str) -> Instruction {
        Instruction {
            name: name.to_string(),
            return_type: Some(return_type),
            immediate: None,
        }
    }

    /// Splits a qualified opcode name such as `i32.wrap/i64` at its first dot.
    /// Returns `None` if the prefix is not a value type.
    pub fn from_full_name(full_name: &str) -> Option<Instruction> {
        match full_name.split_once('.') {
            Some((prefix, name)) => {
                ValueType::from_name(prefix).map(|return_type| Instruction::typed(return_type, name))
            }
            None => Some(Instruction::new(full_name)),
        }
    }

    pub fn with_immediate(mut self, immediate: Immediate) -> Instruction {
        self.immediate = Some(immediate);
        self
    }

    pub fn full_name(&self) -> Cow<str> {
        match self.return_type {
            Some(return_type) => Cow::Owned(format!("{}.{}", return_type, self.name)),
            None => Cow::Borrowed(&self.name),
        }
    }

    /// The key used for the immediate shape table: constants are keyed by their type.
    pub fn shape_key(&self) -> &str {
        match self.return_type {
            Some(return_type) if self.name == "const" => return_type.name(),
            _ => &self.name,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Immediate {
    VarUint1(u8),
    VarUint32(u32),
    VarInt32(i32),
    VarInt64(i64),
    Uint32([u8; 4]),
    Uint64([u8; 8]),
    BlockType(LanguageType),
    BranchTable(BranchTable),
    CallIndirect(CallIndirect),
    Memory(MemoryImmediate),
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct BranchTable {
    pub targets: Vec<u32>,
    pub default_target: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct CallIndirect {
    pub index: u32,
    pub reserved: u8,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct MemoryImmediate {
    pub flags: u32,
    pub offset: u32,
}
