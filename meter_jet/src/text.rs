//! A small reader for flat, whitespace-separated opcode text such as
//! `i32.const 4 call 0`. There is no folded or s-expression syntax; every
//! token is either an opcode name or one of the immediates that opcode takes.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::{FromStr, SplitWhitespace};

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use crate::opcodes::{self, ImmediateShape};
use crate::tree::language_types::{
    BranchTable, CallIndirect, Immediate, Instruction, LanguageType, MemoryImmediate, ValueType,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("`{0}` is missing its immediate")]
    MissingImmediate(String),
    #[error("invalid immediate `{token}` for `{opcode}`")]
    InvalidImmediate { opcode: String, token: String },
}

type Tokens<'t> = Peekable<SplitWhitespace<'t>>;

/// Parses opcode text into instructions, remembering every text it has seen.
#[derive(Debug, Default)]
pub struct TextParser {
    cache: HashMap<String, Vec<Instruction>>,
}

impl TextParser {
    pub fn new() -> TextParser {
        TextParser::default()
    }

    pub fn parse(&mut self, text: &str) -> Result<Vec<Instruction>, TextError> {
        if let Some(code) = self.cache.get(text) {
            return Ok(code.clone());
        }
        let code = parse_text(text)?;
        self.cache.insert(text.to_string(), code.clone());
        Ok(code)
    }

    /// Number of memoized texts.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

fn parse_text(text: &str) -> Result<Vec<Instruction>, TextError> {
    let mut tokens = text.split_whitespace().peekable();
    let mut code = vec![];
    while let Some(token) = tokens.next() {
        let instruction = parse_opcode(token)?;
        let instruction = match opcodes::immediate_shape(instruction.shape_key()) {
            Some(shape) => {
                let immediate = parse_immediate(&mut tokens, token, shape)?;
                instruction.with_immediate(immediate)
            }
            None => instruction,
        };
        code.push(instruction);
    }
    Ok(code)
}

fn parse_opcode(token: &str) -> Result<Instruction, TextError> {
    if let Some((prefix, _)) = token.split_once('.') {
        if ValueType::from_name(prefix).is_none() {
            return Err(TextError::UnknownType(prefix.to_string()));
        }
    }
    match opcodes::byte(token) {
        Some(_) => Instruction::from_full_name(token).ok_or_else(|| TextError::UnknownOpcode(token.to_string())),
        None => Err(TextError::UnknownOpcode(token.to_string())),
    }
}

fn next_value<T: FromStr>(tokens: &mut Tokens, opcode: &str) -> Result<T, TextError> {
    let token = tokens.next().ok_or_else(|| TextError::MissingImmediate(opcode.to_string()))?;
    token.parse().map_err(|_| TextError::InvalidImmediate {
        opcode: opcode.to_string(),
        token: token.to_string(),
    })
}

fn parse_immediate(tokens: &mut Tokens, opcode: &str, shape: ImmediateShape) -> Result<Immediate, TextError> {
    Ok(match shape {
        ImmediateShape::VarUint1 => {
            let token = tokens.peek().copied().unwrap_or_default();
            match next_value(tokens, opcode)? {
                flag @ (0 | 1) => Immediate::VarUint1(flag),
                _ => {
                    return Err(TextError::InvalidImmediate {
                        opcode: opcode.to_string(),
                        token: token.to_string(),
                    })
                }
            }
        }
        ImmediateShape::VarUint32 => Immediate::VarUint32(next_value(tokens, opcode)?),
        ImmediateShape::VarInt32 => Immediate::VarInt32(next_value(tokens, opcode)?),
        ImmediateShape::VarInt64 => Immediate::VarInt64(next_value(tokens, opcode)?),
        ImmediateShape::Uint32 => {
            let mut bytes = [0u8; 4];
            LittleEndian::write_f32(&mut bytes, next_value(tokens, opcode)?);
            Immediate::Uint32(bytes)
        }
        ImmediateShape::Uint64 => {
            let mut bytes = [0u8; 8];
            LittleEndian::write_f64(&mut bytes, next_value(tokens, opcode)?);
            Immediate::Uint64(bytes)
        }
        ImmediateShape::BlockType => {
            let token = tokens.next().ok_or_else(|| TextError::MissingImmediate(opcode.to_string()))?;
            let block_type = LanguageType::from_name(token).ok_or_else(|| TextError::InvalidImmediate {
                opcode: opcode.to_string(),
                token: token.to_string(),
            })?;
            Immediate::BlockType(block_type)
        }
        ImmediateShape::BranchTable => {
            let mut targets = vec![];
            while let Some(target) = tokens.peek().and_then(|token| token.parse::<u32>().ok()) {
                tokens.next();
                targets.push(target);
            }
            let default_target = targets.pop().ok_or_else(|| TextError::MissingImmediate(opcode.to_string()))?;
            Immediate::BranchTable(BranchTable { targets, default_target })
        }
        ImmediateShape::CallIndirect => Immediate::CallIndirect(CallIndirect {
            index: next_value(tokens, opcode)?,
            reserved: 0,
        }),
        ImmediateShape::MemoryImmediate => {
            let flags = next_value(tokens, opcode)?;
            let offset = next_value(tokens, opcode)?;
            Immediate::Memory(MemoryImmediate { flags, offset })
        }
    })
}
