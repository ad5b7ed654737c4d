use crate::cursor::WriteCursor;
use crate::opcodes::{self, ImmediateShape};
use crate::tree::language_types::{Immediate, Instruction};

use super::{Encode, EncodeError};

impl Encode for Instruction {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        let full_name = self.full_name();
        let byte = opcodes::byte(&full_name).ok_or_else(|| EncodeError::UnknownOpcode(full_name.to_string()))?;
        let expected = opcodes::immediate_shape(self.shape_key());
        let mismatch = || EncodeError::ImmediateMismatch {
            opcode: full_name.to_string(),
            expected,
        };

        out.write_byte(byte);
        match (expected, &self.immediate) {
            (None, None) => {}
            (Some(shape), Some(immediate)) => {
                if !write_immediate(out, shape, immediate) {
                    return Err(mismatch());
                }
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}

/// Returns false if `immediate` is not of the given shape.
fn write_immediate(out: &mut WriteCursor, shape: ImmediateShape, immediate: &Immediate) -> bool {
    match (shape, immediate) {
        (ImmediateShape::VarUint1, Immediate::VarUint1(value)) => {
            out.write_varuint(*value as u64);
        }
        (ImmediateShape::VarUint32, Immediate::VarUint32(value)) => {
            out.write_varuint(*value as u64);
        }
        (ImmediateShape::VarInt32, Immediate::VarInt32(value)) => {
            out.write_varint(*value as i64);
        }
        (ImmediateShape::VarInt64, Immediate::VarInt64(value)) => {
            out.write_varint(*value);
        }
        (ImmediateShape::Uint32, Immediate::Uint32(bytes)) => out.write_bytes(bytes),
        (ImmediateShape::Uint64, Immediate::Uint64(bytes)) => out.write_bytes(bytes),
        (ImmediateShape::BlockType, Immediate::BlockType(block_type)) => {
            out.write_byte(block_type.to_byte());
        }
        (ImmediateShape::BranchTable, Immediate::BranchTable(table)) => {
            out.write_varuint(table.targets.len() as u64);
            for target in &table.targets {
                out.write_varuint(*target as u64);
            }
            out.write_varuint(table.default_target as u64);
        }
        (ImmediateShape::CallIndirect, Immediate::CallIndirect(call)) => {
            out.write_varuint(call.index as u64);
            out.write_varuint(call.reserved as u64);
        }
        (ImmediateShape::MemoryImmediate, Immediate::Memory(memory)) => {
            out.write_varuint(memory.flags as u64);
            out.write_varuint(memory.offset as u64);
        }
        _ => return false,
    }
    true
}

/// Writes each instruction in turn, with no count prefix.
pub fn write_code(out: &mut WriteCursor, code: &[Instruction]) -> Result<(), EncodeError> {
    for instruction in code {
        instruction.encode(out)?;
    }
    Ok(())
}

/// An initializer: the instruction followed by `end`.
pub fn write_init_expr(out: &mut WriteCursor, init: &Instruction) -> Result<(), EncodeError> {
    init.encode(out)?;
    out.write_byte(0x0b);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::language_types::{BranchTable, LanguageType, ValueType};

    fn encode(instruction: Instruction) -> Result<Vec<u8>, EncodeError> {
        let mut out = WriteCursor::new();
        instruction.encode(&mut out)?;
        Ok(out.into_inner())
    }

    #[test]
    fn encodes_opcode_and_immediates() {
        assert_eq!(encode(Instruction::typed(ValueType::I32, "add")).unwrap(), vec![0x6a]);
        assert_eq!(
            encode(Instruction::typed(ValueType::I32, "const").with_immediate(Immediate::VarInt32(-1))).unwrap(),
            vec![0x41, 0x7f]
        );
        assert_eq!(
            encode(Instruction::new("loop").with_immediate(Immediate::BlockType(LanguageType::I32))).unwrap(),
            vec![0x03, 0x7f]
        );
        let br_table = Immediate::BranchTable(BranchTable { targets: vec![3], default_target: 1 });
        assert_eq!(
            encode(Instruction::new("br_table").with_immediate(br_table)).unwrap(),
            vec![0x0e, 0x01, 0x03, 0x01]
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        let result = encode(Instruction::typed(ValueType::F32, "popcnt"));
        assert!(matches!(result, Err(EncodeError::UnknownOpcode(ref name)) if name == "f32.popcnt"));
    }

    #[test]
    fn immediate_must_match_shape() {
        let result = encode(Instruction::new("call").with_immediate(Immediate::VarInt32(1)));
        assert!(matches!(
            result,
            Err(EncodeError::ImmediateMismatch { expected: Some(ImmediateShape::VarUint32), .. })
        ));
        assert!(matches!(encode(Instruction::new("call")), Err(EncodeError::ImmediateMismatch { .. })));
        let result = encode(Instruction::new("nop").with_immediate(Immediate::VarUint32(0)));
        assert!(matches!(result, Err(EncodeError::ImmediateMismatch { expected: None, .. })));
    }
}
