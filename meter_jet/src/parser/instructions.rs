use leb::ReadLEB;

use crate::cursor::ReadCursor;
use crate::opcodes::{self, ImmediateShape};
use crate::tree::language_types::{BranchTable, CallIndirect, Immediate, Instruction, LanguageType, MemoryImmediate};

use super::{DecodeError, Parse};

/// Reads one opcode and the immediates its shape calls for.
pub fn parse_instruction(cursor: &mut ReadCursor) -> Result<Instruction, DecodeError> {
    let byte = cursor.read_byte()?;
    let instruction = opcodes::name(byte)
        .and_then(Instruction::from_full_name)
        .ok_or(DecodeError::UnknownOpcode(byte))?;
    match opcodes::immediate_shape(instruction.shape_key()) {
        Some(shape) => {
            let immediate = parse_immediate(cursor, shape)?;
            Ok(instruction.with_immediate(immediate))
        }
        None => Ok(instruction),
    }
}

/// Decodes instructions until the cursor is exhausted.
pub fn parse_code(cursor: &mut ReadCursor) -> Result<Vec<Instruction>, DecodeError> {
    let mut code = vec![];
    while !cursor.at_end() {
        let instruction = parse_instruction(cursor)?;
        trace!("{} {:?}", instruction.full_name(), instruction.immediate);
        code.push(instruction);
    }
    Ok(code)
}

fn parse_immediate(cursor: &mut ReadCursor, shape: ImmediateShape) -> Result<Immediate, DecodeError> {
    Ok(match shape {
        ImmediateShape::VarUint1 => Immediate::VarUint1(cursor.read_varuint(1)? as u8),
        ImmediateShape::VarUint32 => Immediate::VarUint32(cursor.read_varuint32()?),
        ImmediateShape::VarInt32 => Immediate::VarInt32(cursor.read_varint32()?),
        ImmediateShape::VarInt64 => Immediate::VarInt64(cursor.read_varint64()?),
        ImmediateShape::Uint32 => Immediate::Uint32(cursor.read_array::<4>()?),
        ImmediateShape::Uint64 => Immediate::Uint64(cursor.read_array::<8>()?),
        ImmediateShape::BlockType => Immediate::BlockType(LanguageType::parse(cursor)?),
        ImmediateShape::BranchTable => {
            let count = cursor.read_varuint32()?;
            let targets = (0..count)
                .map(|_| cursor.read_varuint32())
                .collect::<Result<Vec<_>, _>>()?;
            let default_target = cursor.read_varuint32()?;
            Immediate::BranchTable(BranchTable { targets, default_target })
        }
        ImmediateShape::CallIndirect => {
            let index = cursor.read_varuint32()?;
            let reserved = cursor.read_varuint(1)? as u8;
            Immediate::CallIndirect(CallIndirect { index, reserved })
        }
        ImmediateShape::MemoryImmediate => {
            let flags = cursor.read_varuint32()?;
            let offset = cursor.read_varuint32()?;
            Immediate::Memory(MemoryImmediate { flags, offset })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::language_types::ValueType;

    fn decode(bytes: &[u8]) -> Vec<Instruction> {
        parse_code(&mut ReadCursor::new(bytes)).unwrap()
    }

    #[test]
    fn decodes_every_immediate_shape() {
        let code = decode(&[
            0x02, 0x40, // block
            0x0e, 0x02, 0x00, 0x01, 0x02, // br_table 0 1 2
            0x11, 0x01, 0x00, // call_indirect 1 0
            0x28, 0x02, 0x10, // i32.load align=2 offset=16
            0x40, 0x00, // grow_memory
            0x42, 0x80, 0x01, // i64.const 128
            0x43, 0x00, 0x00, 0x80, 0x3f, // f32.const 1.0
            0x0b,
        ]);
        assert_eq!(code.len(), 8);
        assert_eq!(code[0].immediate, Some(Immediate::BlockType(LanguageType::EmptyBlock)));
        assert_eq!(
            code[1].immediate,
            Some(Immediate::BranchTable(BranchTable { targets: vec![0, 1], default_target: 2 }))
        );
        assert_eq!(code[2].immediate, Some(Immediate::CallIndirect(CallIndirect { index: 1, reserved: 0 })));
        assert_eq!(code[3].return_type, Some(ValueType::I32));
        assert_eq!(code[3].immediate, Some(Immediate::Memory(MemoryImmediate { flags: 2, offset: 16 })));
        assert_eq!(code[4].immediate, Some(Immediate::VarUint1(0)));
        assert_eq!(code[5].immediate, Some(Immediate::VarInt64(128)));
        assert_eq!(code[6].immediate, Some(Immediate::Uint32(1.0f32.to_le_bytes())));
        assert_eq!(code[7], Instruction::new("end"));
    }

    #[test]
    fn conversions_keep_their_source_type_in_the_name() {
        let code = decode(&[0xa7]);
        assert_eq!(code[0].return_type, Some(ValueType::I32));
        assert_eq!(code[0].name, "wrap/i64");
        assert_eq!(code[0].immediate, None);
    }

    #[test]
    fn truncated_immediate() {
        let result = parse_code(&mut ReadCursor::new(&[0x44, 0x00, 0x00]));
        assert!(matches!(result, Err(DecodeError::UnexpectedEndOfInput)));
    }
}
