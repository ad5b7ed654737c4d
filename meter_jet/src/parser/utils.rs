use crate::cursor::ReadCursor;
use crate::tree::language_types::Instruction;

use super::DecodeError;
use super::instructions::parse_instruction;

/// A `varuint32` byte length followed by that many bytes of UTF-8.
pub fn read_string(cursor: &mut ReadCursor) -> Result<String, DecodeError> {
    let len = cursor.read_varuint32()? as usize;
    cursor.read_string(len)
}

/// A `varuint32` byte length followed by that many raw bytes.
pub fn read_bytes(cursor: &mut ReadCursor) -> Result<Vec<u8>, DecodeError> {
    let len = cursor.read_varuint32()? as usize;
    Ok(cursor.read(len)?.to_vec())
}

/// A single constant instruction followed by `end`.
pub fn read_init_expr(cursor: &mut ReadCursor) -> Result<Instruction, DecodeError> {
    let instruction = parse_instruction(cursor)?;
    match cursor.read_byte()? {
        0x0b => Ok(instruction),
        _ => Err(DecodeError::UnterminatedInitExpr),
    }
}
