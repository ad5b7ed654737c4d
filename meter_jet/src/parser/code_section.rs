use crate::cursor::ReadCursor;
use crate::tree::code::{CodeSection, FunctionBody, LocalEntry};
use crate::tree::language_types::ValueType;

use super::instructions::parse_code;
use super::{parse_vec, DecodeError, Parse};

impl Parse for CodeSection {
    fn parse(cursor: &mut ReadCursor) -> Result<CodeSection, DecodeError> {
        let entries = parse_vec(cursor)?;
        Ok(CodeSection { entries })
    }
}

/// Each body is length-prefixed; its instructions run to the end of that length.
impl Parse for FunctionBody {
    fn parse(cursor: &mut ReadCursor) -> Result<FunctionBody, DecodeError> {
        let size = cursor.read_varuint32()? as usize;
        let mut body = cursor.sub_cursor(size)?;
        let locals = parse_vec(&mut body)?;
        let code = parse_code(&mut body)?;
        debug!("Parsed function body of {} bytes, {} instructions", size, code.len());
        Ok(FunctionBody { locals, code })
    }
}

impl Parse for LocalEntry {
    fn parse(cursor: &mut ReadCursor) -> Result<LocalEntry, DecodeError> {
        let count = cursor.read_varuint32()?;
        let ty = ValueType::parse(cursor)?;
        Ok(LocalEntry { count, ty })
    }
}
