use crate::cursor::ReadCursor;
use crate::tree::functions::FunctionSection;

use super::{parse_vec, DecodeError, Parse};

impl Parse for u32 {
    fn parse(cursor: &mut ReadCursor) -> Result<u32, DecodeError> {
        cursor.read_varuint32()
    }
}

impl Parse for FunctionSection {
    fn parse(cursor: &mut ReadCursor) -> Result<FunctionSection, DecodeError> {
        let entries = parse_vec(cursor)?;
        Ok(FunctionSection { entries })
    }
}
