use crate::cursor::ReadCursor;
use crate::tree::data::{DataSection, DataSegment};

use super::utils::{read_bytes, read_init_expr};
use super::{parse_vec, DecodeError, Parse};

impl Parse for DataSection {
    fn parse(cursor: &mut ReadCursor) -> Result<DataSection, DecodeError> {
        let entries = parse_vec(cursor)?;
        Ok(DataSection { entries })
    }
}

impl Parse for DataSegment {
    fn parse(cursor: &mut ReadCursor) -> Result<DataSegment, DecodeError> {
        let index = cursor.read_varuint32()?;
        let offset = read_init_expr(cursor)?;
        let data = read_bytes(cursor)?;
        Ok(DataSegment { index, offset, data })
    }
}
