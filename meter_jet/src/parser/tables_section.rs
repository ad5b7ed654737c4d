use crate::cursor::ReadCursor;
use crate::tree::tables::TableSection;

use super::{parse_vec, DecodeError, Parse};

impl Parse for TableSection {
    fn parse(cursor: &mut ReadCursor) -> Result<TableSection, DecodeError> {
        let entries = parse_vec(cursor)?;
        Ok(TableSection { entries })
    }
}
