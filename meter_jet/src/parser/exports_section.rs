use crate::cursor::ReadCursor;
use crate::tree::exports::{ExportEntry, ExportSection};
use crate::tree::language_types::ExternalKind;

use super::utils::read_string;
use super::{parse_vec, DecodeError, Parse};

impl Parse for ExportSection {
    fn parse(cursor: &mut ReadCursor) -> Result<ExportSection, DecodeError> {
        let entries = parse_vec(cursor)?;
        Ok(ExportSection { entries })
    }
}

impl Parse for ExportEntry {
    fn parse(cursor: &mut ReadCursor) -> Result<ExportEntry, DecodeError> {
        let field = read_string(cursor)?;
        let kind = ExternalKind::parse(cursor)?;
        let index = cursor.read_varuint32()?;
        Ok(ExportEntry { field, kind, index })
    }
}
