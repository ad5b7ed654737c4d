use crate::cursor::ReadCursor;
use crate::tree::imports::{ImportEntry, ImportKind, ImportSection};
use crate::tree::language_types::{ExternalKind, GlobalType, ResizableLimits, TableType};

use super::utils::read_string;
use super::{parse_vec, DecodeError, Parse};

impl Parse for ImportSection {
    fn parse(cursor: &mut ReadCursor) -> Result<ImportSection, DecodeError> {
        let entries = parse_vec(cursor)?;
        Ok(ImportSection { entries })
    }
}

impl Parse for ImportEntry {
    fn parse(cursor: &mut ReadCursor) -> Result<ImportEntry, DecodeError> {
        let module = read_string(cursor)?;
        let field = read_string(cursor)?;
        let kind = match ExternalKind::parse(cursor)? {
            ExternalKind::Function => ImportKind::Function(cursor.read_varuint32()?),
            ExternalKind::Table => ImportKind::Table(TableType::parse(cursor)?),
            ExternalKind::Memory => ImportKind::Memory(ResizableLimits::parse(cursor)?),
            ExternalKind::Global => ImportKind::Global(GlobalType::parse(cursor)?),
        };
        Ok(ImportEntry { module, field, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::language_types::ValueType;

    #[test]
    fn parses_every_import_kind() {
        let bytes = [
            0x04,
            0x01, b'a', 0x01, b'f', 0x00, 0x02,
            0x01, b'a', 0x01, b't', 0x01, 0x70, 0x00, 0x01,
            0x01, b'a', 0x01, b'm', 0x02, 0x01, 0x01, 0x02,
            0x01, b'a', 0x01, b'g', 0x03, 0x7e, 0x01,
        ];
        let section = ImportSection::parse(&mut ReadCursor::new(&bytes)).unwrap();
        assert_eq!(section.entries.len(), 4);
        assert_eq!(section.entries[0].kind, ImportKind::Function(2));
        assert!(matches!(section.entries[1].kind, ImportKind::Table(_)));
        assert_eq!(
            section.entries[2].kind,
            ImportKind::Memory(ResizableLimits { initial: 1, maximum: Some(2) })
        );
        assert_eq!(
            section.entries[3].kind,
            ImportKind::Global(GlobalType { content_type: ValueType::I64, mutable: true })
        );
    }
}
