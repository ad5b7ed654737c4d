use crate::cursor::ReadCursor;
use crate::tree::elements::{ElementSection, ElementSegment};

use super::utils::read_init_expr;
use super::{parse_vec, DecodeError, Parse};

impl Parse for ElementSection {
    fn parse(cursor: &mut ReadCursor) -> Result<ElementSection, DecodeError> {
        let entries = parse_vec(cursor)?;
        Ok(ElementSection { entries })
    }
}

impl Parse for ElementSegment {
    fn parse(cursor: &mut ReadCursor) -> Result<ElementSegment, DecodeError> {
        let index = cursor.read_varuint32()?;
        let offset = read_init_expr(cursor)?;
        let elements = parse_vec(cursor)?;
        Ok(ElementSegment { index, offset, elements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_with_function_indices() {
        let bytes = [0x01, 0x00, 0x41, 0x00, 0x0b, 0x03, 0x00, 0x02, 0x05];
        let section = ElementSection::parse(&mut ReadCursor::new(&bytes)).unwrap();
        assert_eq!(section.entries[0].elements, vec![0, 2, 5]);
        assert_eq!(section.entries[0].offset.full_name(), "i32.const");
    }
}
