use crate::cursor::ReadCursor;
use crate::tree::language_types::{LanguageType, ValueType};
use crate::tree::types::{TypeEntry, TypeSection};

use super::{parse_vec, DecodeError, Parse};

impl Parse for TypeSection {
    fn parse(cursor: &mut ReadCursor) -> Result<TypeSection, DecodeError> {
        let entries = parse_vec(cursor)?;
        Ok(TypeSection { entries })
    }
}

impl Parse for TypeEntry {
    fn parse(cursor: &mut ReadCursor) -> Result<TypeEntry, DecodeError> {
        let form = LanguageType::parse(cursor)?;
        let params = parse_vec(cursor)?;
        let return_type = match cursor.read_varuint32()? {
            0 => None,
            1 => Some(ValueType::parse(cursor)?),
            count => return Err(DecodeError::TooManyReturns(count)),
        };
        Ok(TypeEntry { form, params, return_type })
    }
}
