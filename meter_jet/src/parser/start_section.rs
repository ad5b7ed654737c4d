use crate::cursor::ReadCursor;
use crate::tree::start::StartSection;

use super::{DecodeError, Parse};

impl Parse for StartSection {
    fn parse(cursor: &mut ReadCursor) -> Result<StartSection, DecodeError> {
        let index = cursor.read_varuint32()?;
        Ok(StartSection { index })
    }
}
