use crate::cursor::ReadCursor;
use crate::tree::memory::MemorySection;

use super::{parse_vec, DecodeError, Parse};

impl Parse for MemorySection {
    fn parse(cursor: &mut ReadCursor) -> Result<MemorySection, DecodeError> {
        let entries = parse_vec(cursor)?;
        Ok(MemorySection { entries })
    }
}
