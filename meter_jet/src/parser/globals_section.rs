use crate::cursor::ReadCursor;
use crate::tree::globals::{GlobalEntry, GlobalSection};
use crate::tree::language_types::GlobalType;

use super::utils::read_init_expr;
use super::{parse_vec, DecodeError, Parse};

impl Parse for GlobalSection {
    fn parse(cursor: &mut ReadCursor) -> Result<GlobalSection, DecodeError> {
        let entries = parse_vec(cursor)?;
        Ok(GlobalSection { entries })
    }
}

impl Parse for GlobalEntry {
    fn parse(cursor: &mut ReadCursor) -> Result<GlobalEntry, DecodeError> {
        let ty = GlobalType::parse(cursor)?;
        let init = read_init_expr(cursor)?;
        Ok(GlobalEntry { ty, init })
    }
}
