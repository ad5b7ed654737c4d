use crate::cursor::ReadCursor;
use crate::tree::custom::CustomSection;

use super::utils::read_string;
use super::{DecodeError, Parse};

/// The name is length-prefixed; the rest of the section is opaque.
impl Parse for CustomSection {
    fn parse(cursor: &mut ReadCursor) -> Result<CustomSection, DecodeError> {
        let name = read_string(cursor)?;
        let remaining = cursor.remaining();
        let payload = cursor.read(remaining)?.to_vec();
        Ok(CustomSection { name, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_runs_to_the_end() {
        let bytes = [0x04, b'n', b'a', b'm', b'e', 0x01, 0x02];
        let section = CustomSection::parse(&mut ReadCursor::new(&bytes)).unwrap();
        assert_eq!(section.name, "name");
        assert_eq!(section.payload, vec![1, 2]);
    }
}
