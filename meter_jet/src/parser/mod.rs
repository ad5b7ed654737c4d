use std::io;
use std::string::FromUtf8Error;

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

use crate::cursor::ReadCursor;
use crate::tree::section::{Section, SectionId};
use crate::tree::{Module, Preamble};

mod code_section;
mod custom_section;
mod data_section;
mod elements_section;
mod exports_section;
mod functions_section;
mod globals_section;
mod imports_section;
mod instructions;
mod language_types;
mod memory_section;
mod start_section;
mod tables_section;
mod types_section;
mod utils;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("integer does not fit in {bits} bits")]
    IntegerRange { bits: u32 },
    #[error("unknown section id {0}")]
    UnknownSectionId(u8),
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),
    #[error("invalid language type 0x{0:02x}")]
    InvalidLanguageType(u8),
    #[error("invalid value type 0x{0:02x}")]
    InvalidValueType(u8),
    #[error("invalid external kind {0}")]
    InvalidExternalKind(u8),
    #[error("invalid global mutability flag {0}")]
    InvalidMutability(u8),
    #[error("invalid resizable limits flags {0}")]
    InvalidLimitsFlags(u32),
    #[error("function type declares {0} results, at most one is supported")]
    TooManyReturns(u32),
    #[error("{section:?} section declared {declared} bytes but only {consumed} were used")]
    SectionLengthMismatch {
        section: SectionId,
        declared: usize,
        consumed: usize,
    },
    #[error("initializer expression is not terminated by `end`")]
    UnterminatedInitExpr,
    #[error("string is not valid UTF-8")]
    InvalidUtf8(#[from] FromUtf8Error),
    #[error(transparent)]
    Io(io::Error),
}

impl From<leb::Error> for DecodeError {
    fn from(err: leb::Error) -> DecodeError {
        match err {
            leb::Error::IntegerRange { bits } => DecodeError::IntegerRange { bits },
            leb::Error::UnexpectedEndOfInput => DecodeError::UnexpectedEndOfInput,
            leb::Error::Io(err) => DecodeError::from(err),
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> DecodeError {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::UnexpectedEndOfInput,
            _ => DecodeError::Io(err),
        }
    }
}

/// Implemented by every IR node that has a binary form.
pub trait Parse: Sized {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, DecodeError>;
}

/// Reads a `varuint32` count followed by that many entries.
pub fn parse_vec<T: Parse>(cursor: &mut ReadCursor) -> Result<Vec<T>, DecodeError> {
    let count = cursor.read_varuint32()? as usize;
    // every entry is at least one byte, so the remaining input bounds the count
    let mut entries = Vec::with_capacity(count.min(cursor.remaining()));
    for _ in 0..count {
        entries.push(T::parse(cursor)?);
    }
    Ok(entries)
}

#[derive(Debug, Default)]
pub struct ModuleParser;

impl ModuleParser {
    pub fn new() -> ModuleParser {
        ModuleParser
    }

    pub fn parse_module(&self, bytes: &[u8]) -> Result<Module, DecodeError> {
        let mut cursor = ReadCursor::new(bytes);
        let preamble = self.parse_preamble(&mut cursor)?;
        let sections = self.parse_sections(&mut cursor)?;
        debug!("Parsed module with {} sections", sections.len());
        Ok(Module { preamble, sections })
    }

    fn parse_preamble(&self, cursor: &mut ReadCursor) -> Result<Preamble, DecodeError> {
        let magic = cursor.read_array::<4>()?;
        let version = cursor.read_u32::<LittleEndian>()?;
        Ok(Preamble { magic, version })
    }

    fn parse_sections(&self, cursor: &mut ReadCursor) -> Result<Vec<Section>, DecodeError> {
        let mut sections = vec![];
        while !cursor.at_end() {
            sections.push(self.parse_section(cursor)?);
        }
        Ok(sections)
    }

    fn parse_section(&self, cursor: &mut ReadCursor) -> Result<Section, DecodeError> {
        let raw_id = cursor.read_byte()?;
        let id = SectionId::try_from(raw_id).map_err(DecodeError::UnknownSectionId)?;
        let size = cursor.read_varuint32()? as usize;
        debug!("Parsing {:?} section ({} bytes)", id, size);

        let mut payload = cursor.sub_cursor(size)?;
        let section = match id {
            SectionId::Custom => Section::Custom(Parse::parse(&mut payload)?),
            SectionId::Type => Section::Type(Parse::parse(&mut payload)?),
            SectionId::Import => Section::Import(Parse::parse(&mut payload)?),
            SectionId::Function => Section::Function(Parse::parse(&mut payload)?),
            SectionId::Table => Section::Table(Parse::parse(&mut payload)?),
            SectionId::Memory => Section::Memory(Parse::parse(&mut payload)?),
            SectionId::Global => Section::Global(Parse::parse(&mut payload)?),
            SectionId::Export => Section::Export(Parse::parse(&mut payload)?),
            SectionId::Start => Section::Start(Parse::parse(&mut payload)?),
            SectionId::Element => Section::Element(Parse::parse(&mut payload)?),
            SectionId::Code => Section::Code(Parse::parse(&mut payload)?),
            SectionId::Data => Section::Data(Parse::parse(&mut payload)?),
        };
        if !payload.at_end() {
            return Err(DecodeError::SectionLengthMismatch {
                section: id,
                declared: size,
                consumed: payload.bytes_read(),
            });
        }
        Ok(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::imports::ImportKind;
    use crate::tree::language_types::{ExternalKind, Immediate, ValueType};

    const PREAMBLE: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

    fn module(sections: &[u8]) -> Vec<u8> {
        let mut bytes = PREAMBLE.to_vec();
        bytes.extend_from_slice(sections);
        bytes
    }

    fn parse(bytes: &[u8]) -> Result<Module, DecodeError> {
        ModuleParser::new().parse_module(bytes)
    }

    #[test]
    fn parses_preamble_only() {
        let module = parse(&PREAMBLE).unwrap();
        assert_eq!(module.preamble, Preamble::default());
        assert!(module.sections.is_empty());
    }

    #[test]
    fn preamble_is_not_validated() {
        let module = parse(&[1, 2, 3, 4, 2, 0, 0, 0]).unwrap();
        assert_eq!(module.preamble.magic, [1, 2, 3, 4]);
        assert_eq!(module.preamble.version, 2);
    }

    #[test]
    fn truncated_preamble() {
        assert!(matches!(parse(&PREAMBLE[..6]), Err(DecodeError::UnexpectedEndOfInput)));
    }

    #[test]
    fn parses_type_import_and_export_sections() {
        let bytes = module(&[
            // type: (i32, i64) -> f32
            0x01, 0x07, 0x01, 0x60, 0x02, 0x7f, 0x7e, 0x01, 0x7d,
            // import "m" "f" func 0
            0x02, 0x07, 0x01, 0x01, b'm', 0x01, b'f', 0x00, 0x00,
            // export "g" func 0
            0x07, 0x05, 0x01, 0x01, b'g', 0x00, 0x00,
        ]);
        let module = parse(&bytes).unwrap();
        let types = module.types().unwrap();
        assert_eq!(types.entries[0].params, vec![ValueType::I32, ValueType::I64]);
        assert_eq!(types.entries[0].return_type, Some(ValueType::F32));

        let import = &module.imports().unwrap().entries[0];
        assert_eq!((import.module.as_str(), import.field.as_str()), ("m", "f"));
        assert_eq!(import.kind, ImportKind::Function(0));

        let export = &module.exports().unwrap().entries[0];
        assert_eq!(export.field, "g");
        assert_eq!(export.kind, ExternalKind::Function);
    }

    #[test]
    fn code_body_is_bounded_by_its_size() {
        let bytes = module(&[
            // code: one body, one local i32, `i32.const -1; drop; end`
            0x0a, 0x0a, 0x01, 0x08, 0x01, 0x01, 0x7f, 0x41, 0x7f, 0x1a, 0x0b, 0x0b,
        ]);
        // both trailing `end`s fall inside the declared body size
        let module = parse(&bytes).unwrap();
        let body = &module.code().unwrap().entries[0];
        assert_eq!(body.locals.len(), 1);
        assert_eq!(body.code.len(), 4);
        assert_eq!(body.code[0].full_name(), "i32.const");
        assert_eq!(body.code[0].immediate, Some(Immediate::VarInt32(-1)));
        assert_eq!(body.code[3].name, "end");
    }

    #[test]
    fn unknown_section_id() {
        let bytes = module(&[0x0c, 0x00]);
        assert!(matches!(parse(&bytes), Err(DecodeError::UnknownSectionId(12))));
    }

    #[test]
    fn unknown_opcode() {
        let bytes = module(&[0x0a, 0x05, 0x01, 0x03, 0x00, 0x06, 0x0b]);
        assert!(matches!(parse(&bytes), Err(DecodeError::UnknownOpcode(0x06))));
    }

    #[test]
    fn section_running_past_the_input() {
        let bytes = module(&[0x01, 0x09, 0x01, 0x60]);
        assert!(matches!(parse(&bytes), Err(DecodeError::UnexpectedEndOfInput)));
    }

    #[test]
    fn section_with_trailing_bytes() {
        // start section declaring 2 bytes but only using 1
        let bytes = module(&[0x08, 0x02, 0x00, 0x00]);
        match parse(&bytes) {
            Err(DecodeError::SectionLengthMismatch { section, declared, consumed }) => {
                assert_eq!(section, SectionId::Start);
                assert_eq!((declared, consumed), (2, 1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn too_many_returns() {
        let bytes = module(&[0x01, 0x06, 0x01, 0x60, 0x00, 0x02, 0x7f, 0x7f]);
        assert!(matches!(parse(&bytes), Err(DecodeError::TooManyReturns(2))));
    }
}
