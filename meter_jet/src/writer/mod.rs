use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use crate::cursor::WriteCursor;
use crate::opcodes::ImmediateShape;
use crate::tree::section::Section;
use crate::tree::{Module, Preamble};

mod instructions;
mod language_types;
mod sections;

/// Bytes reserved in front of each length-prefixed payload, the widest `varuint32`.
const LENGTH_PREFIX_RESERVE: usize = 5;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),
    #[error("immediate of `{opcode}` does not match its expected shape {expected:?}")]
    ImmediateMismatch {
        opcode: String,
        expected: Option<ImmediateShape>,
    },
}

/// Implemented by every IR node that has a binary form.
pub trait Encode {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError>;
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        out.write_varuint(self.len() as u64);
        for entry in self {
            entry.encode(out)?;
        }
        Ok(())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        self.as_slice().encode(out)
    }
}

impl Encode for u32 {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        out.write_varuint(*self as u64);
        Ok(())
    }
}

#[derive(Debug)]
pub struct ModuleWriter {
    size_hint: usize,
}

impl Default for ModuleWriter {
    fn default() -> ModuleWriter {
        ModuleWriter::with_capacity(0)
    }
}

impl ModuleWriter {
    pub fn new() -> ModuleWriter {
        ModuleWriter::default()
    }

    /// `size_hint` only pre-sizes the output buffer; it grows past it as needed.
    pub fn with_capacity(size_hint: usize) -> ModuleWriter {
        ModuleWriter { size_hint }
    }

    pub fn write_module(&self, module: &Module) -> Result<Vec<u8>, EncodeError> {
        let mut out = WriteCursor::with_capacity(self.size_hint);
        write_preamble(&mut out, &module.preamble);
        for section in &module.sections {
            write_section(&mut out, section)?;
        }
        debug!("Wrote module, {} bytes", out.bytes_written());
        Ok(out.into_inner())
    }
}

fn write_preamble(out: &mut WriteCursor, preamble: &Preamble) {
    let mut version = [0u8; 4];
    LittleEndian::write_u32(&mut version, preamble.version);
    out.write_bytes(&preamble.magic);
    out.write_bytes(&version);
}

fn write_section(out: &mut WriteCursor, section: &Section) -> Result<(), EncodeError> {
    let id = section.id();
    out.write_byte(id as u8);
    let mut payload = out.reserve_subregion(LENGTH_PREFIX_RESERVE);
    match section {
        Section::Custom(inner) => inner.encode(&mut payload)?,
        Section::Type(inner) => inner.encode(&mut payload)?,
        Section::Import(inner) => inner.encode(&mut payload)?,
        Section::Function(inner) => inner.encode(&mut payload)?,
        Section::Table(inner) => inner.encode(&mut payload)?,
        Section::Memory(inner) => inner.encode(&mut payload)?,
        Section::Global(inner) => inner.encode(&mut payload)?,
        Section::Export(inner) => inner.encode(&mut payload)?,
        Section::Start(inner) => inner.encode(&mut payload)?,
        Section::Element(inner) => inner.encode(&mut payload)?,
        Section::Code(inner) => inner.encode(&mut payload)?,
        Section::Data(inner) => inner.encode(&mut payload)?,
    }
    let size = payload.finish();
    debug!("Wrote {:?} section ({} bytes)", id, size);
    Ok(())
}
