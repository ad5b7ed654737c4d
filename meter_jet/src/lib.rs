#[macro_use]
extern crate log;

use thiserror::Error;

pub mod cursor;
pub mod metering;
pub mod opcodes;
pub mod parser;
pub mod text;
pub mod tree;
pub mod writer;

pub use metering::{Cost, CostTable, MeterOptions, Metering, MeteringError};
pub use parser::{DecodeError, ModuleParser};
pub use text::{TextError, TextParser};
pub use tree::Module;
pub use writer::{EncodeError, ModuleWriter};

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to decode module: {0}")]
    Decode(#[from] DecodeError),
    #[error("failed to meter module: {0}")]
    Metering(#[from] MeteringError),
    #[error("failed to encode module: {0}")]
    Encode(#[from] EncodeError),
}

pub fn decode(bytes: &[u8]) -> Result<Module, DecodeError> {
    ModuleParser::new().parse_module(bytes)
}

/// `size_hint` pre-sizes the output buffer; the input length is a good guess.
pub fn encode(module: &Module, size_hint: usize) -> Result<Vec<u8>, EncodeError> {
    ModuleWriter::with_capacity(size_hint).write_module(module)
}

pub fn meter_ir(module: &Module, options: &MeterOptions) -> Result<Module, MeteringError> {
    Metering::new(options).meter(module)
}

/// Decodes, meters and re-encodes a binary module.
pub fn meter_module(bytes: &[u8], options: &MeterOptions) -> Result<Vec<u8>, Error> {
    let module = decode(bytes)?;
    let metered = meter_ir(&module, options)?;
    // metering adds a handful of bytes per block
    Ok(encode(&metered, bytes.len() + bytes.len() / 2)?)
}
