use crate::cursor::WriteCursor;
use crate::tree::code::{CodeSection, FunctionBody, LocalEntry};
use crate::tree::custom::CustomSection;
use crate::tree::data::{DataSection, DataSegment};
use crate::tree::elements::{ElementSection, ElementSegment};
use crate::tree::exports::{ExportEntry, ExportSection};
use crate::tree::functions::FunctionSection;
use crate::tree::globals::{GlobalEntry, GlobalSection};
use crate::tree::imports::{ImportEntry, ImportKind, ImportSection};
use crate::tree::language_types::ExternalKind;
use crate::tree::memory::MemorySection;
use crate::tree::start::StartSection;
use crate::tree::tables::TableSection;
use crate::tree::types::{TypeEntry, TypeSection};

use super::instructions::{write_code, write_init_expr};
use super::{Encode, EncodeError, LENGTH_PREFIX_RESERVE};

fn write_string(out: &mut WriteCursor, string: &str) {
    out.write_varuint(string.len() as u64);
    out.write_string(string);
}

macro_rules! encode_entries {
    ($($section:ty),*) => {
        $(
            impl Encode for $section {
                fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
                    self.entries.encode(out)
                }
            }
        )*
    }
}

encode_entries!(
    TypeSection,
    ImportSection,
    FunctionSection,
    TableSection,
    MemorySection,
    GlobalSection,
    ExportSection,
    ElementSection,
    CodeSection,
    DataSection
);

impl Encode for CustomSection {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        write_string(out, &self.name);
        out.write_bytes(&self.payload);
        Ok(())
    }
}

impl Encode for TypeEntry {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        out.write_byte(self.form.to_byte());
        self.params.encode(out)?;
        match self.return_type {
            Some(return_type) => {
                out.write_varuint(1);
                out.write_byte(return_type.to_byte());
            }
            None => {
                out.write_varuint(0);
            }
        }
        Ok(())
    }
}

impl Encode for ImportEntry {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        write_string(out, &self.module);
        write_string(out, &self.field);
        match &self.kind {
            ImportKind::Function(type_index) => {
                out.write_byte(ExternalKind::Function.to_byte());
                type_index.encode(out)
            }
            ImportKind::Table(table) => {
                out.write_byte(ExternalKind::Table.to_byte());
                table.encode(out)
            }
            ImportKind::Memory(limits) => {
                out.write_byte(ExternalKind::Memory.to_byte());
                limits.encode(out)
            }
            ImportKind::Global(global) => {
                out.write_byte(ExternalKind::Global.to_byte());
                global.encode(out)
            }
        }
    }
}

impl Encode for GlobalEntry {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        self.ty.encode(out)?;
        write_init_expr(out, &self.init)
    }
}

impl Encode for ExportEntry {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        write_string(out, &self.field);
        out.write_byte(self.kind.to_byte());
        self.index.encode(out)
    }
}

impl Encode for StartSection {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        self.index.encode(out)
    }
}

impl Encode for ElementSegment {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        self.index.encode(out)?;
        write_init_expr(out, &self.offset)?;
        self.elements.encode(out)
    }
}

impl Encode for FunctionBody {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        let mut body = out.reserve_subregion(LENGTH_PREFIX_RESERVE);
        self.locals.encode(&mut body)?;
        write_code(&mut body, &self.code)?;
        let size = body.finish();
        trace!("Wrote function body, {} bytes", size);
        Ok(())
    }
}

impl Encode for LocalEntry {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        self.count.encode(out)?;
        self.ty.encode(out)
    }
}

impl Encode for DataSegment {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        self.index.encode(out)?;
        write_init_expr(out, &self.offset)?;
        out.write_varuint(self.data.len() as u64);
        out.write_bytes(&self.data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::language_types::{Immediate, Instruction, ValueType};

    fn encode<T: Encode>(node: &T) -> Vec<u8> {
        let mut out = WriteCursor::new();
        node.encode(&mut out).unwrap();
        out.into_inner()
    }

    #[test]
    fn function_body_is_length_prefixed() {
        let body = FunctionBody {
            locals: vec![LocalEntry { count: 2, ty: ValueType::I64 }],
            code: vec![
                Instruction::new("get_local").with_immediate(Immediate::VarUint32(0)),
                Instruction::new("drop"),
                Instruction::new("end"),
            ],
        };
        assert_eq!(encode(&body), vec![0x07, 0x01, 0x02, 0x7e, 0x20, 0x00, 0x1a, 0x0b]);
    }

    #[test]
    fn data_segment() {
        let segment = DataSegment {
            index: 0,
            offset: Instruction::typed(ValueType::I32, "const").with_immediate(Immediate::VarInt32(16)),
            data: b"hi".to_vec(),
        };
        assert_eq!(encode(&segment), vec![0x00, 0x41, 0x10, 0x0b, 0x02, b'h', b'i']);
    }

    #[test]
    fn export_entry() {
        let export = ExportEntry { field: "main".to_string(), kind: ExternalKind::Function, index: 3 };
        assert_eq!(encode(&export), vec![0x04, b'm', b'a', b'i', b'n', 0x00, 0x03]);
    }
}
