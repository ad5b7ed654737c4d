use crate::cursor::WriteCursor;
use crate::tree::language_types::{ExternalKind, GlobalType, LanguageType, ResizableLimits, TableType, ValueType};

use super::{Encode, EncodeError};

impl LanguageType {
    pub fn to_byte(self) -> u8 {
        match self {
            LanguageType::I32 => 0x7f,
            LanguageType::I64 => 0x7e,
            LanguageType::F32 => 0x7d,
            LanguageType::F64 => 0x7c,
            LanguageType::AnyFunc => 0x70,
            LanguageType::Func => 0x60,
            LanguageType::EmptyBlock => 0x40,
        }
    }
}

impl ValueType {
    pub fn to_byte(self) -> u8 {
        LanguageType::from(self).to_byte()
    }
}

impl ExternalKind {
    pub fn to_byte(self) -> u8 {
        match self {
            ExternalKind::Function => 0,
            ExternalKind::Table => 1,
            ExternalKind::Memory => 2,
            ExternalKind::Global => 3,
        }
    }
}

impl Encode for ValueType {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        out.write_byte(self.to_byte());
        Ok(())
    }
}

impl Encode for ResizableLimits {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        match self.maximum {
            Some(maximum) => {
                out.write_varuint(1);
                out.write_varuint(self.initial as u64);
                out.write_varuint(maximum as u64);
            }
            None => {
                out.write_varuint(0);
                out.write_varuint(self.initial as u64);
            }
        }
        Ok(())
    }
}

impl Encode for TableType {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        out.write_byte(self.element_type.to_byte());
        self.limits.encode(out)
    }
}

impl Encode for GlobalType {
    fn encode(&self, out: &mut WriteCursor) -> Result<(), EncodeError> {
        out.write_byte(self.content_type.to_byte());
        out.write_byte(self.mutable as u8);
        Ok(())
    }
}
