use crate::cursor::ReadCursor;
use crate::tree::language_types::{ExternalKind, GlobalType, LanguageType, ResizableLimits, TableType, ValueType};

use super::{DecodeError, Parse};

impl LanguageType {
    pub fn from_byte(byte: u8) -> Result<LanguageType, DecodeError> {
        match byte {
            0x7f => Ok(LanguageType::I32),
            0x7e => Ok(LanguageType::I64),
            0x7d => Ok(LanguageType::F32),
            0x7c => Ok(LanguageType::F64),
            0x70 => Ok(LanguageType::AnyFunc),
            0x60 => Ok(LanguageType::Func),
            0x40 => Ok(LanguageType::EmptyBlock),
            _ => Err(DecodeError::InvalidLanguageType(byte)),
        }
    }
}

impl Parse for LanguageType {
    fn parse(cursor: &mut ReadCursor) -> Result<LanguageType, DecodeError> {
        LanguageType::from_byte(cursor.read_byte()?)
    }
}

impl ValueType {
    pub fn from_byte(byte: u8) -> Result<ValueType, DecodeError> {
        match byte {
            0x7f => Ok(ValueType::I32),
            0x7e => Ok(ValueType::I64),
            0x7d => Ok(ValueType::F32),
            0x7c => Ok(ValueType::F64),
            _ => Err(DecodeError::InvalidValueType(byte)),
        }
    }
}

impl Parse for ValueType {
    fn parse(cursor: &mut ReadCursor) -> Result<ValueType, DecodeError> {
        ValueType::from_byte(cursor.read_byte()?)
    }
}

impl Parse for ExternalKind {
    fn parse(cursor: &mut ReadCursor) -> Result<ExternalKind, DecodeError> {
        match cursor.read_byte()? {
            0 => Ok(ExternalKind::Function),
            1 => Ok(ExternalKind::Table),
            2 => Ok(ExternalKind::Memory),
            3 => Ok(ExternalKind::Global),
            other => Err(DecodeError::InvalidExternalKind(other)),
        }
    }
}

impl Parse for ResizableLimits {
    fn parse(cursor: &mut ReadCursor) -> Result<ResizableLimits, DecodeError> {
        let flags = cursor.read_varuint32()?;
        let initial = cursor.read_varuint32()?;
        let maximum = match flags {
            0 => None,
            1 => Some(cursor.read_varuint32()?),
            other => return Err(DecodeError::InvalidLimitsFlags(other)),
        };
        Ok(ResizableLimits { initial, maximum })
    }
}

impl Parse for TableType {
    fn parse(cursor: &mut ReadCursor) -> Result<TableType, DecodeError> {
        let element_type = LanguageType::parse(cursor)?;
        let limits = ResizableLimits::parse(cursor)?;
        Ok(TableType { element_type, limits })
    }
}

impl Parse for GlobalType {
    fn parse(cursor: &mut ReadCursor) -> Result<GlobalType, DecodeError> {
        let content_type = ValueType::parse(cursor)?;
        let mutable = match cursor.read_byte()? {
            0 => false,
            1 => true,
            other => return Err(DecodeError::InvalidMutability(other)),
        };
        Ok(GlobalType { content_type, mutable })
    }
}
