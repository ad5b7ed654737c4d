use serde::{Deserialize, Serialize};

use super::code::CodeSection;
use super::custom::CustomSection;
use super::data::DataSection;
use super::elements::ElementSection;
use super::exports::ExportSection;
use super::functions::FunctionSection;
use super::globals::GlobalSection;
use super::imports::ImportSection;
use super::memory::MemorySection;
use super::start::StartSection;
use super::tables::TableSection;
use super::types::TypeSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum SectionId {
    Custom = 0,
    Type = 1,
    Import = 2,
    Function = 3,
    Table = 4,
    Memory = 5,
    Global = 6,
    Export = 7,
    Start = 8,
    Element = 9,
    Code = 10,
    Data = 11,
}

impl TryFrom<u8> for SectionId {
    type Error = u8;

    fn try_from(id: u8) -> Result<SectionId, u8> {
        Ok(match id {
            0 => SectionId::Custom,
            1 => SectionId::Type,
            2 => SectionId::Import,
            3 => SectionId::Function,
            4 => SectionId::Table,
            5 => SectionId::Memory,
            6 => SectionId::Global,
            7 => SectionId::Export,
            8 => SectionId::Start,
            9 => SectionId::Element,
            10 => SectionId::Code,
            11 => SectionId::Data,
            other => return Err(other),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Section {
    Custom(CustomSection),
    Type(TypeSection),
    Import(ImportSection),
    Function(FunctionSection),
    Table(TableSection),
    Memory(MemorySection),
    Global(GlobalSection),
    Export(ExportSection),
    Start(StartSection),
    Element(ElementSection),
    Code(CodeSection),
    Data(DataSection),
}

impl Section {
    pub fn id(&self) -> SectionId {
        match *self {
            Section::Custom(_) => SectionId::Custom,
            Section::Type(_) => SectionId::Type,
            Section::Import(_) => SectionId::Import,
            Section::Function(_) => SectionId::Function,
            Section::Table(_) => SectionId::Table,
            Section::Memory(_) => SectionId::Memory,
            Section::Global(_) => SectionId::Global,
            Section::Export(_) => SectionId::Export,
            Section::Start(_) => SectionId::Start,
            Section::Element(_) => SectionId::Element,
            Section::Code(_) => SectionId::Code,
            Section::Data(_) => SectionId::Data,
        }
    }

    /// An entry-less section of the given kind. `None` for kinds that carry a
    /// mandatory payload (custom and start).
    pub fn empty(id: SectionId) -> Option<Section> {
        Some(match id {
            SectionId::Type => Section::Type(TypeSection::default()),
            SectionId::Import => Section::Import(ImportSection::default()),
            SectionId::Function => Section::Function(FunctionSection::default()),
            SectionId::Table => Section::Table(TableSection::default()),
            SectionId::Memory => Section::Memory(MemorySection::default()),
            SectionId::Global => Section::Global(GlobalSection::default()),
            SectionId::Export => Section::Export(ExportSection::default()),
            SectionId::Element => Section::Element(ElementSection::default()),
            SectionId::Code => Section::Code(CodeSection::default()),
            SectionId::Data => Section::Data(DataSection::default()),
            SectionId::Custom | SectionId::Start => return None,
        })
    }
}
