pub mod code;
pub mod custom;
pub mod data;
pub mod elements;
pub mod exports;
pub mod functions;
pub mod globals;
pub mod imports;
pub mod language_types;
pub mod memory;
pub mod section;
pub mod start;
pub mod tables;
pub mod types;

use serde::{Deserialize, Serialize};

use self::section::{Section, SectionId};

pub const MAGIC_NUMBER: [u8; 4] = *b"\0asm";

/// The 8 bytes in front of every module. Carried verbatim, never validated.
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Preamble {
    pub magic: [u8; 4],
    pub version: u32,
}

impl Default for Preamble {
    fn default() -> Preamble {
        Preamble {
            magic: MAGIC_NUMBER,
            version: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
pub struct Module {
    pub preamble: Preamble,
    pub sections: Vec<Section>,
}

macro_rules! section_accessors {
    ($($variant:ident: $get:ident, $get_mut:ident -> $ty:ty;)*) => {
        $(
            pub fn $get(&self) -> Option<&$ty> {
                self.sections.iter().find_map(|section| match section {
                    Section::$variant(inner) => Some(inner),
                    _ => None,
                })
            }

            pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                self.sections.iter_mut().find_map(|section| match section {
                    Section::$variant(inner) => Some(inner),
                    _ => None,
                })
            }
        )*
    }
}

impl Module {
    pub fn new(sections: Vec<Section>) -> Module {
        Module {
            preamble: Preamble::default(),
            sections,
        }
    }

    section_accessors! {
        Type: types, types_mut -> types::TypeSection;
        Import: imports, imports_mut -> imports::ImportSection;
        Function: functions, functions_mut -> functions::FunctionSection;
        Export: exports, exports_mut -> exports::ExportSection;
        Start: start, start_mut -> start::StartSection;
        Element: elements, elements_mut -> elements::ElementSection;
        Code: code, code_mut -> code::CodeSection;
    }

    pub fn has_section(&self, id: SectionId) -> bool {
        self.sections.iter().any(|section| section.id() == id)
    }

    /// Inserts `section` before the first non-custom section with a greater id,
    /// or at the end if there is none.
    pub fn insert_section(&mut self, section: Section) {
        let id = section.id();
        let position = self.sections.iter()
            .position(|existing| existing.id() != SectionId::Custom && existing.id() > id)
            .unwrap_or(self.sections.len());
        self.sections.insert(position, section);
    }

    /// Number of imported functions, i.e. the index of the first defined function.
    pub fn function_import_count(&self) -> u32 {
        self.imports()
            .map(|imports| imports.entries.iter().filter(|entry| entry.is_function()).count() as u32)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::code::CodeSection;
    use super::custom::CustomSection;
    use super::types::TypeSection;

    fn ids(module: &Module) -> Vec<SectionId> {
        module.sections.iter().map(Section::id).collect()
    }

    #[test]
    fn insert_section_keeps_id_order() {
        let mut module = Module::new(vec![
            Section::Custom(CustomSection { name: "a".to_string(), payload: vec![] }),
            Section::Function(Default::default()),
            Section::Code(CodeSection::default()),
        ]);
        module.insert_section(Section::Type(TypeSection::default()));
        assert_eq!(ids(&module), vec![SectionId::Custom, SectionId::Type, SectionId::Function, SectionId::Code]);

        module.insert_section(Section::empty(SectionId::Import).unwrap());
        assert_eq!(
            ids(&module),
            vec![SectionId::Custom, SectionId::Type, SectionId::Import, SectionId::Function, SectionId::Code]
        );
    }

    #[test]
    fn insert_section_appends_when_nothing_follows() {
        let mut module = Module::default();
        module.insert_section(Section::empty(SectionId::Import).unwrap());
        module.insert_section(Section::empty(SectionId::Type).unwrap());
        assert_eq!(ids(&module), vec![SectionId::Type, SectionId::Import]);
        assert!(module.has_section(SectionId::Type));
        assert!(module.types().is_some());
        assert_eq!(module.function_import_count(), 0);
    }
}
