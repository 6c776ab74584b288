pub mod elf;

use goblin::elf::header::{
    ELFCLASS32, ELFCLASS64, ELFCLASSNONE, ELFDATA2LSB, ELFDATA2MSB, ELFDATANONE, ET_CORE, ET_DYN,
    ET_EXEC, ET_NONE, ET_REL, EI_CLASS, EI_DATA, EI_VERSION,
};

/// Width-independent view of an ELF file header.
///
/// Implemented by [`elf::Elf32Ehdr`] and [`elf::Elf64Ehdr`]; the width is
/// chosen once when the file is resolved.
pub trait Header: std::fmt::Debug + Send + Sync {
    /// Raw `e_ident` bytes.
    fn ident(&self) -> &[u8; 16];

    /// Object file type (`e_type`).
    fn object_type(&self) -> u16;

    /// Returns the machine architecture identifier.
    fn machine(&self) -> u16;

    /// Object file version (`e_version`).
    fn version(&self) -> u32;

    /// Returns the virtual address of the entry point.
    fn entry_point(&self) -> u64;

    fn phoff(&self) -> u64;
    fn phentsize(&self) -> u16;
    fn phnum(&self) -> u16;

    fn shoff(&self) -> u64;
    fn shentsize(&self) -> u16;

    /// Section count as declared in the header. Zero may mean extended
    /// numbering, see [`ElfFile::section_count`](crate::ElfFile::section_count).
    fn shnum(&self) -> u16;

    /// Section-name string table index as declared in the header.
    fn shstrndx(&self) -> u16;

    /// Returns true if this is a 64-bit binary.
    fn is_64(&self) -> bool;

    fn class_byte(&self) -> u8 {
        self.ident()[EI_CLASS]
    }

    fn data_byte(&self) -> u8 {
        self.ident()[EI_DATA]
    }

    fn ident_version(&self) -> u8 {
        self.ident()[EI_VERSION]
    }
}

/// Address width of an ELF object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Class32,
    Class64,
    Unknown(u8),
}

impl ElfClass {
    pub fn from_ident(class: u8) -> Self {
        match class {
            ELFCLASS32 => ElfClass::Class32,
            ELFCLASS64 => ElfClass::Class64,
            other => ElfClass::Unknown(other),
        }
    }
}

pub fn class_name(class: u8) -> &'static str {
    match class {
        ELFCLASSNONE => "None",
        ELFCLASS32 => "ELF32",
        ELFCLASS64 => "ELF64",
        _ => "Unknown",
    }
}

pub fn data_name(data: u8) -> &'static str {
    match data {
        ELFDATANONE => "None",
        ELFDATA2LSB => "2's complement, little endian",
        ELFDATA2MSB => "2's complement, big endian",
        _ => "Unknown",
    }
}

/// OS- and processor-specific ranges are reported as "Unknown".
pub fn type_name(e_type: u16) -> &'static str {
    match e_type {
        ET_NONE => "No file type",
        ET_REL => "Relocatable",
        ET_EXEC => "Executable",
        ET_DYN => "Shared object",
        ET_CORE => "Core",
        _ => "Unknown",
    }
}
