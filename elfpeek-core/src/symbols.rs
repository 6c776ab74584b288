use crate::error::Result;
use crate::reader::{Endian, FieldReader, Parse};
use goblin::elf::section_header::SHN_UNDEF;
use goblin::elf::sym::{bind_to_str, st_bind, st_type, type_to_str};
use std::ops::Range;

/// Common shape of `Elf32_Sym` and `Elf64_Sym`.
pub(crate) trait SymbolEntry: Parse {
    fn into_symbol(self, index: usize) -> Symbol;
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf32Sym {
    pub st_name: u32,
    pub st_value: u32,
    pub st_size: u32,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf64Sym {
    pub st_name: u32,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: u16,
    pub st_value: u64,
    pub st_size: u64,
}

impl Parse for Elf32Sym {
    const SIZE: usize = 16;

    fn parse(r: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Elf32Sym {
            st_name: r.u32()?,
            st_value: r.u32()?,
            st_size: r.u32()?,
            st_info: r.u8()?,
            st_other: r.u8()?,
            st_shndx: r.u16()?,
        })
    }
}

impl Parse for Elf64Sym {
    const SIZE: usize = 24;

    fn parse(r: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Elf64Sym {
            st_name: r.u32()?,
            st_info: r.u8()?,
            st_other: r.u8()?,
            st_shndx: r.u16()?,
            st_value: r.u64()?,
            st_size: r.u64()?,
        })
    }
}

impl SymbolEntry for Elf32Sym {
    fn into_symbol(self, index: usize) -> Symbol {
        Symbol {
            index,
            name_offset: self.st_name,
            value: self.st_value.into(),
            size: self.st_size.into(),
            info: self.st_info,
            other: self.st_other,
            shndx: self.st_shndx,
        }
    }
}

impl SymbolEntry for Elf64Sym {
    fn into_symbol(self, index: usize) -> Symbol {
        Symbol {
            index,
            name_offset: self.st_name,
            value: self.st_value,
            size: self.st_size,
            info: self.st_info,
            other: self.st_other,
            shndx: self.st_shndx,
        }
    }
}

/// A symbol-table entry with its fields widened to 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub index: usize,
    /// Offset of the name in the symbol-name string table.
    pub name_offset: u32,
    pub value: u64,
    pub size: u64,
    pub info: u8,
    pub other: u8,
    pub shndx: u16,
}

impl Symbol {
    pub fn binding(&self) -> u8 {
        st_bind(self.info)
    }

    pub fn kind(&self) -> u8 {
        st_type(self.info)
    }

    pub fn binding_name(&self) -> &'static str {
        bind_to_str(self.binding())
    }

    pub fn kind_name(&self) -> &'static str {
        type_to_str(self.kind())
    }

    pub fn is_undefined(&self) -> bool {
        u32::from(self.shndx) == SHN_UNDEF
    }
}

pub(crate) type ParseSymbolFn = fn(&[u8], usize, Endian) -> Result<Symbol>;

pub(crate) fn parse_symbol<S: SymbolEntry>(
    bytes: &[u8],
    index: usize,
    endian: Endian,
) -> Result<Symbol> {
    S::parse(&mut FieldReader::new(bytes, endian)).map(|sym| sym.into_symbol(index))
}

/// Location of the symbol table inside the mapping.
#[derive(Debug, Clone)]
pub struct SymbolTableRef {
    pub section_index: usize,
    pub range: Range<usize>,
    pub entsize: usize,
    /// `sh_size / sh_entsize` of the owning section.
    pub count: usize,
    pub(crate) endian: Endian,
    pub(crate) parse: ParseSymbolFn,
}

/// A symbol table borrowed from the mapping.
#[derive(Debug, Clone, Copy)]
pub struct SymbolTable<'a> {
    section_index: usize,
    data: &'a [u8],
    entsize: usize,
    count: usize,
    endian: Endian,
    parse: ParseSymbolFn,
}

impl<'a> SymbolTable<'a> {
    pub(crate) fn new(data: &'a [u8], table: &SymbolTableRef) -> Self {
        Self {
            section_index: table.section_index,
            data,
            entsize: table.entsize,
            count: table.count,
            endian: table.endian,
            parse: table.parse,
        }
    }

    pub fn section_index(&self) -> usize {
        self.section_index
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn get(&self, index: usize) -> Option<Symbol> {
        if index >= self.count {
            return None;
        }
        let start = index * self.entsize;
        let bytes = self.data.get(start..start + self.entsize)?;
        (self.parse)(bytes, index, self.endian).ok()
    }

    pub fn iter(&self) -> Symbols<'a> {
        Symbols {
            table: Some(*self),
            next: 0,
        }
    }
}

/// Iterator over symbol-table entries. Empty when the file has no symbol table.
pub struct Symbols<'a> {
    table: Option<SymbolTable<'a>>,
    next: usize,
}

impl Symbols<'_> {
    pub(crate) fn empty() -> Self {
        Symbols {
            table: None,
            next: 0,
        }
    }
}

impl Iterator for Symbols<'_> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        let sym = self.table.as_ref()?.get(self.next)?;
        self.next += 1;
        Some(sym)
    }
}
