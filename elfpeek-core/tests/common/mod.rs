//! Builds small ELF images in memory for the integration tests.

#![allow(dead_code)]

use byteorder::{WriteBytesExt, BE, LE};
use std::io::Write;
use tempfile::NamedTempFile;

pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_NOBITS: u32 = 8;
pub const SHF_ALLOC: u64 = 0x2;

pub const ET_REL: u16 = 1;
pub const ET_EXEC: u16 = 2;
pub const ET_DYN: u16 = 3;

#[derive(Debug, Clone)]
pub struct SectionDef {
    pub name: &'static str,
    pub sh_type: u32,
    pub flags: u64,
    pub data: Vec<u8>,
    pub entsize: u64,
    pub link: u32,
    /// Size written to the header instead of `data.len()`.
    pub declared_size: Option<u64>,
    /// Offset written to the header instead of the real one.
    pub declared_offset: Option<u64>,
}

impl SectionDef {
    pub fn new(name: &'static str, sh_type: u32, data: Vec<u8>) -> Self {
        Self {
            name,
            sh_type,
            flags: 0,
            data,
            entsize: 0,
            link: 0,
            declared_size: None,
            declared_offset: None,
        }
    }

    pub fn flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }

    pub fn entsize(mut self, entsize: u64) -> Self {
        self.entsize = entsize;
        self
    }

    pub fn link(mut self, link: u32) -> Self {
        self.link = link;
        self
    }

    pub fn declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }

    pub fn declared_offset(mut self, offset: u64) -> Self {
        self.declared_offset = Some(offset);
        self
    }
}

/// Field writer that honours the image's byte order.
struct Out {
    buf: Vec<u8>,
    big: bool,
}

impl Out {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        if self.big {
            self.buf.write_u16::<BE>(v).unwrap();
        } else {
            self.buf.write_u16::<LE>(v).unwrap();
        }
    }

    fn u32(&mut self, v: u32) {
        if self.big {
            self.buf.write_u32::<BE>(v).unwrap();
        } else {
            self.buf.write_u32::<LE>(v).unwrap();
        }
    }

    fn u64(&mut self, v: u64) {
        if self.big {
            self.buf.write_u64::<BE>(v).unwrap();
        } else {
            self.buf.write_u64::<LE>(v).unwrap();
        }
    }

    /// Address-sized field.
    fn addr(&mut self, is_64: bool, v: u64) {
        if is_64 {
            self.u64(v);
        } else {
            self.u32(v as u32);
        }
    }

    fn align(&mut self, to: usize) {
        while self.buf.len() % to != 0 {
            self.buf.push(0);
        }
    }
}

/// A symbol to place in a generated symbol table.
#[derive(Debug, Clone, Copy)]
pub struct SymDef {
    pub name: &'static str,
    pub value: u64,
    pub size: u64,
    pub info: u8,
    pub shndx: u16,
}

/// Builds `(symtab bytes, strtab bytes)`. A null symbol is emitted first.
pub fn symbol_tables(is_64: bool, big: bool, syms: &[SymDef]) -> (Vec<u8>, Vec<u8>) {
    let mut strtab = vec![0u8];
    let mut out = Out {
        buf: Vec::new(),
        big,
    };

    let null = SymDef {
        name: "",
        value: 0,
        size: 0,
        info: 0,
        shndx: 0,
    };
    for sym in std::iter::once(&null).chain(syms) {
        let name = if sym.name.is_empty() {
            0
        } else {
            let off = strtab.len() as u32;
            strtab.extend_from_slice(sym.name.as_bytes());
            strtab.push(0);
            off
        };

        if is_64 {
            out.u32(name);
            out.u8(sym.info);
            out.u8(0);
            out.u16(sym.shndx);
            out.u64(sym.value);
            out.u64(sym.size);
        } else {
            out.u32(name);
            out.u32(sym.value as u32);
            out.u32(sym.size as u32);
            out.u8(sym.info);
            out.u8(0);
            out.u16(sym.shndx);
        }
    }

    (out.buf, strtab)
}

pub fn sym_entsize(is_64: bool) -> u64 {
    if is_64 {
        24
    } else {
        16
    }
}

#[derive(Debug, Clone)]
pub struct ElfBuilder {
    pub is_64: bool,
    pub big_endian: bool,
    pub class_byte: Option<u8>,
    pub data_byte: Option<u8>,
    pub e_type: u16,
    pub version: u32,
    pub sections: Vec<SectionDef>,
    /// Section index `.shstrtab` is inserted at. Defaults to last.
    pub shstrtab_at: Option<usize>,
    /// Store the section count and name-table index in section 0.
    pub extended_numbering: bool,
    /// Overrides the declared `e_shoff`.
    pub shoff: Option<u64>,
}

impl ElfBuilder {
    pub fn new(is_64: bool, big_endian: bool) -> Self {
        Self {
            is_64,
            big_endian,
            class_byte: None,
            data_byte: None,
            e_type: ET_REL,
            version: 1,
            sections: Vec::new(),
            shstrtab_at: None,
            extended_numbering: false,
            shoff: None,
        }
    }

    pub fn section(mut self, section: SectionDef) -> Self {
        self.sections.push(section);
        self
    }

    /// Appends `.symtab` and `.strtab` built from `syms`.
    pub fn with_symbols(self, syms: &[SymDef]) -> Self {
        let (symtab, strtab) = symbol_tables(self.is_64, self.big_endian, syms);
        let entsize = sym_entsize(self.is_64);
        self.section(SectionDef::new(".symtab", SHT_SYMTAB, symtab).entsize(entsize))
            .section(SectionDef::new(".strtab", SHT_STRTAB, strtab))
    }

    /// Section list in final order, including the null section and `.shstrtab`.
    fn final_sections(&self) -> (Vec<SectionDef>, usize) {
        let mut sections = vec![SectionDef::new("", 0, Vec::new())];
        sections.extend(self.sections.iter().cloned());

        let at = self.shstrtab_at.unwrap_or(sections.len()).min(sections.len());
        sections.insert(at, SectionDef::new(".shstrtab", SHT_STRTAB, Vec::new()));

        let mut names = vec![0u8];
        for s in &sections {
            if !s.name.is_empty() {
                names.extend_from_slice(s.name.as_bytes());
                names.push(0);
            }
        }
        sections[at].data = names;
        (sections, at)
    }

    pub fn build(&self) -> Vec<u8> {
        let (sections, shstrndx) = self.final_sections();
        let is_64 = self.is_64;
        let ehsize = if is_64 { 64 } else { 52 };
        let shentsize = if is_64 { 64 } else { 40 };

        // Same order `final_sections` laid the names out in.
        let mut name_offsets = Vec::new();
        let mut next = 1u32;
        for s in &sections {
            if s.name.is_empty() {
                name_offsets.push(0);
            } else {
                name_offsets.push(next);
                next += s.name.len() as u32 + 1;
            }
        }

        let mut out = Out {
            buf: vec![0u8; ehsize],
            big: self.big_endian,
        };

        let mut offsets = Vec::new();
        for s in &sections {
            out.align(8);
            offsets.push(out.buf.len() as u64);
            out.buf.extend_from_slice(&s.data);
        }
        out.align(8);
        let shoff = out.buf.len() as u64;

        let count = sections.len();
        for (i, s) in sections.iter().enumerate() {
            let mut size = s.declared_size.unwrap_or(s.data.len() as u64);
            let mut link = s.link;
            let offset = if i == 0 { 0 } else { s.declared_offset.unwrap_or(offsets[i]) };
            if i == 0 && self.extended_numbering {
                size = count as u64;
                link = shstrndx as u32;
            }

            out.u32(name_offsets[i]);
            out.u32(s.sh_type);
            out.addr(is_64, s.flags);
            out.addr(is_64, 0);
            out.addr(is_64, offset);
            out.addr(is_64, size);
            out.u32(link);
            out.u32(0);
            out.addr(is_64, 1);
            out.addr(is_64, s.entsize);
        }

        let (shnum, e_shstrndx) = if self.extended_numbering {
            (0u16, 0xffffu16)
        } else {
            (count as u16, shstrndx as u16)
        };

        let mut hdr = Out {
            buf: Vec::new(),
            big: self.big_endian,
        };
        hdr.buf.extend_from_slice(b"\x7fELF");
        hdr.u8(self.class_byte.unwrap_or(if is_64 { 2 } else { 1 }));
        hdr.u8(self.data_byte.unwrap_or(if self.big_endian { 2 } else { 1 }));
        hdr.u8(1);
        hdr.buf.resize(16, 0);
        hdr.u16(self.e_type);
        hdr.u16(62);
        hdr.u32(self.version);
        hdr.addr(is_64, 0);
        hdr.addr(is_64, 0);
        hdr.addr(is_64, self.shoff.unwrap_or(shoff));
        hdr.u32(0);
        hdr.u16(ehsize as u16);
        hdr.u16(0);
        hdr.u16(0);
        hdr.u16(shentsize);
        hdr.u16(shnum);
        hdr.u16(e_shstrndx);
        assert_eq!(hdr.buf.len(), ehsize);

        out.buf[..ehsize].copy_from_slice(&hdr.buf);
        out.buf
    }

    pub fn write(&self) -> NamedTempFile {
        write_bytes(&self.build())
    }
}

pub fn write_bytes(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

pub fn func(name: &'static str, value: u64, size: u64) -> SymDef {
    SymDef {
        name,
        value,
        size,
        info: (1 << 4) | 2, // GLOBAL FUNC
        shndx: 1,
    }
}
