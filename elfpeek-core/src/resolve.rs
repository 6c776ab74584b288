use crate::error::{ElfError, Result};
use crate::header::elf::{Elf32Ehdr, Elf64Ehdr};
use crate::header::{ElfClass, Header};
use crate::reader::{checked_range, Endian, Parse};
use crate::sections::{parse_section, Elf32Shdr, Elf64Shdr, Section, SectionHeader, SectionTable};
use crate::strtab::StringTableRef;
use crate::symbols::{parse_symbol, Elf32Sym, Elf64Sym, SymbolEntry, SymbolTableRef};
use goblin::elf::header::{EI_CLASS, EI_DATA};
use goblin::elf::section_header::{SHN_UNDEF, SHN_XINDEX, SHT_STRTAB, SHT_SYMTAB};

const EI_NIDENT: usize = 16;

/// One family of on-disk structures (32- or 64-bit).
pub(crate) trait Width {
    const CLASS: ElfClass;
    type Ehdr: Header + Parse + 'static;
    type Shdr: SectionHeader;
    type Sym: SymbolEntry;
}

pub(crate) enum Elf32 {}
pub(crate) enum Elf64 {}

impl Width for Elf32 {
    const CLASS: ElfClass = ElfClass::Class32;
    type Ehdr = Elf32Ehdr;
    type Shdr = Elf32Shdr;
    type Sym = Elf32Sym;
}

impl Width for Elf64 {
    const CLASS: ElfClass = ElfClass::Class64;
    type Ehdr = Elf64Ehdr;
    type Shdr = Elf64Shdr;
    type Sym = Elf64Sym;
}

/// Everything derived from the file bytes at open time.
///
/// Holds offsets and counts only; slices are produced against the mapping on
/// demand so the layout never outlives or aliases it.
#[derive(Debug)]
pub struct Layout {
    pub class: ElfClass,
    pub endian: Endian,
    pub header: Box<dyn Header>,
    pub sections: SectionTable,
    pub shstrtab: Option<StringTableRef>,
    pub symstrtab: Option<StringTableRef>,
    pub symtab: Option<SymbolTableRef>,
}

impl Layout {
    /// Locates the header, section table, both string tables and the symbol
    /// table in `data`. The magic is assumed to have been checked already.
    pub fn resolve(data: &[u8]) -> Result<Self> {
        if data.len() < EI_NIDENT {
            return Err(ElfError::malformed(format!(
                "file is {} bytes, shorter than the identification block",
                data.len()
            )));
        }

        let endian = Endian::from_ident(data[EI_DATA]);
        match ElfClass::from_ident(data[EI_CLASS]) {
            ElfClass::Class32 => resolve_with::<Elf32>(data, endian),
            ElfClass::Class64 => resolve_with::<Elf64>(data, endian),
            ElfClass::Unknown(class) => Err(ElfError::UnsupportedClass { class }),
        }
    }
}

fn resolve_with<W: Width>(data: &[u8], endian: Endian) -> Result<Layout> {
    if data.len() < W::Ehdr::SIZE {
        return Err(ElfError::malformed(format!(
            "file is {} bytes, shorter than the {}-byte file header",
            data.len(),
            W::Ehdr::SIZE
        )));
    }
    let header = W::Ehdr::parse_at(data, 0, endian)?;

    if header.phnum() > 0 {
        let size = u64::from(header.phnum()) * u64::from(header.phentsize());
        checked_range(header.phoff(), size, data.len(), "program header table")?;
    }

    let sections = section_table::<W>(data, &header, endian)?;
    let shstrndx = section_name_index(data, &header, &sections)?;

    let mut shstrtab = None;
    if shstrndx != 0 {
        if shstrndx >= sections.len() {
            return Err(ElfError::malformed(format!(
                "section name table index {shstrndx} out of range ({} sections)",
                sections.len()
            )));
        }
        let sh = sections.read(data, shstrndx)?;
        let range = checked_range(sh.file_offset, sh.size, data.len(), "section name table")?;
        log::debug!("section name table: section {shstrndx}, {} bytes", range.len());
        shstrtab = Some(StringTableRef {
            section_index: shstrndx,
            range,
        });
    }

    let mut symstrtab: Option<StringTableRef> = None;
    let mut symtab: Option<SymbolTableRef> = None;

    for index in 0..sections.len() {
        let sh = sections.read(data, index)?;
        if !sh.occupies_file() {
            continue;
        }
        let range = checked_range(sh.file_offset, sh.size, data.len(), &format!("section {index}"))?;

        match sh.sh_type {
            SHT_STRTAB => {
                if symstrtab.is_none() && sh.flags == 0 && index != shstrndx {
                    log::debug!("symbol name table: section {index}, {} bytes", range.len());
                    symstrtab = Some(StringTableRef {
                        section_index: index,
                        range,
                    });
                }
            }
            SHT_SYMTAB => {
                let table = symbol_table::<W>(&sh, range, endian)?;
                if let Some(previous) = &symtab {
                    log::warn!(
                        "multiple symbol tables: section {index} replaces section {}",
                        previous.section_index
                    );
                }
                log::debug!("symbol table: section {index}, {} entries", table.count);
                symtab = Some(table);
            }
            _ => {}
        }
    }

    Ok(Layout {
        class: W::CLASS,
        endian,
        header: Box::new(header),
        sections,
        shstrtab,
        symstrtab,
        symtab,
    })
}

/// Validates the section-header table location. Handles extended numbering,
/// where `e_shnum == 0` and section 0's `sh_size` carries the real count.
fn section_table<W: Width>(
    data: &[u8],
    header: &W::Ehdr,
    endian: Endian,
) -> Result<SectionTable> {
    let entsize = W::Shdr::SIZE;
    let shoff = header.shoff();
    if shoff == 0 {
        return Ok(SectionTable::empty(endian));
    }

    let declared = usize::from(header.shnum());
    if declared > 0 && usize::from(header.shentsize()) != entsize {
        return Err(ElfError::malformed(format!(
            "section header entry size {} does not match {entsize}",
            header.shentsize()
        )));
    }

    let first = checked_range(shoff, entsize as u64, data.len(), "section header table")?;
    let count = if declared == 0 {
        let zero = parse_section::<W::Shdr>(data, 0, first.start, endian)?;
        usize::try_from(zero.size)
            .map_err(|_| ElfError::malformed("extended section count does not fit in memory"))?
    } else {
        declared
    };

    let size = (count as u64)
        .checked_mul(entsize as u64)
        .ok_or_else(|| ElfError::malformed("section header table size overflows"))?;
    let range = checked_range(shoff, size, data.len(), "section header table")?;
    log::debug!("section header table at {:#x}: {count} entries", range.start);

    Ok(SectionTable {
        offset: range.start,
        count,
        entsize,
        endian,
        parse: parse_section::<W::Shdr>,
    })
}

/// `e_shstrndx`, or section 0's `sh_link` when it is `SHN_XINDEX`.
fn section_name_index(
    data: &[u8],
    header: &dyn Header,
    sections: &SectionTable,
) -> Result<usize> {
    let declared = u32::from(header.shstrndx());
    if declared == SHN_UNDEF {
        return Ok(0);
    }
    if declared != SHN_XINDEX {
        return Ok(declared as usize);
    }

    let zero = sections
        .get(data, 0)
        .ok_or_else(|| ElfError::malformed("SHN_XINDEX used without a section header table"))?;
    Ok(zero.link as usize)
}

fn symbol_table<W: Width>(
    sh: &Section,
    range: std::ops::Range<usize>,
    endian: Endian,
) -> Result<SymbolTableRef> {
    let entsize = usize::try_from(sh.entsize)
        .ok()
        .filter(|&size| size >= W::Sym::SIZE)
        .ok_or_else(|| {
            ElfError::malformed(format!(
                "symbol table in section {} has entry size {}",
                sh.index, sh.entsize
            ))
        })?;

    Ok(SymbolTableRef {
        section_index: sh.index,
        count: range.len() / entsize,
        range,
        entsize,
        endian,
        parse: parse_symbol::<W::Sym>,
    })
}
