use crate::error::Result;
use crate::reader::{Endian, FieldReader, Parse};
use goblin::elf::section_header::{SHT_NOBITS, SHT_NULL};

/// Fields the resolver needs from a section header, whatever its width.
pub(crate) trait SectionHeader: Parse {
    fn sh_name(&self) -> u32;
    fn sh_type(&self) -> u32;
    fn sh_flags(&self) -> u64;
    fn sh_addr(&self) -> u64;
    fn sh_offset(&self) -> u64;
    fn sh_size(&self) -> u64;
    fn sh_link(&self) -> u32;
    fn sh_info(&self) -> u32;
    fn sh_addralign(&self) -> u64;
    fn sh_entsize(&self) -> u64;
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf32Shdr {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u32,
    pub sh_addr: u32,
    pub sh_offset: u32,
    pub sh_size: u32,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u32,
    pub sh_entsize: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf64Shdr {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

impl Parse for Elf32Shdr {
    const SIZE: usize = 40;

    fn parse(r: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Elf32Shdr {
            sh_name: r.u32()?,
            sh_type: r.u32()?,
            sh_flags: r.u32()?,
            sh_addr: r.u32()?,
            sh_offset: r.u32()?,
            sh_size: r.u32()?,
            sh_link: r.u32()?,
            sh_info: r.u32()?,
            sh_addralign: r.u32()?,
            sh_entsize: r.u32()?,
        })
    }
}

impl Parse for Elf64Shdr {
    const SIZE: usize = 64;

    fn parse(r: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Elf64Shdr {
            sh_name: r.u32()?,
            sh_type: r.u32()?,
            sh_flags: r.u64()?,
            sh_addr: r.u64()?,
            sh_offset: r.u64()?,
            sh_size: r.u64()?,
            sh_link: r.u32()?,
            sh_info: r.u32()?,
            sh_addralign: r.u64()?,
            sh_entsize: r.u64()?,
        })
    }
}

impl SectionHeader for Elf32Shdr {
    fn sh_name(&self) -> u32 {
        self.sh_name
    }
    fn sh_type(&self) -> u32 {
        self.sh_type
    }
    fn sh_flags(&self) -> u64 {
        self.sh_flags.into()
    }
    fn sh_addr(&self) -> u64 {
        self.sh_addr.into()
    }
    fn sh_offset(&self) -> u64 {
        self.sh_offset.into()
    }
    fn sh_size(&self) -> u64 {
        self.sh_size.into()
    }
    fn sh_link(&self) -> u32 {
        self.sh_link
    }
    fn sh_info(&self) -> u32 {
        self.sh_info
    }
    fn sh_addralign(&self) -> u64 {
        self.sh_addralign.into()
    }
    fn sh_entsize(&self) -> u64 {
        self.sh_entsize.into()
    }
}

impl SectionHeader for Elf64Shdr {
    fn sh_name(&self) -> u32 {
        self.sh_name
    }
    fn sh_type(&self) -> u32 {
        self.sh_type
    }
    fn sh_flags(&self) -> u64 {
        self.sh_flags
    }
    fn sh_addr(&self) -> u64 {
        self.sh_addr
    }
    fn sh_offset(&self) -> u64 {
        self.sh_offset
    }
    fn sh_size(&self) -> u64 {
        self.sh_size
    }
    fn sh_link(&self) -> u32 {
        self.sh_link
    }
    fn sh_info(&self) -> u32 {
        self.sh_info
    }
    fn sh_addralign(&self) -> u64 {
        self.sh_addralign
    }
    fn sh_entsize(&self) -> u64 {
        self.sh_entsize
    }
}

/// A section header with its fields widened to 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub index: usize,
    /// Offset of the name in the section-name string table.
    pub name_offset: u32,
    pub sh_type: u32,
    pub flags: u64,
    pub addr: u64,
    pub file_offset: u64,
    pub size: u64,
    pub link: u32,
    pub info: u32,
    pub addralign: u64,
    pub entsize: u64,
}

impl Section {
    pub(crate) fn from_header<S: SectionHeader>(index: usize, sh: &S) -> Self {
        Section {
            index,
            name_offset: sh.sh_name(),
            sh_type: sh.sh_type(),
            flags: sh.sh_flags(),
            addr: sh.sh_addr(),
            file_offset: sh.sh_offset(),
            size: sh.sh_size(),
            link: sh.sh_link(),
            info: sh.sh_info(),
            addralign: sh.sh_addralign(),
            entsize: sh.sh_entsize(),
        }
    }

    /// True when the section's bytes are stored in the file.
    pub fn occupies_file(&self) -> bool {
        self.sh_type != SHT_NULL && self.sh_type != SHT_NOBITS
    }

    /// Human-readable section type, e.g. `SHT_SYMTAB`.
    pub fn type_name(&self) -> &'static str {
        goblin::elf::section_header::sht_to_str(self.sh_type)
    }
}

pub(crate) type ParseSectionFn = fn(&[u8], usize, usize, Endian) -> Result<Section>;

pub(crate) fn parse_section<S: SectionHeader>(
    data: &[u8],
    index: usize,
    offset: usize,
    endian: Endian,
) -> Result<Section> {
    S::parse_at(data, offset, endian).map(|sh| Section::from_header(index, &sh))
}

/// Location of the section-header table inside the mapping.
///
/// The whole table was bounds-checked at resolve time; entries are decoded on
/// demand.
#[derive(Debug, Clone, Copy)]
pub struct SectionTable {
    pub(crate) offset: usize,
    pub(crate) count: usize,
    pub(crate) entsize: usize,
    pub(crate) endian: Endian,
    pub(crate) parse: ParseSectionFn,
}

impl SectionTable {
    pub(crate) fn empty(endian: Endian) -> Self {
        SectionTable {
            offset: 0,
            count: 0,
            entsize: 0,
            endian,
            parse: parse_section::<Elf64Shdr>,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn read(&self, data: &[u8], index: usize) -> Result<Section> {
        (self.parse)(data, index, self.offset + index * self.entsize, self.endian)
    }

    pub(crate) fn get(&self, data: &[u8], index: usize) -> Option<Section> {
        if index >= self.count {
            return None;
        }
        self.read(data, index).ok()
    }
}

/// Iterator over the entries of a [`SectionTable`].
pub struct Sections<'a> {
    data: &'a [u8],
    table: SectionTable,
    next: usize,
}

impl<'a> Sections<'a> {
    pub(crate) fn new(data: &'a [u8], table: SectionTable) -> Self {
        Self {
            data,
            table,
            next: 0,
        }
    }
}

impl Iterator for Sections<'_> {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        let section = self.table.get(self.data, self.next)?;
        self.next += 1;
        Some(section)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.table.count.saturating_sub(self.next);
        (left, Some(left))
    }
}
