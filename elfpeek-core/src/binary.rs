use crate::error::{ElfError, Result};
use crate::header::{class_name, data_name, type_name, ElfClass, Header};
use crate::reader::Endian;
use crate::resolve::Layout;
use crate::sections::{Section, Sections};
use crate::strtab::StringTable;
use crate::symbols::{Symbol, SymbolTable, Symbols};
use goblin::elf::header::{ELFMAG, SELFMAG};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::{Path, PathBuf};

/// A read-only, memory-mapped ELF object.
///
/// The file stays open and mapped until [`ElfFile::close`] (or drop). All
/// structure is located once in [`ElfFile::open`]; the accessors only read
/// cached offsets and never fail.
#[derive(Debug)]
pub struct ElfFile {
    path: PathBuf,
    map: Mmap,
    layout: Layout,
    _file: File,
}

impl ElfFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ElfError::from_io(path, e))?;
        let len = file.metadata().map_err(|e| ElfError::from_io(path, e))?.len();

        // An empty file cannot be mapped.
        if len < SELFMAG as u64 {
            return Err(ElfError::NotAnElfFile {
                path: path.to_path_buf(),
            });
        }

        // SAFETY: mapped read-only; the file must not be truncated while mapped.
        let map =
            unsafe { MmapOptions::new().map(&file) }.map_err(|e| ElfError::from_io(path, e))?;

        if &map[..SELFMAG] != ELFMAG {
            log::debug!("{}: bad magic {:02x?}", path.display(), &map[..SELFMAG]);
            return Err(ElfError::NotAnElfFile {
                path: path.to_path_buf(),
            });
        }

        let layout = Layout::resolve(&map)?;
        log::info!(
            "opened {} ({}, {}, {} sections, {})",
            path.display(),
            class_name(layout.header.class_byte()),
            type_name(layout.header.object_type()),
            layout.sections.len(),
            match &layout.symtab {
                Some(symtab) => format!("{} symbols", symtab.count),
                None => "no symbol table".to_string(),
            }
        );

        Ok(Self {
            path: path.to_path_buf(),
            map,
            layout,
            _file: file,
        })
    }

    /// Unmaps the file and closes it. Equivalent to dropping the handle.
    pub fn close(self) {
        log::debug!("closing {}", self.path.display());
        drop(self);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the mapping in bytes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.map
    }

    /// "None", "ELF32", "ELF64" or "Unknown".
    pub fn class(&self) -> &'static str {
        class_name(self.layout.header.class_byte())
    }

    pub fn data(&self) -> &'static str {
        data_name(self.layout.header.data_byte())
    }

    pub fn version(&self) -> u32 {
        self.layout.header.version()
    }

    /// Canonical name of `e_type`, e.g. "Relocatable".
    pub fn object_type(&self) -> &'static str {
        type_name(self.layout.header.object_type())
    }

    pub fn elf_class(&self) -> ElfClass {
        self.layout.class
    }

    pub fn endian(&self) -> Endian {
        self.layout.endian
    }

    pub fn header(&self) -> &dyn Header {
        self.layout.header.as_ref()
    }

    /// Number of section headers, after extended numbering is applied.
    pub fn section_count(&self) -> usize {
        self.layout.sections.len()
    }

    pub fn section(&self, index: usize) -> Option<Section> {
        self.layout.sections.get(&self.map, index)
    }

    pub fn sections(&self) -> Sections<'_> {
        Sections::new(&self.map, self.layout.sections)
    }

    pub fn section_name(&self, section: &Section) -> Option<&str> {
        self.section_name_table()?.get(section.name_offset)
    }

    /// File bytes of a section; empty for sections that occupy no file space.
    pub fn section_data(&self, section: &Section) -> &[u8] {
        if !section.occupies_file() {
            return &[];
        }
        let start = section.file_offset as usize;
        let end = start.saturating_add(section.size as usize);
        self.map.get(start..end).unwrap_or(&[])
    }

    /// The table holding section names, located through `e_shstrndx`.
    pub fn section_name_table(&self) -> Option<StringTable<'_>> {
        let table = self.layout.shstrtab.as_ref()?;
        Some(StringTable::new(table.section_index, &self.map[table.range.clone()]))
    }

    /// The table holding symbol names: the first unflagged string table that
    /// is not the section-name table.
    pub fn symbol_name_table(&self) -> Option<StringTable<'_>> {
        let table = self.layout.symstrtab.as_ref()?;
        Some(StringTable::new(table.section_index, &self.map[table.range.clone()]))
    }

    /// The symbol table, or `None` for stripped files. When several
    /// `SHT_SYMTAB` sections exist this is the last one.
    pub fn symbol_table(&self) -> Option<SymbolTable<'_>> {
        let table = self.layout.symtab.as_ref()?;
        Some(SymbolTable::new(&self.map[table.range.clone()], table))
    }

    pub fn symbol_count(&self) -> Option<usize> {
        self.layout.symtab.as_ref().map(|t| t.count)
    }

    pub fn symbols(&self) -> Symbols<'_> {
        match self.symbol_table() {
            Some(table) => table.iter(),
            None => Symbols::empty(),
        }
    }

    pub fn symbol_name(&self, symbol: &Symbol) -> Option<&str> {
        self.symbol_name_table()?.get(symbol.name_offset)
    }
}
