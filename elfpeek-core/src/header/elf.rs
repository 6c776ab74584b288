use crate::error::Result;
use crate::header::Header;
use crate::reader::{FieldReader, Parse};

/// `Elf64_Ehdr`, decoded field by field in the file's byte order.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf64Ehdr {
    /// Magic, class, data encoding, ident version, OS ABI and padding.
    pub e_ident: [u8; 16],
    /// `ET_REL`, `ET_EXEC`, `ET_DYN`, `ET_CORE`, ...
    pub e_type: u16,
    pub e_machine: u16,
    /// Reported by [`Header::version`]; 1 for every current file.
    pub e_version: u32,
    pub e_entry: u64,
    /// Program header table offset, 0 if absent.
    pub e_phoff: u64,
    /// Section header table offset, 0 if absent.
    pub e_shoff: u64,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    /// Must be 64 when sections are present.
    pub e_shentsize: u16,
    /// 0 with extended numbering; the count then lives in section 0's `sh_size`.
    pub e_shnum: u16,
    /// `SHN_XINDEX` with extended numbering; the index then lives in section 0's `sh_link`.
    pub e_shstrndx: u16,
}

/// `Elf32_Ehdr`. Field order matches [`Elf64Ehdr`]; addresses and offsets
/// are 32 bits wide, so the header is 52 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf32Ehdr {
    pub e_ident: [u8; 16],
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    /// Widened to `u64` by [`Header::entry_point`].
    pub e_entry: u32,
    pub e_phoff: u32,
    pub e_shoff: u32,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    /// Must be 40 when sections are present.
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl Parse for Elf64Ehdr {
    const SIZE: usize = 64;

    fn parse(r: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Elf64Ehdr {
            e_ident: r.ident()?,
            e_type: r.u16()?,
            e_machine: r.u16()?,
            e_version: r.u32()?,
            e_entry: r.u64()?,
            e_phoff: r.u64()?,
            e_shoff: r.u64()?,
            e_flags: r.u32()?,
            e_ehsize: r.u16()?,
            e_phentsize: r.u16()?,
            e_phnum: r.u16()?,
            e_shentsize: r.u16()?,
            e_shnum: r.u16()?,
            e_shstrndx: r.u16()?,
        })
    }
}

impl Parse for Elf32Ehdr {
    const SIZE: usize = 52;

    fn parse(r: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Elf32Ehdr {
            e_ident: r.ident()?,
            e_type: r.u16()?,
            e_machine: r.u16()?,
            e_version: r.u32()?,
            e_entry: r.u32()?,
            e_phoff: r.u32()?,
            e_shoff: r.u32()?,
            e_flags: r.u32()?,
            e_ehsize: r.u16()?,
            e_phentsize: r.u16()?,
            e_phnum: r.u16()?,
            e_shentsize: r.u16()?,
            e_shnum: r.u16()?,
            e_shstrndx: r.u16()?,
        })
    }
}

impl Header for Elf64Ehdr {
    fn ident(&self) -> &[u8; 16] {
        &self.e_ident
    }

    fn object_type(&self) -> u16 {
        self.e_type
    }

    fn machine(&self) -> u16 {
        self.e_machine
    }

    fn version(&self) -> u32 {
        self.e_version
    }

    fn entry_point(&self) -> u64 {
        self.e_entry
    }

    fn phoff(&self) -> u64 {
        self.e_phoff
    }

    fn phentsize(&self) -> u16 {
        self.e_phentsize
    }

    fn phnum(&self) -> u16 {
        self.e_phnum
    }

    fn shoff(&self) -> u64 {
        self.e_shoff
    }

    fn shentsize(&self) -> u16 {
        self.e_shentsize
    }

    fn shnum(&self) -> u16 {
        self.e_shnum
    }

    fn shstrndx(&self) -> u16 {
        self.e_shstrndx
    }

    fn is_64(&self) -> bool {
        true
    }
}

impl Header for Elf32Ehdr {
    fn ident(&self) -> &[u8; 16] {
        &self.e_ident
    }

    fn object_type(&self) -> u16 {
        self.e_type
    }

    fn machine(&self) -> u16 {
        self.e_machine
    }

    fn version(&self) -> u32 {
        self.e_version
    }

    fn entry_point(&self) -> u64 {
        self.e_entry.into()
    }

    fn phoff(&self) -> u64 {
        self.e_phoff.into()
    }

    fn phentsize(&self) -> u16 {
        self.e_phentsize
    }

    fn phnum(&self) -> u16 {
        self.e_phnum
    }

    fn shoff(&self) -> u64 {
        self.e_shoff.into()
    }

    fn shentsize(&self) -> u16 {
        self.e_shentsize
    }

    fn shnum(&self) -> u16 {
        self.e_shnum
    }

    fn shstrndx(&self) -> u16 {
        self.e_shstrndx
    }

    fn is_64(&self) -> bool {
        false
    }
}
