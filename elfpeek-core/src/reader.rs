use crate::error::{ElfError, Result};
use byteorder::{ReadBytesExt, BE, LE};
use goblin::elf::header::{ELFDATA2LSB, ELFDATA2MSB};
use std::io::{Cursor, Read};
use std::ops::Range;

/// Byte order of the multi-byte fields in an ELF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Picks the byte order from the `EI_DATA` byte. Anything other than
    /// LSB/MSB falls back to the host order.
    pub fn from_ident(data: u8) -> Self {
        match data {
            ELFDATA2LSB => Endian::Little,
            ELFDATA2MSB => Endian::Big,
            other => {
                log::warn!("unknown data encoding {other:#x}, reading fields in host byte order");
                Endian::native()
            }
        }
    }

    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

/// Sequential, endian-aware reader over a borrowed byte slice.
pub(crate) struct FieldReader<'a> {
    cur: Cursor<&'a [u8]>,
    endian: Endian,
}

impl<'a> FieldReader<'a> {
    pub fn new(bytes: &'a [u8], endian: Endian) -> Self {
        Self {
            cur: Cursor::new(bytes),
            endian,
        }
    }

    pub fn ident(&mut self) -> Result<[u8; 16]> {
        let mut ident = [0u8; 16];
        self.cur.read_exact(&mut ident).map_err(truncated)?;
        Ok(ident)
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.cur.read_u8().map_err(truncated)
    }

    pub fn u16(&mut self) -> Result<u16> {
        match self.endian {
            Endian::Little => self.cur.read_u16::<LE>(),
            Endian::Big => self.cur.read_u16::<BE>(),
        }
        .map_err(truncated)
    }

    pub fn u32(&mut self) -> Result<u32> {
        match self.endian {
            Endian::Little => self.cur.read_u32::<LE>(),
            Endian::Big => self.cur.read_u32::<BE>(),
        }
        .map_err(truncated)
    }

    pub fn u64(&mut self) -> Result<u64> {
        match self.endian {
            Endian::Little => self.cur.read_u64::<LE>(),
            Endian::Big => self.cur.read_u64::<BE>(),
        }
        .map_err(truncated)
    }
}

fn truncated(err: std::io::Error) -> ElfError {
    ElfError::malformed(format!("truncated structure: {err}"))
}

/// A fixed-size on-disk ELF structure.
pub(crate) trait Parse: Sized {
    /// Size of the structure in the file.
    const SIZE: usize;

    fn parse(r: &mut FieldReader<'_>) -> Result<Self>;

    /// Reads one structure starting at `offset`.
    fn parse_at(data: &[u8], offset: usize, endian: Endian) -> Result<Self> {
        let bytes = data
            .get(offset..)
            .ok_or_else(|| ElfError::malformed(format!("offset {offset:#x} past end of file")))?;
        Self::parse(&mut FieldReader::new(bytes, endian))
    }
}

/// Validates that `offset .. offset + size` lies inside a buffer of `len`
/// bytes and returns it as a slice range.
pub(crate) fn checked_range(offset: u64, size: u64, len: usize, what: &str) -> Result<Range<usize>> {
    let end = offset
        .checked_add(size)
        .ok_or_else(|| ElfError::malformed(format!("{what}: offset {offset:#x} + size {size:#x} overflows")))?;

    if end > len as u64 {
        return Err(ElfError::malformed(format!(
            "{what}: range {offset:#x}..{end:#x} exceeds file length {len:#x}"
        )));
    }

    // Both bounds are <= len, so they fit in usize.
    Ok(offset as usize..end as usize)
}
