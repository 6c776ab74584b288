use std::ops::Range;

/// Location of a string table: the owning section index and its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTableRef {
    pub section_index: usize,
    pub range: Range<usize>,
}

/// A string table borrowed from the mapping.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    section_index: usize,
    data: &'a [u8],
}

impl<'a> StringTable<'a> {
    pub(crate) fn new(section_index: usize, data: &'a [u8]) -> Self {
        Self {
            section_index,
            data,
        }
    }

    /// Index of the section holding this table.
    pub fn section_index(&self) -> usize {
        self.section_index
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the NUL-terminated string starting at `offset`.
    ///
    /// A missing terminator ends the name at the end of the table. `None` when
    /// the offset is outside the table or the bytes are not UTF-8.
    pub fn get(&self, offset: u32) -> Option<&'a str> {
        let start = offset as usize;
        let tail = self.data.get(start..)?;
        if tail.is_empty() {
            return None;
        }
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        std::str::from_utf8(&tail[..end]).ok()
    }
}
