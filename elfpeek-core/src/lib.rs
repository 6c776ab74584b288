pub mod binary;
pub mod error;
pub mod header;
mod reader;
pub mod resolve;
pub mod sections;
pub mod strtab;
pub mod symbols;

pub use binary::*;
pub use error::{ElfError, ErrorCategory, Result};
pub use header::{class_name, data_name, type_name, ElfClass, Header};
pub use reader::Endian;
pub use sections::{Section, Sections};
pub use strtab::StringTable;
pub use symbols::{Symbol, SymbolTable, Symbols};
