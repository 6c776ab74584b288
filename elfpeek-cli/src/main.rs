use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use elfpeek_core::{ElfFile, Section, Symbol};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Read-only ELF introspection CLI
#[derive(Parser)]
#[command(
    name = "elfpeek",
    about = "Inspect ELF objects (header, sections and symbols)",
    version,
    author
)]
struct Cli {
    /// Path to the ELF file
    #[arg(required = true)]
    path: std::path::PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show class, data encoding, version and object type
    Header,
    /// List all sections
    Sections,
    /// List the symbol table
    Symbols,
}

#[derive(Serialize)]
struct HeaderInfo {
    class: &'static str,
    data: &'static str,
    version: u32,
    #[serde(rename = "type")]
    object_type: &'static str,
}

#[derive(Serialize, Tabled)]
struct SectionRow {
    #[tabled(rename = "Nr")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Flags")]
    flags: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "EntSize")]
    entsize: String,
}

#[derive(Serialize, Tabled)]
struct SymbolRow {
    #[tabled(rename = "Num")]
    index: usize,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Size")]
    size: u64,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Bind")]
    binding: &'static str,
    #[tabled(rename = "Ndx")]
    shndx: u16,
    #[tabled(rename = "Name")]
    name: String,
}

fn hex(value: u64) -> String {
    format!("{value:#x}")
}

fn section_row(elf: &ElfFile, s: &Section) -> SectionRow {
    SectionRow {
        index: s.index,
        name: elf.section_name(s).unwrap_or("<invalid_name>").to_string(),
        kind: s.type_name(),
        flags: hex(s.flags),
        offset: hex(s.file_offset),
        size: hex(s.size),
        entsize: hex(s.entsize),
    }
}

fn symbol_row(elf: &ElfFile, sym: &Symbol) -> SymbolRow {
    SymbolRow {
        index: sym.index,
        value: hex(sym.value),
        size: sym.size,
        kind: sym.kind_name(),
        binding: sym.binding_name(),
        shndx: sym.shndx,
        name: elf.symbol_name(sym).unwrap_or("<invalid_name>").to_string(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let elf = ElfFile::open(&cli.path)
        .with_context(|| format!("failed to open {}", cli.path.display()))?;
    log::debug!(
        "{}: {} bytes mapped, {} sections",
        cli.path.display(),
        elf.len(),
        elf.section_count()
    );

    match cli.command {
        Command::Header => {
            let info = HeaderInfo {
                class: elf.class(),
                data: elf.data(),
                version: elf.version(),
                object_type: elf.object_type(),
            };
            if cli.json {
                print_json(&info)?;
            } else {
                println!("{:<9}{}", "Class:".bold(), info.class);
                println!("{:<9}{}", "Data:".bold(), info.data);
                println!("{:<9}{}", "Version:".bold(), info.version);
                println!("{:<9}{}", "Type:".bold(), info.object_type);
            }
        }

        Command::Sections => {
            let rows: Vec<SectionRow> = elf.sections().map(|s| section_row(&elf, &s)).collect();
            if cli.json {
                print_json(&rows)?;
            } else if rows.is_empty() {
                println!("No sections found (section header table missing).");
            } else {
                println!("{}", Table::new(rows).with(Style::psql()));
            }
        }

        Command::Symbols => match elf.symbol_table() {
            None if cli.json => print_json(&Vec::<SymbolRow>::new())?,
            None => println!("{}", "No symbol table (stripped binary).".yellow()),
            Some(table) => {
                let rows: Vec<SymbolRow> =
                    table.iter().map(|sym| symbol_row(&elf, &sym)).collect();
                if cli.json {
                    print_json(&rows)?;
                } else {
                    println!("Symbol table contains {} entries:", table.len());
                    println!("{}", Table::new(rows).with(Style::psql()));
                }
            }
        },
    }

    log::debug!("done with {}", elf.path().display());
    elf.close();
    Ok(())
}
