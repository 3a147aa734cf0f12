use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use shirabe_index::{EXTENSION, FileIndexContainer};

/// Index container commands
#[derive(Debug, Subcommand)]
pub enum IndexAction {
    /// Create an empty container, or check an existing one
    Create { path: PathBuf },

    /// List the records of a container
    List { path: PathBuf },

    /// Append a record holding the contents of a file
    Add {
        path: PathBuf,
        #[arg(allow_negative_numbers = true)]
        index_type: i32,
        data: PathBuf,
    },

    /// Remove a record
    Delete {
        path: PathBuf,
        #[arg(allow_negative_numbers = true)]
        index_type: i32,
    },

    /// Print the payload of a record as hex
    Dump {
        path: PathBuf,
        #[arg(allow_negative_numbers = true)]
        index_type: i32,
    },
}

pub fn run(action: &IndexAction) -> anyhow::Result<()> {
    match action {
        IndexAction::Create { path } => {
            warn_on_extension(path);
            let mut container = open_edit(path)?;
            container.end_editing()?;
            println!(
                "{} ({} records, {:?})",
                path.display(),
                container.index_types().len(),
                container.byte_order()
            );
            container.close();
        }
        IndexAction::List { path } => {
            let mut container = open_access(path)?;
            for index_type in container.index_types() {
                let data = container.get_index_data(index_type)?;
                println!("{index_type}\t{} bytes", data.len());
            }
            container.close();
        }
        IndexAction::Add {
            path,
            index_type,
            data,
        } => {
            let bytes = std::fs::read(data)
                .with_context(|| format!("Failed to read {}", data.display()))?;
            let mut container = open_edit(path)?;
            container
                .create_index(*index_type, &bytes)
                .with_context(|| format!("Failed to add index {index_type}"))?;
            container.end_editing()?;
            container.close();
        }
        IndexAction::Delete { path, index_type } => {
            let mut container = open_edit(path)?;
            container
                .delete_index(*index_type)
                .with_context(|| format!("Failed to delete index {index_type}"))?;
            container.close();
        }
        IndexAction::Dump { path, index_type } => {
            let mut container = open_access(path)?;
            let data = container.get_index_data(*index_type)?;
            let mut stdout = std::io::stdout().lock();
            for line in hex_dump(&data) {
                writeln!(stdout, "{line}")?;
            }
            container.close();
        }
    }
    Ok(())
}

fn open_edit(path: &Path) -> anyhow::Result<FileIndexContainer> {
    FileIndexContainer::edit(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn open_access(path: &Path) -> anyhow::Result<FileIndexContainer> {
    FileIndexContainer::access(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn warn_on_extension(path: &Path) {
    let has_extension = path
        .to_str()
        .is_some_and(|path| path.ends_with(EXTENSION));
    if !has_extension {
        tracing::warn!("{} does not end in {}", path.display(), EXTENSION);
    }
}

/// Offset, hex bytes and printable ASCII, 16 bytes per line
pub fn hex_dump(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let mut line = format!("{:08x} ", row * 16);
            for byte in chunk {
                let _ = write!(line, " {byte:02x}");
            }
            for _ in chunk.len()..16 {
                line.push_str("   ");
            }
            line.push_str("  ");
            line.extend(chunk.iter().map(|&byte| {
                if byte.is_ascii_graphic() || byte == b' ' {
                    byte as char
                } else {
                    '.'
                }
            }));
            line
        })
        .collect()
}
