//! Where the enrichment CSV comes from.
//!
//! The pipeline only ever sees a [`ResolvedInput`]; whether the bytes came from
//! a path on the command line, a terminal prompt or standard input is decided
//! here and nowhere else.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use dialoguer::Input;
use tracing::info;

use crate::models::{FigureError, FigureResult};

/// The raw table bytes plus a human-readable name for log lines.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub label: String,
    pub bytes: Vec<u8>,
}

pub trait InputSource {
    fn resolve(&self) -> FigureResult<ResolvedInput>;
}

/// A CSV file on disk.
pub struct FileSource {
    pub path: PathBuf,
}

impl InputSource for FileSource {
    fn resolve(&self) -> FigureResult<ResolvedInput> {
        read_path(&self.path)
    }
}

/// Ask for the file path on the terminal.
pub struct PromptSource;

impl InputSource for PromptSource {
    fn resolve(&self) -> FigureResult<ResolvedInput> {
        let answer: String = Input::new()
            .with_prompt("Enter CSV file path")
            .interact_text()
            .map_err(|e| FigureError::Prompt(e.to_string()))?;
        read_path(Path::new(answer.trim()))
    }
}

/// CSV piped in on standard input.
pub struct StdinSource;

impl InputSource for StdinSource {
    fn resolve(&self) -> FigureResult<ResolvedInput> {
        let mut bytes = Vec::new();
        io::stdin().lock().read_to_end(&mut bytes)?;
        info!("Read {} bytes from standard input", bytes.len());
        Ok(ResolvedInput {
            label: "<stdin>".to_string(),
            bytes,
        })
    }
}

/// Bytes already in memory.
#[cfg(test)]
pub struct MemorySource {
    pub label: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
impl InputSource for MemorySource {
    fn resolve(&self) -> FigureResult<ResolvedInput> {
        Ok(ResolvedInput {
            label: self.label.clone(),
            bytes: self.bytes.clone(),
        })
    }
}

/// Pick the source for a command-line argument: a path, `-` for stdin, or a prompt when absent.
pub fn source_from_arg(arg: Option<&Path>) -> Box<dyn InputSource> {
    match arg {
        Some(path) if path.as_os_str() == "-" => Box::new(StdinSource),
        Some(path) => Box::new(FileSource {
            path: path.to_path_buf(),
        }),
        None => Box::new(PromptSource),
    }
}

fn read_path(path: &Path) -> FigureResult<ResolvedInput> {
    if !path.is_file() {
        return Err(FigureError::MissingFile(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    info!("File loaded: {}", path.display());
    Ok(ResolvedInput {
        label: path.display().to_string(),
        bytes,
    })
}
