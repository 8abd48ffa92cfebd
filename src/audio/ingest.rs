use std::path::Path;

use super::decode::decode_waveform;
use super::signal::Signal;
use super::table::parse_table;
use crate::error::{EqError, Result};

/// Structural encoding of an upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Waveform,
    Table,
}

impl InputKind {
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "wav" => Ok(Self::Waveform),
            "csv" | "txt" => Ok(Self::Table),
            _ => Err(EqError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(extension)
    }
}

/// Normalize raw upload bytes into a [`Signal`].
pub fn ingest(raw: Vec<u8>, kind: InputKind) -> Result<Signal> {
    match kind {
        InputKind::Waveform => decode_waveform(raw, Some("wav")),
        InputKind::Table => {
            let text = String::from_utf8_lossy(&raw);
            parse_table(&text)
        }
    }
}

pub fn ingest_file(path: &Path) -> Result<Signal> {
    let kind = InputKind::from_path(path)?;
    let raw = std::fs::read(path)?;
    log::info!("Ingesting {} as {:?}", path.display(), kind);
    ingest(raw, kind)
}
