// Reading and writing Intel HEX files on disk

use super::ihex::IntelHex;
use super::metadata::has_hex_extension;
use super::options::HexOptions;
use crate::error::HexError;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HexFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Hex(#[from] HexError),
}

pub type Result<T> = std::result::Result<T, HexFileError>;

/// Load and decode a HEX file
pub fn load_hex(filename: impl AsRef<Path>, options: &HexOptions) -> Result<IntelHex> {
    let path = filename.as_ref();
    if !has_hex_extension(path) {
        tracing::debug!("{} has no conventional HEX extension", path.display());
    }
    let text = fs::read_to_string(path)?;
    Ok(IntelHex::parse(&text, options)?)
}

/// Encode a model and write it to `filename`
pub fn save_hex(filename: impl AsRef<Path>, model: &IntelHex, options: &HexOptions) -> Result<()> {
    let text = model.serialize(options)?;
    fs::write(filename, text)?;
    Ok(())
}
