use thiserror::Error;

use crate::format::FourCC;

pub type Result<T, E = J3dError> = std::result::Result<T, E>;

/// Decode failure. There is no partial model: any error aborts the whole
/// decode of the buffer.
#[derive(Debug, Error)]
pub enum J3dError {
    /// A read or seek left the buffer or the current section's declared extent.
    #[error("{section}: read at {offset:#x} runs past {limit:#x}")]
    OutOfBounds { section: FourCC, offset: u64, limit: u64 },
    /// A sentinel, enumeration or structural check failed.
    #[error("{section}: {message} (at {offset:#x})")]
    FormatInvariant { section: FourCC, offset: u64, message: String },
    #[error("required section {0} not found")]
    MissingSection(FourCC),
}

impl J3dError {
    /// Tag of the section being decoded when the error was raised.
    pub fn section(&self) -> FourCC {
        match self {
            J3dError::OutOfBounds { section, .. } => *section,
            J3dError::FormatInvariant { section, .. } => *section,
            J3dError::MissingSection(section) => *section,
        }
    }

    pub fn offset(&self) -> Option<u64> {
        match self {
            J3dError::OutOfBounds { offset, .. } => Some(*offset),
            J3dError::FormatInvariant { offset, .. } => Some(*offset),
            J3dError::MissingSection(_) => None,
        }
    }
}
