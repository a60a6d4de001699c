//! Harness error types

use std::path::PathBuf;

use cl_core::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: png::DecodingError,
    },

    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },

    #[error("Unsupported image layout in {}: {detail}", path.display())]
    UnsupportedImage { path: PathBuf, detail: String },
}

pub type Result<T> = std::result::Result<T, HarnessError>;
