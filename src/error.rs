//! Error types for asset loading.
//!
//! Engine setup propagates `anyhow::Error`. Asset loads report the one error
//! kind users ever see, [`AssetLoadFailure`], which names the asset and wraps
//! the underlying [`LoadCause`].

use std::path::PathBuf;

/// Why a single asset could not be turned into a model.
#[derive(Debug, thiserror::Error)]
pub enum LoadCause {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a readable FBX file: {0}")]
    Parse(String),

    #[error("unsupported FBX version (only binary 7.x is supported)")]
    UnsupportedVersion,

    #[error("malformed FBX content: {0}")]
    Malformed(String),

    #[error("decoder task did not finish: {0}")]
    Interrupted(String),
}

/// A failed load request. Logged, never raised to the caller of `load_asset`.
#[derive(Debug, thiserror::Error)]
#[error("Error loading asset: {asset}: {cause}")]
pub struct AssetLoadFailure {
    pub asset: String,
    #[source]
    pub cause: LoadCause,
}

impl AssetLoadFailure {
    pub fn new(asset: impl Into<String>, cause: LoadCause) -> Self {
        Self {
            asset: asset.into(),
            cause,
        }
    }
}
