//! Loading of model files and creation of their GPU resources.
//!
//! - `fbx` turns the binary container into an owned node tree
//! - `import` interprets that tree as a [`import::ModelAsset`]
//! - `animation` holds clips and pose sampling
//! - `mesh` and `material` upload decoded data to the GPU

use std::path::{Path, PathBuf};

use crate::error::{AssetLoadFailure, LoadCause};

pub mod animation;
pub mod fbx;
pub mod import;
pub mod material;
pub mod mesh;

pub async fn load_binary(path: &Path) -> Result<Vec<u8>, LoadCause> {
    tokio::fs::read(path).await.map_err(|source| LoadCause::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses and interprets an in-memory FBX file. CPU-bound.
pub fn decode_asset(name: &str, bytes: &[u8]) -> Result<import::ModelAsset, LoadCause> {
    let document = fbx::parse_document(bytes)?;
    import::import_document(name, &document)
}

/// Reads `path` and decodes it on the blocking pool.
///
/// Must run inside a tokio runtime.
pub async fn read_asset(name: &str, path: PathBuf) -> Result<import::ModelAsset, AssetLoadFailure> {
    let fail = |cause| AssetLoadFailure::new(name, cause);
    let bytes = load_binary(&path).await.map_err(fail)?;
    let owned_name = name.to_string();
    tokio::task::spawn_blocking(move || decode_asset(&owned_name, &bytes))
        .await
        .map_err(|e| fail(LoadCause::Interrupted(e.to_string())))?
        .map_err(fail)
}
