//! The fixed asset list and name → file resolution.

use std::path::{Path, PathBuf};

/// Assets shipped with the viewer, in menu order.
pub const ASSETS: [&str; 7] = [
    "Offensive Idle",
    "Reaction",
    "Roundhouse Kick",
    "Walking",
    "Dancing Twerk",
    "Fast Run",
    "Punching Bag",
];

/// Directory of the model files, relative to the asset root.
pub const MODEL_DIR: &str = "models/fbx";

pub fn is_listed(name: &str) -> bool {
    ASSETS.contains(&name)
}

/// `<root>/models/fbx/<name>.fbx`. The name is not checked against [`ASSETS`];
/// a name without a file fails when it is read.
pub fn resolve(root: &Path, name: &str) -> PathBuf {
    root.join(MODEL_DIR).join(format!("{name}.fbx"))
}
