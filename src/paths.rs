//! Purpose: Shared data-directory and store-file path resolution helpers.
//! Exports: `default_data_dir`, `resolve_data_dir`, `store_file`.
//! Role: Keep CLI and server path semantics aligned from one source.
//! Invariants: Default data directory remains `~/.swatchbook`; the store file
//! Invariants: within a data directory is always `palettes.jsonl`.

use std::path::{Path, PathBuf};

pub const STORE_FILE_NAME: &str = "palettes.jsonl";

pub fn default_data_dir() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(".swatchbook")
}

/// Precedence: explicit flag, then `SWATCHBOOK_DIR`, then the home default.
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os("SWATCHBOOK_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    default_data_dir()
}

pub fn store_file(data_dir: &Path) -> PathBuf {
    data_dir.join(STORE_FILE_NAME)
}
