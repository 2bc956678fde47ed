//! Scratch space for downloads
//!
//! Downloaded archives are staged in a temporary file before extraction. The base directory
//! is always absolute so that a relative `TMPDIR` (e.g. `TMPDIR=tmp`) never stages files
//! under the current working directory.

use std::env;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::error::{Result, fs};

/// Returns an absolute directory suitable for temporary files
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Create an empty temporary file for a download, removed when dropped
pub fn download_file() -> Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix("corral-download-")
        .tempfile_in(temp_dir_base())
        .map_err(|e| fs::write_failed(temp_dir_base().display().to_string(), e.to_string()))
}
