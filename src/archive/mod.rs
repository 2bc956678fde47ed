//! Archive extraction
//!
//! Plugin archives come from untrusted releases. The format is detected from the content,
//! every entry name is cleaned and confined to the destination, only directories and regular
//! files are materialized, and file data is copied in bounded chunks. A failed extraction
//! removes the destination directory.

pub mod path;

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use tar::EntryType;
use tracing::{debug, warn};

use crate::error::{Result, archive, fs as fs_error};

pub use path::clean_entry_path;

const COPY_CHUNK_SIZE: usize = 32 * 1024;

/// Largest file an archive entry may expand to
pub const MAX_ENTRY_SIZE: u64 = 500 * 1024 * 1024;

const SNIFF_LEN: u64 = 262;
const TAR_MAGIC_OFFSET: usize = 257;

/// Archive formats that can be extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Detect the format from the first bytes of an archive
    pub fn detect(head: &[u8]) -> Result<Self> {
        match head {
            [0x1f, 0x8b, ..] => Ok(Self::TarGz),
            [b'P', b'K', 0x03, 0x04, ..] | [b'P', b'K', 0x05, 0x06, ..] => Ok(Self::Zip),
            _ if head.get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5) == Some(&b"ustar"[..]) => {
                Ok(Self::Tar)
            }
            [b'B', b'Z', b'h', ..] => Err(archive::unsupported_format("bzip2 is not supported")),
            [0xfd, b'7', b'z', b'X', b'Z', 0x00, ..] => {
                Err(archive::unsupported_format("xz is not supported"))
            }
            [b'7', b'z', 0xbc, 0xaf, 0x27, 0x1c, ..] => {
                Err(archive::unsupported_format("7z is not supported"))
            }
            _ => Err(archive::unsupported_format(
                "content is not a tar, tar.gz or zip archive",
            )),
        }
    }
}

/// Extracts archives with a per-entry size limit
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    max_entry_size: u64,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            max_entry_size: MAX_ENTRY_SIZE,
        }
    }
}

impl Extractor {
    #[cfg(test)]
    pub fn with_max_entry_size(max_entry_size: u64) -> Self {
        Self { max_entry_size }
    }

    /// Extract `archive_path` into `dest`
    ///
    /// `dest` is created if needed and removed entirely if extraction fails.
    pub fn extract(&self, archive_path: &Path, dest: &Path) -> Result<()> {
        let result = self.extract_inner(archive_path, dest);
        if let Err(e) = &result {
            debug!("Extraction into {} failed: {e}", dest.display());
            if dest.exists() {
                if let Err(cleanup) = fs::remove_dir_all(dest) {
                    warn!(
                        "Failed to remove partially extracted directory {}: {cleanup}",
                        dest.display()
                    );
                }
            }
        }
        result
    }

    fn extract_inner(&self, archive_path: &Path, dest: &Path) -> Result<()> {
        let format = sniff(archive_path)?;
        debug!(
            "Extracting {} as {format:?} into {}",
            archive_path.display(),
            dest.display()
        );

        fs::create_dir_all(dest)
            .map_err(|e| fs_error::write_failed(dest.display().to_string(), e.to_string()))?;

        let file = open(archive_path)?;
        match format {
            ArchiveFormat::TarGz => self.extract_tar(GzDecoder::new(file), dest),
            ArchiveFormat::Tar => self.extract_tar(file, dest),
            ArchiveFormat::Zip => self.extract_zip(file, dest),
        }
    }

    fn extract_tar<R: Read>(&self, reader: R, dest: &Path) -> Result<()> {
        let mut tar = tar::Archive::new(reader);
        let entries = tar
            .entries()
            .map_err(|e| archive::read_failed(e.to_string()))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| archive::read_failed(e.to_string()))?;
            let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let entry_type = entry.header().entry_type();

            if matches!(entry_type, EntryType::XGlobalHeader | EntryType::XHeader) {
                continue;
            }

            let Some(relative) = clean_entry_path(&name)? else {
                continue;
            };
            let target = dest.join(&relative);

            match entry_type {
                EntryType::Directory => create_dir(&target)?,
                EntryType::Regular | EntryType::Continuous => {
                    let mode = entry.header().mode().ok();
                    self.write_file(&mut entry, &target, &name, mode)?;
                }
                other => {
                    return Err(archive::unsupported_entry(name, tar_entry_kind(other)));
                }
            }
        }
        Ok(())
    }

    fn extract_zip(&self, file: File, dest: &Path) -> Result<()> {
        let mut zip = zip::ZipArchive::new(file)?;

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;
            let name = entry.name().to_string();

            let Some(relative) = clean_entry_path(&name)? else {
                continue;
            };
            let target = dest.join(&relative);
            let mode = entry.unix_mode();

            if entry.is_dir() {
                create_dir(&target)?;
            } else if mode.is_some_and(|m| m & 0o170_000 == 0o120_000) {
                return Err(archive::unsupported_entry(name, "symlink"));
            } else if mode.is_some_and(|m| m & 0o170_000 != 0 && m & 0o170_000 != 0o100_000) {
                return Err(archive::unsupported_entry(name, "special file"));
            } else {
                self.write_file(&mut entry, &target, &name, mode)?;
            }
        }
        Ok(())
    }

    fn write_file(
        &self,
        reader: &mut impl Read,
        target: &Path,
        name: &str,
        mode: Option<u32>,
    ) -> Result<()> {
        if let Some(parent) = target.parent() {
            create_dir(parent)?;
        }
        let mut out = File::create(target)
            .map_err(|e| fs_error::write_failed(target.display().to_string(), e.to_string()))?;
        copy_bounded(reader, &mut out, name, self.max_entry_size)?;
        set_mode(target, mode)
    }
}

/// Extract with the default entry size limit
pub fn extract(archive_path: &Path, dest: &Path) -> Result<()> {
    Extractor::default().extract(archive_path, dest)
}

/// Detect the format of the archive at `path`
pub fn sniff(path: &Path) -> Result<ArchiveFormat> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    open(path)?
        .take(SNIFF_LEN)
        .read_to_end(&mut head)
        .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;
    ArchiveFormat::detect(&head)
}

/// Copy `reader` into `writer` one chunk at a time, failing once `limit` bytes are exceeded
pub fn copy_bounded(
    reader: &mut impl Read,
    writer: &mut impl Write,
    name: &str,
    limit: u64,
) -> Result<u64> {
    let mut buf = vec![0u8; COPY_CHUNK_SIZE];
    let mut written: u64 = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(archive::read_failed(format!("{name}: {e}"))),
        };
        written += n as u64;
        if written > limit {
            return Err(archive::entry_too_large(name, limit));
        }
        writer.write_all(&buf[..n])?;
    }
    writer.flush()?;
    Ok(written)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| fs_error::write_failed(path.display().to_string(), e.to_string()))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode.map(|m| m & 0o777).filter(|m| *m != 0) {
        fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o600))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

fn tar_entry_kind(entry_type: EntryType) -> String {
    match entry_type {
        EntryType::Symlink => "symlink".to_string(),
        EntryType::Link => "hard link".to_string(),
        EntryType::Char => "character device".to_string(),
        EntryType::Block => "block device".to_string(),
        EntryType::Fifo => "fifo".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}
