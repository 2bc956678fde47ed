//! Release archive signature verification

use std::fs::File;
use std::io::Read;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ed25519_dalek::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, Signature, VerifyingKey};
use sha2::{Digest, Sha256, Sha512};
use tracing::debug;

use crate::error::{Result, fs as fs_error, release};

/// Verifies a downloaded archive against its signature and public key
pub trait SignatureVerifier {
    fn verify(
        &self,
        archive: &Path,
        archive_name: &str,
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<()>;
}

/// Ed25519ph (SHA-512 pre-hashed) detached signatures
///
/// The public key asset holds the 32-byte key, raw or base64. The signature asset holds the
/// 64-byte signature, raw or as a base64 line, and may also carry `sha256sum` lines. A
/// checksum listed for the archive must match as well.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        archive: &Path,
        archive_name: &str,
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<()> {
        if public_key.iter().all(u8::is_ascii_whitespace) {
            return Err(release::no_public_key(archive_name));
        }
        let key = parse_public_key(public_key).ok_or_else(|| {
            release::signature_mismatch(archive_name, "public key is not an Ed25519 key")
        })?;
        let detached = DetachedSignature::parse(signature, archive_name).ok_or_else(|| {
            release::signature_mismatch(archive_name, "signature does not contain an Ed25519 signature")
        })?;

        let (sha256, prehash) = digest_file(archive)?;

        if let Some(expected) = &detached.checksum {
            debug!("Archive digest {sha256}, expected {expected}");
            if !sha256.eq_ignore_ascii_case(expected) {
                return Err(release::signature_mismatch(
                    archive_name,
                    format!("expected digest {expected}, got {sha256}"),
                ));
            }
        }

        key.verify_prehashed(prehash, None, &detached.signature)
            .map_err(|e| release::signature_mismatch(archive_name, e.to_string()))
    }
}

struct DetachedSignature {
    signature: Signature,
    checksum: Option<String>,
}

impl DetachedSignature {
    fn parse(content: &[u8], archive_name: &str) -> Option<Self> {
        let text = std::str::from_utf8(content).ok();
        let from_text = text.and_then(|text| {
            text.lines()
                .find_map(decode_base64::<SIGNATURE_LENGTH>)
                .map(|bytes| Self {
                    signature: Signature::from_bytes(&bytes),
                    checksum: expected_digest(text, archive_name),
                })
        });
        from_text.or_else(|| {
            let raw = <[u8; SIGNATURE_LENGTH]>::try_from(content).ok()?;
            Some(Self {
                signature: Signature::from_bytes(&raw),
                checksum: None,
            })
        })
    }
}

fn parse_public_key(content: &[u8]) -> Option<VerifyingKey> {
    let bytes = <[u8; PUBLIC_KEY_LENGTH]>::try_from(content).ok().or_else(|| {
        std::str::from_utf8(content)
            .ok()?
            .lines()
            .find_map(decode_base64::<PUBLIC_KEY_LENGTH>)
    })?;
    VerifyingKey::from_bytes(&bytes).ok()
}

fn decode_base64<const N: usize>(line: &str) -> Option<[u8; N]> {
    let decoded = BASE64.decode(line.trim()).ok()?;
    <[u8; N]>::try_from(decoded.as_slice()).ok()
}

/// Digest for `archive_name` in `sha256sum` output, or the first bare digest
fn expected_digest(signature: &str, archive_name: &str) -> Option<String> {
    let mut bare = None;
    for line in signature.lines() {
        let mut parts = line.split_whitespace();
        let Some(digest) = parts.next().filter(|d| is_sha256_hex(d)) else {
            continue;
        };
        match parts.next().map(|name| name.trim_start_matches('*')) {
            Some(name) if name == archive_name => return Some(digest.to_string()),
            Some(_) => {}
            None => {
                bare.get_or_insert_with(|| digest.to_string());
            }
        }
    }
    bare
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Hex SHA-256 of the file and its SHA-512 state for Ed25519ph, in one pass
fn digest_file(path: &Path) -> Result<(String, Sha512)> {
    let read_failed =
        |e: std::io::Error| fs_error::read_failed(path.display().to_string(), e.to_string());
    let mut file = File::open(path).map_err(read_failed)?;
    let mut sha256 = Sha256::new();
    let mut sha512 = Sha512::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(read_failed)?;
        if n == 0 {
            break;
        }
        sha256.update(&buf[..n]);
        sha512.update(&buf[..n]);
    }
    Ok((format!("{:x}", sha256.finalize()), sha512))
}
