//! Release asset selection
//!
//! Picks the archive for a platform out of a release's assets, plus the optional signature
//! and public key published next to it.

pub mod platform;

use tracing::debug;

use crate::error::{Result, release};
use crate::release::Asset;

pub use platform::Platform;

const SIGNATURE_EXTENSIONS: &[&str] = &[".sig", ".asc", ".sha256"];
const PUBLIC_KEY_EXTENSIONS: &[&str] = &[".pub", ".pem", ".key", ".asc"];
const SIGNATURE_CONTENT_TYPE: &str = "application/pgp-signature";
const PUBLIC_KEY_CONTENT_TYPE: &str = "application/pgp-keys";

/// Assets chosen for installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub asset_id: u64,
    pub name: String,
    pub signature_asset_id: Option<u64>,
    pub public_key_asset_id: Option<u64>,
}

/// Archive priority for a content type, lower wins
///
/// `application/octet-stream` is what many release pipelines upload everything as, so it falls
/// back to the file extension.
fn archive_priority(asset: &Asset) -> Option<u8> {
    match asset.content_type.as_str() {
        "application/gzip" | "application/x-gzip" | "application/x-gtar"
        | "application/x-compressed-tar" | "application/tar+gzip" => Some(0),
        "application/x-tar" => Some(1),
        "application/zip" | "application/x-zip-compressed" => Some(2),
        "application/octet-stream" | "" => priority_from_extension(&asset.name),
        _ => None,
    }
}

fn priority_from_extension(name: &str) -> Option<u8> {
    let name = name.to_ascii_lowercase();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Some(0)
    } else if name.ends_with(".tar") {
        Some(1)
    } else if name.ends_with(".zip") {
        Some(2)
    } else {
        None
    }
}

/// Select the archive for `platform` and its signature and public key
///
/// Among matching archives gzip-compressed tar wins over plain tar, which wins over zip.
/// Equal priorities keep release order.
pub fn select_for_platform(
    repository: &str,
    assets: &[Asset],
    platform: &Platform,
) -> Result<ResolvedAsset> {
    let archive = assets
        .iter()
        .filter(|a| platform.matches_asset_name(&a.name))
        .filter_map(|a| archive_priority(a).map(|p| (p, a)))
        .min_by_key(|(priority, _)| *priority)
        .map(|(_, asset)| asset)
        .ok_or_else(|| {
            release::no_matching_asset(repository, platform.os.clone(), platform.arch.clone())
        })?;

    debug!(
        "Selected asset '{}' ({}) for {platform}",
        archive.name, archive.content_type
    );

    let others: Vec<&Asset> = assets.iter().filter(|a| a.id != archive.id).collect();
    let signature = find_signature(&others, &archive.name);
    let public_key = signature.and_then(|sig| {
        others
            .iter()
            .find(|a| a.id != sig.id && is_public_key(a))
            .copied()
    });

    if let Some(signature) = signature {
        debug!("Found signature asset '{}'", signature.name);
        if public_key.is_none() {
            return Err(release::no_public_key(archive.name.clone()));
        }
    }

    Ok(ResolvedAsset {
        asset_id: archive.id,
        name: archive.name.clone(),
        signature_asset_id: signature.map(|a| a.id),
        public_key_asset_id: public_key.map(|a| a.id),
    })
}

fn find_signature<'a>(others: &[&'a Asset], archive_name: &str) -> Option<&'a Asset> {
    others
        .iter()
        .find(|a| {
            SIGNATURE_EXTENSIONS
                .iter()
                .any(|ext| a.name == format!("{archive_name}{ext}"))
        })
        .or_else(|| {
            others.iter().find(|a| {
                a.content_type == SIGNATURE_CONTENT_TYPE && a.name.starts_with(archive_name)
            })
        })
        .copied()
}

fn is_public_key(asset: &Asset) -> bool {
    asset.content_type == PUBLIC_KEY_CONTENT_TYPE
        || PUBLIC_KEY_EXTENSIONS
            .iter()
            .any(|ext| asset.name.to_ascii_lowercase().ends_with(ext))
}
