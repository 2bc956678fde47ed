//! Release lookup, asset selection and download errors

use super::CorralError;

/// Creates a release not found error
pub fn not_found(repository: impl Into<String>, release: impl Into<String>) -> CorralError {
    CorralError::ReleaseNotFound {
        repository: repository.into(),
        release: release.into(),
    }
}

/// Creates a no matching asset error for an OS/architecture pair
pub fn no_matching_asset(
    repository: impl Into<String>,
    os: impl Into<String>,
    arch: impl Into<String>,
) -> CorralError {
    CorralError::NoMatchingAsset {
        repository: repository.into(),
        os: os.into(),
        arch: arch.into(),
    }
}

/// Creates a missing public key error
pub fn no_public_key(asset: impl Into<String>) -> CorralError {
    CorralError::NoPublicKey {
        asset: asset.into(),
    }
}

/// Creates a signature mismatch error
pub fn signature_mismatch(asset: impl Into<String>, reason: impl Into<String>) -> CorralError {
    CorralError::SignatureMismatch {
        asset: asset.into(),
        reason: reason.into(),
    }
}

/// Creates a download failed error
pub fn download_failed(
    repository: impl Into<String>,
    asset_id: u64,
    reason: impl Into<String>,
) -> CorralError {
    CorralError::DownloadFailed {
        repository: repository.into(),
        asset_id,
        reason: reason.into(),
    }
}
