//! Error type tests
//!
//! Tests for `CorralError` and its conversions.

use super::*;

macro_rules! test_error_contains {
    ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            let err = $err;
            let error_string = err.to_string();
            $(
                assert!(error_string.contains($contains),
                    "Error message should contain '{}', got: {}",
                    $contains,
                    error_string
                );
            )+
        }
    };
}

#[test]
fn test_error_display() {
    let err = CorralError::SourceConflict {
        repository: "owner1/repo1".to_string(),
    };
    assert_eq!(err.to_string(), "Plugin owner1/repo1 is already installed");
}

#[test]
fn test_error_code() {
    let err = archive::illegal_path("../../evil");
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("corral::archive::illegal_path".to_string())
    );
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: CorralError = io_err.into();
    assert!(matches!(err, CorralError::IoError { .. }));
}

#[test]
fn test_yaml_error_conversion() {
    let parse_result: std::result::Result<serde_yaml::Value, _> =
        serde_yaml::from_str("invalid: yaml: content: [unclosed");
    let err: CorralError = parse_result.unwrap_err().into();
    assert!(matches!(err, CorralError::ManifestUnparseable { .. }));
}

#[test]
fn test_manifest_invalid_lists_every_error() {
    let err = manifest::invalid(
        "/plugins/owner@repo",
        vec![
            r#"value "name" is not defined"#.to_string(),
            r#"value in field "version" is not a valid semantic version"#.to_string(),
        ],
    );
    let message = err.to_string();
    assert!(message.contains("/plugins/owner@repo"));
    assert!(message.contains("\t- value \"name\" is not defined"));
    assert!(message.contains("\t- value in field \"version\""));
}

test_error_contains!(
    test_invalid_specifier,
    specifier::invalid("owner/repo@", "missing version after '@'"),
    "Invalid plugin specifier",
    "owner/repo@"
);

test_error_contains!(
    test_release_not_found,
    release::not_found("owner/repo", "1.2.3"),
    "Could not find release 1.2.3 for owner/repo"
);

test_error_contains!(
    test_no_matching_asset,
    release::no_matching_asset("owner/repo", "linux", "amd64"),
    "owner/repo",
    "linux amd64"
);

test_error_contains!(
    test_no_public_key,
    release::no_public_key("plugin_linux_amd64.tar.gz"),
    "no public key"
);

test_error_contains!(
    test_download_failed,
    release::download_failed("owner/repo", 42, "connection reset"),
    "asset with ID 42",
    "connection reset"
);

test_error_contains!(
    test_unsupported_entry,
    archive::unsupported_entry("bin/link", "symlink"),
    "Unsupported entry type",
    "symlink"
);

test_error_contains!(
    test_manifest_missing,
    manifest::missing("/plugins/a@b"),
    "manifest file does not exist"
);

test_error_contains!(
    test_ambiguous_name,
    plugin::ambiguous_name("demo"),
    "multiple plugins with name demo"
);

test_error_contains!(
    test_command_conflict,
    plugin::command_conflict("demo", "plugin"),
    "'plugin' that already exists"
);

test_error_contains!(
    test_plugin_not_found,
    plugin::not_found("owner/missing"),
    "Could not find plugin owner/missing"
);

test_error_contains!(
    test_file_write_failed,
    fs::write_failed("/tmp/x", "disk full"),
    "Failed to write file"
);

test_error_contains!(test_io_error, fs::io_error("some error"), "IO error");
