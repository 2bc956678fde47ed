//! Plugin lifecycle operations
//!
//! - [`install`]: resolve, download, verify, extract and load a plugin
//! - [`list`]: render installed plugins by registry bucket
//! - [`uninstall`]: remove an installed plugin
//! - [`update`]: argument handling for updates, which are not supported yet

pub mod install;
pub mod list;
pub mod uninstall;
pub mod update;

pub use install::{InstallOperation, InstallOptions, InstallOutcome, ReleaseSelector};
