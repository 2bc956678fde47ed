//! Common test utilities for corral integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Release host address that refuses connections
pub const UNREACHABLE_API_URL: &str = "http://127.0.0.1:9";

/// A temporary plugin directory
#[allow(dead_code)]
pub struct TestPlugins {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the plugin directory
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestPlugins {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("plugins");
        std::fs::create_dir_all(&path).expect("Failed to create plugin directory");
        Self { temp, path }
    }

    /// Write a plugin whose binary prints its arguments
    pub fn add_plugin(&self, directory: &str, name: &str, commands: &[&str]) -> PathBuf {
        self.add_plugin_with(directory, name, "1.0.0", commands, "echo \"$0 $@\"")
    }

    /// Write a plugin with a specific version and shell script body
    pub fn add_plugin_with(
        &self,
        directory: &str,
        name: &str,
        version: &str,
        commands: &[&str],
        script: &str,
    ) -> PathBuf {
        write_plugin(&self.path.join(directory), name, version, commands, script)
    }

    /// Write a file in the plugin directory
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Check if a plugin directory exists
    pub fn plugin_exists(&self, directory: &str) -> bool {
        self.path.join(directory).exists()
    }

    /// A corral command using this plugin directory and no network
    #[allow(deprecated)]
    pub fn corral_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("corral").unwrap();
        cmd.env("CORRAL_PLUGIN_DIR", &self.path);
        cmd.env("CORRAL_GITHUB_API_URL", UNREACHABLE_API_URL);
        cmd.env_remove("CORRAL_EXTRA_PLUGIN_DIRECTORY");
        cmd.env_remove("CORRAL_LOG");
        cmd.env_remove("CORRAL_GITHUB_TOKEN");
        cmd.env_remove("GITHUB_TOKEN");
        cmd
    }
}

impl Default for TestPlugins {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a plugin directory with a manifest and a shell script binary
#[allow(dead_code)]
pub fn write_plugin(
    dir: &Path,
    name: &str,
    version: &str,
    commands: &[&str],
    script: &str,
) -> PathBuf {
    std::fs::create_dir_all(dir).expect("Failed to create plugin directory");

    let mut manifest = format!(
        "name: {name}\ndescription: {name} plugin\nbinary: {name}\nversion: {version}\ncommands:\n"
    );
    for command in commands {
        manifest.push_str(&format!("  {command}:\n    description: runs {command}\n"));
    }
    std::fs::write(dir.join("manifest.yml"), manifest).expect("Failed to write manifest");
    std::fs::write(dir.join(name), format!("#!/bin/sh\n{script}\n"))
        .expect("Failed to write plugin binary");
    dir.to_path_buf()
}
