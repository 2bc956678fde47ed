//! List operation
//!
//! Renders all three registry buckets so that users can see why a plugin is not active.

use std::io::Write;

use console::Style;

use crate::error::Result;
use crate::plugin::{Plugin, ValidatedPlugins};

/// Write the registry listing to `out`
pub fn render(registry: &ValidatedPlugins, out: &mut impl Write) -> Result<()> {
    if registry.is_empty() {
        writeln!(out, "No plugins installed.")?;
        return Ok(());
    }

    render_bucket(out, "Installed plugins", None, &registry.valid)?;
    render_bucket(
        out,
        "Plugins with duplicate names",
        Some("not loaded: another plugin has the same name"),
        &registry.duplicate_name,
    )?;
    render_bucket(
        out,
        "Plugins with duplicate commands",
        Some("not loaded: a command is already provided by corral or another plugin"),
        &registry.duplicate_command,
    )?;
    Ok(())
}

fn render_bucket(
    out: &mut impl Write,
    title: &str,
    note: Option<&str>,
    plugins: &[Plugin],
) -> Result<()> {
    if plugins.is_empty() {
        return Ok(());
    }

    writeln!(out, "{} ({}):", title, plugins.len())?;
    if let Some(note) = note {
        writeln!(out, "  {}", Style::new().dim().apply_to(note))?;
    }
    writeln!(out)?;

    for plugin in plugins {
        render_plugin(out, plugin)?;
        writeln!(out)?;
    }
    Ok(())
}

fn render_plugin(out: &mut impl Write, plugin: &Plugin) -> Result<()> {
    let label = Style::new().bold();

    writeln!(
        out,
        "  {} {}",
        Style::new().bold().yellow().apply_to(&plugin.name),
        Style::new().dim().apply_to(format!("v{}", plugin.version))
    )?;
    if !plugin.description.is_empty() {
        writeln!(
            out,
            "    {} {}",
            label.apply_to("Description:"),
            plugin.description
        )?;
    }

    let source = plugin
        .source
        .as_ref()
        .map_or_else(|| "local".to_string(), ToString::to_string);
    writeln!(out, "    {} {}", label.apply_to("Source:"), source)?;

    writeln!(out, "    {}", label.apply_to("Commands:"))?;
    for command in &plugin.commands {
        let aliases = if command.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", command.aliases.join(", "))
        };
        writeln!(
            out,
            "      {}{} {}",
            Style::new().cyan().apply_to(&command.name),
            aliases,
            Style::new().dim().apply_to(&command.description)
        )?;
    }
    Ok(())
}
