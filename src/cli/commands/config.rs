use cuotas_config::Config;

use crate::cli::core::{required_arg, trailing_text, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table_renderer::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change preferences and manage their backups",
        "config [show | set <key> <value> | backup [note] | backups | restore <name>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|value| value.to_lowercase()).as_deref() {
        None | Some("show") => show(context),
        Some("set") => set(context, &args[1..]),
        Some("backup") => backup(context, &args[1..]),
        Some("backups") => list_backups(context),
        Some("restore") => restore(context, &args[1..]),
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}`",
            other
        ))),
    }
}

fn show(context: &ShellContext) -> CommandResult {
    output_section("Configuration");
    let mut table = Table::new(vec![TableColumn::left("Key"), TableColumn::left("Value")]);
    for (key, value) in context.config.entries() {
        table.push_row(vec![key.to_string(), value]);
    }
    render_table(&table);
    io::print_info(format!(
        "Stored at {}",
        context.config_manager.config_path().display()
    ));
    Ok(())
}

fn set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = required_arg(args, 0, "configuration key")?;
    if !Config::KEYS.contains(&key) {
        return Err(CommandError::InvalidArguments(format!(
            "unknown key `{}` (expected one of: {})",
            key,
            Config::KEYS.join(", ")
        )));
    }
    let value = trailing_text(args, 1).unwrap_or_default();
    let mut updated = context.config.clone();
    updated.set(key, &value)?;
    context.apply_config(updated)?;
    let shown = context
        .config
        .entries()
        .into_iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value)
        .unwrap_or(value);
    io::print_success(format!("`{}` set to {}.", key, shown));
    Ok(())
}

fn backup(context: &ShellContext, args: &[&str]) -> CommandResult {
    let note = trailing_text(args, 0);
    let name = context
        .config_manager
        .backup(&context.config, note.as_deref())?;
    io::print_success(format!("Configuration saved as `{}`.", name));
    Ok(())
}

fn list_backups(context: &ShellContext) -> CommandResult {
    let names = context.config_manager.list_backups()?;
    output_section("Configuration backups");
    if names.is_empty() {
        io::print_info("No configuration backups yet.");
        return Ok(());
    }
    for name in names {
        io::print_info(format!("  {}", name));
    }
    Ok(())
}

fn restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = required_arg(args, 0, "backup name")?;
    let restored = context.config_manager.restore(name)?;
    if !context.confirm(&format!("Replace the current configuration with `{}`?", name))? {
        io::print_info("Restore cancelled.");
        return Ok(());
    }
    context.apply_config(restored)?;
    io::print_success(format!("Configuration restored from `{}`.", name));
    Ok(())
}
