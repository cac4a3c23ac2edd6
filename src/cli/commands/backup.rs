use cuotas_domain::Action;

use crate::cli::core::{required_arg, trailing_text, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table_renderer::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "backup",
            "Snapshot the roster file",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new(
            "backups",
            "List roster snapshots, newest first",
            "backups",
            cmd_backups,
        ),
        CommandEntry::new(
            "restore",
            "Replace the roster with a snapshot",
            "restore <backup name>",
            cmd_restore,
        ),
    ]
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ViewRoster)?;
    let note = trailing_text(args, 0);
    let meta = context.storage.backup(note.as_deref())?;
    io::print_success(format!(
        "Roster saved as `{}` ({} bytes).",
        meta.name, meta.size_bytes
    ));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.require(Action::ViewRoster)?;
    let backups = context.storage.list_backups()?;
    output_section("Roster backups");
    if backups.is_empty() {
        io::print_info("No roster backups yet.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Name"),
        TableColumn::left("Created (UTC)"),
        TableColumn::right("Bytes"),
    ]);
    for backup in backups {
        table.push_row(vec![
            backup.name,
            backup
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".into()),
            backup.size_bytes.to_string(),
        ]);
    }
    render_table(&table);
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ManageMembers)?;
    let name = required_arg(args, 0, "backup name")?;
    if !context.confirm(&format!("Replace the roster with `{}`?", name))? {
        io::print_info("Restore cancelled.");
        return Ok(());
    }
    let roster = context.storage.restore(name)?;
    io::print_success(format!(
        "Roster restored from `{}`: {} member(s), {} payment(s).",
        name,
        roster.members.len(),
        roster.payments.len()
    ));
    Ok(())
}
