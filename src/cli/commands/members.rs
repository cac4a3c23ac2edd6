use cuotas_core::{
    try_parse_calendar_date, DebtFilter, MemberOverview, MemberService, RosterFilter,
    RosterService, StatusFilter,
};
use cuotas_domain::{Action, MemberDraft};

use crate::cli::core::{
    parse_id, required_arg, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::formatting::format_date;
use crate::cli::ui::style::style;
use crate::cli::ui::table_renderer::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "members",
            "List members with their debt status",
            "members [--search <text>] [--status all|active|inactive] [--debt all|debt|clean]",
            cmd_members,
        ),
        CommandEntry::new(
            "add-member",
            "Register a new member",
            "add-member <full name> <start date> [end date]",
            cmd_add_member,
        ),
        CommandEntry::new(
            "deactivate",
            "Record the end date of a membership",
            "deactivate <member id> <end date>",
            cmd_deactivate,
        ),
        CommandEntry::new(
            "reactivate",
            "Clear the end date of a membership",
            "reactivate <member id>",
            cmd_reactivate,
        ),
        CommandEntry::new(
            "remove-member",
            "Delete a member and all their payments",
            "remove-member <member id>",
            cmd_remove_member,
        ),
        CommandEntry::new(
            "status",
            "Show a member's debt summary and payments",
            "status <member id>",
            cmd_status,
        ),
    ]
}

fn cmd_members(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ViewRoster)?;
    let filter = parse_filter(args)?;
    let entries = RosterService::entries(
        &context.storage,
        context.debt_source(),
        context.clock.as_ref(),
    )?;
    let total = entries.len();
    let rows = RosterService::filter(entries, &filter);

    output_section("Members");
    if rows.is_empty() {
        io::print_info(if total == 0 {
            "No members yet. Add one with `add-member`."
        } else {
            "No members match the filters."
        });
        return Ok(());
    }

    let ui = style();
    let mut table = Table::new(vec![
        TableColumn::right("Id"),
        TableColumn::left("Name").max_width(32),
        TableColumn::left("Since"),
        TableColumn::left("Until"),
        TableColumn::left("Status"),
        TableColumn::right("Overdue"),
    ]);
    for entry in &rows {
        table.push_row(vec![
            entry.member.id.to_string(),
            entry.member.full_name.clone(),
            display_date(context, &entry.member.start_date),
            entry
                .member
                .end_date
                .as_deref()
                .filter(|_| !entry.member.is_active())
                .map(|raw| display_date(context, raw))
                .unwrap_or_else(|| "-".into()),
            ui.badge(&entry.status.to_string(), entry.status.is_debt()),
            entry.overdue_month_count.to_string(),
        ]);
    }
    render_table(&table);
    io::print_info(format!("{} of {} members shown.", rows.len(), total));
    Ok(())
}

fn parse_filter(args: &[&str]) -> Result<RosterFilter, CommandError> {
    let mut filter = RosterFilter::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .copied()
                .ok_or_else(|| CommandError::InvalidArguments(format!("{} needs a value", name)))
        };
        match *flag {
            "--search" | "-s" => filter.search = Some(value("--search")?.to_string()),
            "--status" => {
                let raw = value("--status")?;
                filter.status = StatusFilter::from_str(raw).ok_or_else(|| {
                    CommandError::InvalidArguments(format!("unknown status filter `{}`", raw))
                })?;
            }
            "--debt" => {
                let raw = value("--debt")?;
                filter.debt = DebtFilter::from_str(raw).ok_or_else(|| {
                    CommandError::InvalidArguments(format!("unknown debt filter `{}`", raw))
                })?;
            }
            other if !other.starts_with('-') && filter.search.is_none() => {
                filter.search = Some(other.to_string());
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unexpected argument `{}`",
                    other
                )))
            }
        }
    }
    Ok(filter)
}

fn cmd_add_member(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ManageMembers)?;
    let full_name = required_arg(args, 0, "member name")?;
    let start_date = required_arg(args, 1, "start date")?;
    let draft = MemberDraft {
        full_name: full_name.to_string(),
        start_date: start_date.to_string(),
        end_date: args.get(2).map(|raw| raw.to_string()),
    };
    let member = MemberService::add(&mut context.storage, draft, context.clock.as_ref())?;
    io::print_success(format!(
        "Member #{} `{}` added (since {}).",
        member.id,
        member.full_name,
        display_date(context, &member.start_date)
    ));
    Ok(())
}

fn cmd_deactivate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ManageMembers)?;
    let id = parse_id(required_arg(args, 0, "member id")?, "member id")?;
    let end_date = required_arg(args, 1, "end date")?;
    let member =
        MemberService::deactivate(&mut context.storage, id, end_date, context.clock.as_ref())?;
    let until = member.end_date.as_deref().unwrap_or(end_date);
    io::print_success(format!(
        "Member #{} `{}` is inactive from {}.",
        member.id,
        member.full_name,
        display_date(context, until)
    ));
    Ok(())
}

fn cmd_reactivate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ManageMembers)?;
    let id = parse_id(required_arg(args, 0, "member id")?, "member id")?;
    let member = MemberService::reactivate(&mut context.storage, id)?;
    io::print_success(format!(
        "Member #{} `{}` is active again.",
        member.id, member.full_name
    ));
    Ok(())
}

fn cmd_remove_member(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ManageMembers)?;
    let id = parse_id(required_arg(args, 0, "member id")?, "member id")?;
    let overview = MemberService::overview(
        &context.storage,
        id,
        context.debt_source(),
        context.clock.as_ref(),
    )?;
    let prompt = format!(
        "Remove `{}` and their {} payment(s)?",
        overview.member.full_name,
        overview.payments.len()
    );
    if !context.confirm(&prompt)? {
        io::print_info("Removal cancelled.");
        return Ok(());
    }
    let removed = MemberService::remove(&mut context.storage, id)?;
    io::print_success(format!(
        "Member #{} `{}` removed.",
        removed.id, removed.full_name
    ));
    Ok(())
}

fn cmd_status(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ViewRoster)?;
    let id = parse_id(required_arg(args, 0, "member id")?, "member id")?;
    let source = context.debt_source();
    let overview = MemberService::overview(&context.storage, id, source, context.clock.as_ref())?;
    print_status(context, &overview);
    Ok(())
}

fn print_status(context: &ShellContext, overview: &MemberOverview) {
    let member = &overview.member;
    let summary = member.summary.as_ref().unwrap_or(&overview.local_summary);
    let overdue = overview.overdue_months(context.debt_source());

    output_section(format!("Member #{}: {}", member.id, member.full_name));
    io::print_info(format!(
        "  Since        : {}",
        display_date(context, &member.start_date)
    ));
    match member.end_date.as_deref().filter(|_| !member.is_active()) {
        Some(raw) => io::print_info(format!("  Until        : {}", display_date(context, raw))),
        None => io::print_info("  Until        : active"),
    }
    io::print_info(format!(
        "  Status       : {}",
        style().badge(&overview.status.to_string(), overview.status.is_debt())
    ));
    io::print_info(format!("  Due months   : {}", summary.total_months));
    io::print_info(format!("  Payments made: {}", summary.payments_made));
    if overdue.is_empty() {
        io::print_info("  Overdue      : none");
    } else {
        let months: Vec<String> = overdue.iter().map(ToString::to_string).collect();
        io::print_info(format!(
            "  Overdue      : {} ({})",
            overdue.len(),
            months.join(", ")
        ));
    }

    if overview.payments.is_empty() {
        return;
    }
    let mut table = Table::new(vec![
        TableColumn::right("Payment"),
        TableColumn::left("Month"),
        TableColumn::right("Amount"),
    ]);
    let mut payments = overview.payments.clone();
    payments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
    for payment in payments {
        table.push_row(vec![
            payment.id.to_string(),
            payment.timestamp,
            format!("{} {}", context.config.currency, payment.amount),
        ]);
    }
    render_table(&table);
}

/// Locale-formatted date, or the raw text when it does not parse.
pub(crate) fn display_date(context: &ShellContext, raw: &str) -> String {
    try_parse_calendar_date(raw, context.clock.as_ref())
        .map(|date| format_date(date, &context.config.locale))
        .unwrap_or_else(|| raw.to_string())
}
