use cuotas_core::{Clock, MemberService, PaymentService};
use cuotas_domain::{Action, MonthKey, MonthSlot, PaymentDraft, YearLedger};

use crate::cli::core::{parse_id, required_arg, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::formatting::month_labels;
use crate::cli::ui::style::style;
use crate::cli::ui::table_renderer::{Table, TableColumn};

const OVERDUE_MARK: &str = "--";
const PENDING_MARK: &str = ".";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "grid",
            "Show a member's monthly payment grid",
            "grid <member id> [year]",
            cmd_grid,
        ),
        CommandEntry::new(
            "pay",
            "Record the payment of one month",
            "pay <member id> <YYYY-MM> [amount]",
            cmd_pay,
        ),
        CommandEntry::new(
            "unpay",
            "Delete a recorded payment",
            "unpay <payment id>",
            cmd_unpay,
        ),
        CommandEntry::new(
            "settle",
            "Pay every overdue month of a member",
            "settle <member id> [amount]",
            cmd_settle,
        ),
    ]
}

fn cmd_grid(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ViewRoster)?;
    let id = parse_id(required_arg(args, 0, "member id")?, "member id")?;
    let year = match args.get(1) {
        Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
            CommandError::InvalidArguments(format!("invalid year `{}`", raw))
        })?),
        None => None,
    };
    let overview = MemberService::overview(
        &context.storage,
        id,
        context.debt_source(),
        context.clock.as_ref(),
    )?;

    output_section(format!(
        "Payments of #{} {}",
        overview.member.id, overview.member.full_name
    ));
    let years: Vec<&YearLedger> = overview
        .ledger
        .years
        .iter()
        .filter(|entry| year.map_or(true, |wanted| entry.year == wanted))
        .collect();
    if years.is_empty() {
        io::print_info(match year {
            Some(year) => format!("No membership months in {}.", year),
            None => "No membership months to show.".to_string(),
        });
        return Ok(());
    }

    let current = context.clock.current_month();
    let mut columns = vec![TableColumn::left("Year")];
    columns.extend(
        month_labels(&context.config.locale)
            .iter()
            .map(|label| TableColumn::right(*label)),
    );
    let mut table = Table::new(columns);
    for entry in years {
        let mut row = vec![entry.year.to_string()];
        for (idx, slot) in entry.months.iter().enumerate() {
            let month = MonthKey::new(entry.year, idx as u32 + 1);
            row.push(render_slot(slot, month.map_or(false, |month| month <= current)));
        }
        table.push_row(row);
    }
    render_table(&table);
    io::print_info(format!(
        "Amounts are paid months, `{}` overdue, `{}` not yet due.",
        OVERDUE_MARK, PENDING_MARK
    ));
    Ok(())
}

fn render_slot(slot: &MonthSlot, elapsed: bool) -> String {
    match (slot.paid, slot.due, elapsed) {
        (true, _, _) => style().badge(slot.amount.as_deref().unwrap_or("?"), false),
        (false, true, true) => style().badge(OVERDUE_MARK, true),
        (false, true, false) => PENDING_MARK.to_string(),
        (false, false, _) => String::new(),
    }
}

/// Explicit amount, else the configured default fee.
fn resolve_amount(context: &ShellContext, raw: Option<&&str>) -> Result<String, CommandError> {
    raw.map(|value| value.to_string())
        .or_else(|| context.config.default_fee.clone())
        .ok_or_else(|| {
            CommandError::InvalidArguments(
                "missing amount (or set one with `config set default_fee <amount>`)".into(),
            )
        })
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ManagePayments)?;
    let owner_id = parse_id(required_arg(args, 0, "member id")?, "member id")?;
    let month = PaymentService::parse_month(required_arg(args, 1, "month (YYYY-MM)")?)?;
    let amount = resolve_amount(context, args.get(2))?;
    let payment = PaymentService::record(
        &mut context.storage,
        PaymentDraft {
            owner_id,
            month,
            amount,
        },
        context.clock.as_ref(),
    )?;
    io::print_success(format!(
        "Payment #{} recorded: member #{}, {}, {} {}.",
        payment.id, payment.owner_id, payment.timestamp, context.config.currency, payment.amount
    ));
    Ok(())
}

fn cmd_unpay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ManagePayments)?;
    let id = parse_id(required_arg(args, 0, "payment id")?, "payment id")?;
    let removed = PaymentService::remove(&mut context.storage, id)?;
    io::print_success(format!(
        "Payment #{} of member #{} ({}) deleted.",
        removed.id, removed.owner_id, removed.timestamp
    ));
    Ok(())
}

fn cmd_settle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ManagePayments)?;
    let member_id = parse_id(required_arg(args, 0, "member id")?, "member id")?;
    let amount = resolve_amount(context, args.get(1))?;
    let source = context.debt_source();
    let recorded = PaymentService::settle_overdue(
        &mut context.storage,
        member_id,
        &amount,
        source,
        context.clock.as_ref(),
    )?;
    if recorded.is_empty() {
        io::print_info(format!("Member #{} has no overdue months.", member_id));
        return Ok(());
    }
    let months: Vec<&str> = recorded
        .iter()
        .map(|payment| payment.timestamp.as_str())
        .collect();
    io::print_success(format!(
        "Recorded {} payment(s) for member #{}: {}.",
        recorded.len(),
        member_id,
        months.join(", ")
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_render_by_state() {
        assert_eq!(render_slot(&MonthSlot::paid("15.00", 3), true), "15.00");
        let mut due = MonthSlot::unpaid();
        due.due = true;
        assert_eq!(render_slot(&due, true), OVERDUE_MARK);
        assert_eq!(render_slot(&due, false), PENDING_MARK);
        assert_eq!(render_slot(&MonthSlot::unpaid(), true), "");
    }
}
