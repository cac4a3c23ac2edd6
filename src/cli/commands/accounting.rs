use chrono::Datelike;

use cuotas_core::{AccountingService, Clock, MemberStore, PaymentService};
use cuotas_domain::Action;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::formatting::{format_amount, month_labels};
use crate::cli::ui::table_renderer::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "accounting",
        "Collected dues per month of a year, or for one month",
        "accounting [year | YYYY-MM]",
        cmd_accounting,
    )]
}

fn cmd_accounting(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Action::ViewRoster)?;
    let payments = context.storage.list_payments()?;
    let currency = context.config.currency.clone();

    if let Some(raw) = args.first().filter(|raw| raw.contains('-')) {
        let month = PaymentService::parse_month(raw)?;
        let total = AccountingService::month_total(&payments, month, context.clock.as_ref());
        output_section(format!("Accounting {}", month));
        io::print_info(format!("  Collected: {}", format_amount(total, &currency)));
        return Ok(());
    }

    let year = match args.first() {
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| CommandError::InvalidArguments(format!("invalid year `{}`", raw)))?,
        None => context.clock.today().year(),
    };
    let summary = AccountingService::year_summary(&payments, year, context.clock.as_ref());

    output_section(format!("Accounting {}", year));
    let mut table = Table::new(vec![
        TableColumn::left("Month"),
        TableColumn::right("Collected"),
    ]);
    for (label, amount) in month_labels(&context.config.locale)
        .iter()
        .zip(summary.monthly.iter())
    {
        table.push_row(vec![label.to_string(), format_amount(*amount, &currency)]);
    }
    table.push_row(vec!["Total".into(), format_amount(summary.total, &currency)]);
    render_table(&table);
    io::print_info(format!("{} payment(s) counted.", summary.payment_count));
    Ok(())
}
