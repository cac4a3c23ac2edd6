pub mod accounting;
pub mod backup;
pub mod config;
pub mod members;
pub mod payments;
pub mod system;

use crate::cli::registry::CommandRegistry;

/// Every shell command, in the order `help` lists them.
pub(crate) fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    let entries = members::definitions()
        .into_iter()
        .chain(payments::definitions())
        .chain(accounting::definitions())
        .chain(config::definitions())
        .chain(backup::definitions())
        .chain(system::definitions());
    for entry in entries {
        registry.register(entry);
    }
    registry
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use tempfile::tempdir;

    use cuotas_core::{CoreError, FixedClock, MemberService};
    use cuotas_domain::{DebtStatus, Role};

    use super::*;
    use crate::cli::core::{process_script, CliMode, CommandError, ShellContext};

    fn session(home: std::path::PathBuf) -> ShellContext {
        let mut context = ShellContext::with_home(CliMode::Script, home).expect("context");
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        context.clock = Arc::new(FixedClock::on(today));
        context
    }

    fn run(context: &mut ShellContext, lines: &[&str]) {
        for line in lines {
            if let Err(err) = context.process_line(line) {
                context.report_error(err).expect("report");
            }
        }
    }

    fn status_of(context: &ShellContext, id: i64) -> DebtStatus {
        MemberService::overview(&context.storage, id, context.debt_source(), context.clock.as_ref())
            .expect("overview")
            .status
    }

    #[test]
    fn registry_lists_every_command_once() {
        let registry = registry();
        let names: Vec<&str> = registry.names().collect();
        for expected in [
            "members",
            "add-member",
            "deactivate",
            "reactivate",
            "remove-member",
            "status",
            "grid",
            "pay",
            "unpay",
            "settle",
            "accounting",
            "config",
            "backup",
            "backups",
            "restore",
            "version",
            "help",
            "exit",
        ] {
            assert!(names.contains(&expected), "missing `{}`", expected);
        }
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn plain_users_cannot_change_the_roster() {
        let dir = tempdir().unwrap();
        let mut context = session(dir.path().to_path_buf());
        let err = context
            .process_line("add-member \"Ana Ruiz\" 2024-01-15")
            .expect_err("denied");
        assert!(matches!(
            err,
            CommandError::Core(CoreError::PermissionDenied { .. })
        ));
        assert!(context.storage.roster().members.is_empty());
    }

    #[test]
    fn dues_flow_from_debt_to_current() {
        let dir = tempdir().unwrap();
        let mut context = session(dir.path().to_path_buf());
        run(
            &mut context,
            &[
                "config set role admin",
                "add-member \"Ana Ruiz\" 2024-01-15",
                "pay 1 2024-01 15",
                "pay 1 2024-02 15",
                "pay 1 2024-02 15",
            ],
        );
        assert_eq!(context.storage.roster().payments.len(), 2);
        assert_eq!(status_of(&context, 1), DebtStatus::Debt);

        // No amount and no default fee: nothing is recorded.
        run(&mut context, &["settle 1"]);
        assert_eq!(context.storage.roster().payments.len(), 2);

        run(&mut context, &["config set default_fee 15", "settle 1"]);
        assert_eq!(context.storage.roster().payments.len(), 6);
        assert_eq!(status_of(&context, 1), DebtStatus::Current);

        run(&mut context, &["unpay 1", "grid 1", "members --debt debt", "status 1"]);
        assert_eq!(context.storage.roster().payments.len(), 5);
        assert_eq!(status_of(&context, 1), DebtStatus::Debt);
    }

    #[test]
    fn configuration_survives_a_new_session() {
        let dir = tempdir().unwrap();
        let context = process_script(
            dir.path().to_path_buf(),
            &["config set role admin", "config set currency eur", "exit", "config set role user"],
        )
        .expect("script");
        assert_eq!(context.config.role, Role::Admin);

        let reopened = session(dir.path().to_path_buf());
        assert_eq!(reopened.config.role, Role::Admin);
        assert_eq!(reopened.config.currency, "EUR");
    }

    #[test]
    fn removal_in_scripts_skips_confirmation() {
        let dir = tempdir().unwrap();
        let mut context = session(dir.path().to_path_buf());
        run(
            &mut context,
            &[
                "config set role admin",
                "add-member Luis 2024-01-01",
                "pay 1 2024-03 10",
                "remove-member 1",
            ],
        );
        assert!(context.storage.roster().members.is_empty());
        assert!(context.storage.roster().payments.is_empty());
    }
}
