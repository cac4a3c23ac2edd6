mod common;

use predicates::prelude::*;
use predicates::str::contains;

use common::{cli, script, temp_home};

#[test]
fn script_mode_runs_a_dues_session() {
    let home = temp_home();
    let input = "\
config set role admin
add-member \"Ana Ruiz\" 2024-01-15
pay 1 2024-01 15
members
grid 1
status 1
accounting 2024
exit
";

    script(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Member #1 `Ana Ruiz` added"))
        .stdout(contains("Payment #1 recorded"))
        .stdout(contains("=== Members ==="))
        .stdout(contains("DEBT"))
        .stdout(contains("Ene"))
        .stdout(contains("2024-02, 2024-03, 2024-04, 2024-05, 2024-06"))
        .stdout(contains("ARS 15.00"));

    let roster = std::fs::read_to_string(home.join("data").join("roster.json")).unwrap();
    assert!(roster.contains("\"Ana Ruiz\""));
    assert!(home.join("config").join("config.json").exists());
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = temp_home();
    script(&home)
        .write_stdin("membrs\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `membrs`"))
        .stdout(contains("Suggestion: `members`?"));
}

#[test]
fn errors_in_scripts_do_not_stop_the_session() {
    let home = temp_home();
    script(&home)
        .write_stdin("add-member Luis 2024-01-01\npay\nhelp pay\n")
        .assert()
        .success()
        .stdout(contains("Permission denied").and(contains("config set role")))
        .stdout(contains("Usage: pay <member id> <YYYY-MM> [amount]"));
}

#[test]
fn one_shot_commands_share_state_between_runs() {
    let home = temp_home();
    cli(&home)
        .args(["config", "set", "role", "admin"])
        .assert()
        .success();
    cli(&home)
        .args(["add-member", "Luis Gómez", "01/03/2024"])
        .assert()
        .success()
        .stdout(contains("since 01/03/2024"));
    cli(&home)
        .args(["members", "--status", "active"])
        .assert()
        .success()
        .stdout(contains("Luis Gómez"));
}

#[test]
fn one_shot_failures_exit_non_zero() {
    let home = temp_home();
    cli(&home)
        .args(["pay", "1", "2024-01", "15"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}

#[test]
fn one_shot_unknown_commands_exit_non_zero() {
    let home = temp_home();
    cli(&home)
        .arg("membrs")
        .assert()
        .failure()
        .stdout(contains("Suggestion: `members`?"))
        .stderr(contains("unknown command `membrs`"));
}

#[test]
fn version_reports_build_metadata() {
    let home = temp_home();
    cli(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(contains("Cuotas").and(contains("Roster schema: v1")));
}

#[test]
fn roster_backups_can_be_listed_and_restored() {
    let home = temp_home();
    let input = "\
config set role admin
add-member Ana 2024-01-01
backup antes de borrar
remove-member 1
members
backups
";
    let output = script(&home).write_stdin(input).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("No members yet"));
    let name = stdout
        .split('`')
        .find(|part| part.ends_with("_antes-de-borrar.json"))
        .expect("backup name in output")
        .to_string();

    script(&home)
        .write_stdin(format!("restore {}\nmembers\n", name))
        .assert()
        .success()
        .stdout(contains("Roster restored").and(contains("Ana")));
}
