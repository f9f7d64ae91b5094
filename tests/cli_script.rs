mod common;

use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::{data_file, script_command, temp_home};

#[test]
fn essentials_spending_shows_remaining_and_usage() {
    let home = temp_home();
    let script = "\
month 2024-01
entry add income 1000 salary
entry add essentials 300 rent
summary
exit
";
    script_command(&home)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            contains("Summary 2024-01 (allocation 50/30/20)")
                .and(contains("200.00"))
                .and(contains("60.0%"))
                .and(contains("700.00")),
        );

    let months = std::fs::read_to_string(data_file(&home, "monthlyRecords")).unwrap();
    assert!(months.contains("\"needsExpenses\""));
    assert!(months.contains("\"rent\""));
}

#[test]
fn unbalanced_allocation_is_rejected() {
    let home = temp_home();
    script_command(&home)
        .write_stdin("allocation set 60 30 20\nallocation set 60 30 10\nallocation\n")
        .assert()
        .success()
        .stdout(
            contains("Allocation must add up to 100 (got 60/30/20)")
                .and(contains("Allocation set to 60/30/10")),
        );

    let percents = std::fs::read_to_string(data_file(&home, "budgetPercents")).unwrap();
    assert!(percents.contains("\"needs\": 60"));
}

#[test]
fn recurring_contribution_lands_in_both_ledgers() {
    let home = temp_home();
    let script = "\
month 2024-01
goal create Trip 1000 2099-12-31
goal add Trip recurring 100 Jan
entry list discretionary
goal show Trip
";
    script_command(&home)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            contains("Recorded as a discretionary entry in 2024-01.")
                .and(contains("Recurring Contribution"))
                .and(contains("10.0%")),
        );

    let goals = std::fs::read_to_string(data_file(&home, "wantsBudgets")).unwrap();
    assert!(goals.contains("\"type\": \"monthly\""));
    let months = std::fs::read_to_string(data_file(&home, "monthlyRecords")).unwrap();
    assert!(months.contains("\"wantsExpenses\""));
    assert!(months.contains("\"Jan\""));
}

#[test]
fn removing_the_month_entry_reverses_the_goal() {
    let home = temp_home();
    let script = "\
month 2024-01
goal create Trip 1000 2099-12-31 --base 50
goal add Trip recurring 100 Jan
entry remove discretionary last
goal show Trip
check
";
    script_command(&home)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            contains("Also removed the contribution from goal `Trip`.")
                .and(contains("No transactions."))
                .and(contains("Goals and month ledgers are consistent.")),
        );
}

#[test]
fn validation_errors_are_reported_and_the_shell_continues() {
    let home = temp_home();
    script_command(&home)
        .write_stdin("entry add essentials -5 rent\nentry add essentials 5\nmonth 2024-1\nversion\n")
        .assert()
        .success()
        .stdout(
            contains("Invalid amount: -5")
                .and(contains("A note is required for essentials entries"))
                .and(contains("2024-1"))
                .and(contains("Trio Budget")),
        );
}

#[test]
fn backups_accumulate_and_restore() {
    let home = temp_home();
    let script = "\
allocation set 60 30 10
allocation set 70 20 10
backup list allocation
backup restore allocation latest
allocation
";
    script_command(&home)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            contains("Backups of budgetPercents")
                .and(contains("Restored budgetPercents"))
                .and(contains("Allocation 60/30/10")),
        );
}
