mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use predicates::str::contains;
use trio_core::{BudgetSession, DocumentStore, FixedClock};
use trio_domain::{AllocationPolicy, EntryCategory, MonthKey};
use trio_storage_json::JsonDocumentStore;

use common::{script_command, temp_home};

#[test]
fn state_survives_between_runs() {
    let home = temp_home();
    script_command(&home)
        .write_stdin("month 2024-02\nentry add income 1500 pay\ngoal create House 50000 2099-01-01\n")
        .assert()
        .success();

    script_command(&home)
        .write_stdin("history\ngoal list\n")
        .assert()
        .success()
        .stdout(contains("2024-02"))
        .stdout(contains("House"));
}

#[test]
fn documents_written_by_the_cli_load_in_a_session() {
    let home = temp_home();
    script_command(&home)
        .write_stdin(
            "month 2024-03\ngoal create Trip 1000 2099-12-31\ngoal add Trip recurring 250 March\nallocation set 40 40 20\n",
        )
        .assert()
        .success();

    let store: Arc<dyn DocumentStore> =
        Arc::new(JsonDocumentStore::new(home.join("data")).unwrap());
    let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()));
    let session = BudgetSession::open(store, clock, AllocationPolicy::default()).unwrap();

    assert_eq!(session.allocation(), AllocationPolicy::new(40, 40, 20));
    let march = session.month(MonthKey::parse("2024-03").unwrap()).unwrap();
    let twin = &march.entries(EntryCategory::Discretionary)[0];
    let goal = &session.goals()[0];
    assert_eq!(goal.base_savings, 250.0);
    assert_eq!(goal.transactions[0].id, twin.id);
    assert!(session.integrity_report().is_empty());
}

#[test]
fn save_rewrites_every_document() {
    let home = temp_home();
    script_command(&home)
        .write_stdin("save\n")
        .assert()
        .success()
        .stdout(contains("Saved all documents"));

    for name in ["monthlyRecords", "wantsBudgets", "budgetPercents"] {
        assert!(common::data_file(&home, name).exists(), "{name} missing");
    }
}
