use rollbook_core::controller::NO_DATA_MESSAGE;
use rollbook_core::db::open_db_in_memory;
use rollbook_core::{
    load_export, run_session, AppConfig, ChartBody, ChartKind, Command, Controller, ErrorKind,
    Outcome, SortColumn, SortKey, StudentForm, StudentRecord,
};

fn form(name: &str, age: &str, grade: &str, score: &str, city: &str) -> StudentForm {
    StudentForm {
        name: name.to_string(),
        age: age.to_string(),
        grade: grade.to_string(),
        score: score.to_string(),
        city: city.to_string(),
    }
}

fn add(controller: &mut Controller, student: StudentForm) -> i64 {
    match controller.dispatch(Command::Add(student)) {
        Outcome::Added { id, .. } => id,
        other => panic!("unexpected outcome: {other:?}"),
    }
}

fn listing(controller: &mut Controller) -> Vec<StudentRecord> {
    match controller.dispatch(Command::Refresh(SortKey::default())) {
        Outcome::Listing(records) => records,
        other => panic!("unexpected outcome: {other:?}"),
    }
}

fn seeded() -> (Controller, [i64; 3]) {
    let mut controller = Controller::new(open_db_in_memory().unwrap());
    let alice = add(&mut controller, form("Alice", "20", "A", "91.5", "Beijing"));
    let bob = add(&mut controller, form("Bob", "21", "B", "77.0", "Shanghai"));
    let cara = add(&mut controller, form("Cara", "20", "A", "88.0", "Beijing"));
    (controller, [alice, bob, cara])
}

#[test]
fn end_to_end_scenario_aggregates_projects_and_deletes() {
    let (mut controller, [alice, bob, cara]) = seeded();

    let Outcome::Chart(pie) = controller.dispatch(Command::ShowChart(ChartKind::CityPie)) else {
        panic!("expected city chart");
    };
    let ChartBody::Pie(pie) = pie.body else {
        panic!("expected pie body");
    };
    let wedges: Vec<(String, u64)> = pie
        .wedges
        .iter()
        .map(|wedge| (wedge.label.clone(), wedge.count))
        .collect();
    assert_eq!(
        wedges,
        vec![("Beijing".to_string(), 2), ("Shanghai".to_string(), 1)]
    );

    let ages: Vec<i64> = listing(&mut controller).iter().map(|r| r.age).collect();
    assert_eq!(ages, vec![20, 21, 20]);

    let outcome = controller.dispatch(Command::RequestDelete(vec![bob]));
    assert!(matches!(outcome, Outcome::ConfirmationRequired { ref ids, .. } if ids == &vec![bob]));
    match controller.dispatch(Command::ConfirmDelete) {
        Outcome::Deleted { removed, listing } => {
            assert_eq!(removed, 1);
            let ids: Vec<i64> = listing.iter().map(|record| record.id).collect();
            assert_eq!(ids, vec![alice, cara]);
            assert_eq!(listing[0].name, "Alice");
            assert_eq!(listing[1].name, "Cara");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn add_refreshes_listing_in_outcome() {
    let mut controller = Controller::new(open_db_in_memory().unwrap());
    let outcome = controller.dispatch(Command::Add(form(" Alice ", "20", "A", "91.5", "Beijing")));

    let listing = outcome.listing().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "Alice");
    assert!(outcome.message().contains("added"));
}

#[test]
fn invalid_form_is_reported_as_validation_failure_without_writing() {
    let mut controller = Controller::new(open_db_in_memory().unwrap());

    for bad in [
        form("", "20", "A", "90", "Beijing"),
        form("Alice", "twenty", "A", "90", "Beijing"),
        form("Alice", "20", "A", "ninety", "Beijing"),
    ] {
        match controller.dispatch(Command::Add(bad)) {
            Outcome::Failed { kind, message } => {
                assert_eq!(kind, ErrorKind::Validation);
                assert!(message.starts_with("Invalid input"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert!(listing(&mut controller).is_empty());
}

#[test]
fn delete_requires_selection_and_confirmation() {
    let (mut controller, [alice, _, _]) = seeded();

    let outcome = controller.dispatch(Command::RequestDelete(Vec::new()));
    assert!(matches!(
        outcome,
        Outcome::Failed {
            kind: ErrorKind::Validation,
            ..
        }
    ));

    let outcome = controller.dispatch(Command::ConfirmDelete);
    assert!(outcome.is_failure());

    controller.dispatch(Command::RequestDelete(vec![alice]));
    assert_eq!(controller.pending_delete(), Some(&[alice][..]));
    assert_eq!(listing(&mut controller).len(), 3);

    assert_eq!(
        controller.dispatch(Command::CancelDelete),
        Outcome::DeleteCancelled
    );
    assert!(controller.pending_delete().is_none());
    assert!(controller.dispatch(Command::ConfirmDelete).is_failure());
    assert_eq!(listing(&mut controller).len(), 3);
}

#[test]
fn confirming_delete_of_missing_id_changes_nothing() {
    let (mut controller, _) = seeded();

    controller.dispatch(Command::RequestDelete(vec![42_000]));
    match controller.dispatch(Command::ConfirmDelete) {
        Outcome::Deleted { removed, listing } => {
            assert_eq!(removed, 0);
            assert_eq!(listing.len(), 3);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn charts_on_empty_store_short_circuit_with_warning() {
    let mut controller = Controller::new(open_db_in_memory().unwrap());

    for kind in [
        ChartKind::AgeHistogram,
        ChartKind::ScoreHistogram,
        ChartKind::CityPie,
    ] {
        assert_eq!(
            controller.dispatch(Command::ShowChart(kind)),
            Outcome::Warning(NO_DATA_MESSAGE.to_string())
        );
    }
}

#[test]
fn histograms_cover_every_record_with_ten_buckets() {
    let (mut controller, _) = seeded();

    for kind in [ChartKind::AgeHistogram, ChartKind::ScoreHistogram] {
        let Outcome::Chart(chart) = controller.dispatch(Command::ShowChart(kind)) else {
            panic!("expected chart for {kind:?}");
        };
        assert_eq!(chart.kind, kind);
        assert_eq!(chart.title, kind.title());
        let ChartBody::Histogram(histogram) = chart.body else {
            panic!("expected histogram body");
        };
        assert_eq!(histogram.buckets.len(), 10);
        assert_eq!(histogram.total(), 3);
    }
}

#[test]
fn export_command_writes_current_listing() {
    let (mut controller, _) = seeded();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");

    match controller.dispatch(Command::Export(path.clone())) {
        Outcome::Exported { path: written, count } => {
            assert_eq!(written, path);
            assert_eq!(count, 3);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(load_export(&path).unwrap(), listing(&mut controller));
}

#[test]
fn export_to_unwritable_path_is_io_failure() {
    let (mut controller, _) = seeded();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.json");

    match controller.dispatch(Command::Export(path)) {
        Outcome::Failed { kind, message } => {
            assert_eq!(kind, ErrorKind::Io);
            assert!(message.starts_with("Export failed"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn form_draft_is_kept_on_failure_and_cleared_on_success() {
    let mut controller = Controller::new(open_db_in_memory().unwrap());
    let bad = form("Alice", "twenty", "A", "91.5", "Beijing");

    assert!(controller.dispatch(Command::Add(bad.clone())).is_failure());
    assert_eq!(controller.form(), &bad);

    assert_eq!(controller.dispatch(Command::ClearForm), Outcome::FormCleared);
    assert_eq!(controller.form(), &StudentForm::default());

    let good = form("Alice", "20", "A", "91.5", "Beijing");
    assert!(matches!(
        controller.dispatch(Command::Add(good)),
        Outcome::Added { .. }
    ));
    assert_eq!(controller.form(), &StudentForm::default());
}

#[test]
fn refresh_sort_key_orders_later_listings_but_not_export() {
    let (mut controller, [alice, bob, cara]) = seeded();

    let by_score = SortKey::new(SortColumn::Score, true);
    let Outcome::Listing(records) = controller.dispatch(Command::Refresh(by_score)) else {
        panic!("expected listing");
    };
    let ids: Vec<i64> = records.iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![alice, cara, bob]);
    assert_eq!(controller.sort_key(), by_score);

    let by_city = SortKey::new(SortColumn::City, false);
    controller.dispatch(Command::Refresh(by_city));
    let dave = add(&mut controller, form("Dave", "19", "C", "60", "Beijing"));
    let Outcome::Listing(records) = controller.dispatch(Command::Refresh(by_city)) else {
        panic!("expected listing");
    };
    let ids: Vec<i64> = records.iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![alice, cara, dave, bob]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sorted.json");
    controller.dispatch(Command::Export(path.clone()));
    let exported: Vec<i64> = load_export(&path).unwrap().iter().map(|r| r.id).collect();
    assert_eq!(exported, vec![alice, bob, cara, dave]);
}

#[test]
fn weather_and_clear_form_commands() {
    let mut controller = Controller::new(open_db_in_memory().unwrap());

    match controller.dispatch(Command::FetchWeather("Beijing".to_string())) {
        Outcome::Weather(text) => assert!(text.starts_with("City: Beijing")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(controller
        .dispatch(Command::FetchWeather("  ".to_string()))
        .is_failure());
    assert_eq!(controller.dispatch(Command::ClearForm), Outcome::FormCleared);
}

#[test]
fn session_persists_records_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        db_path: dir.path().join("students.db"),
        ..AppConfig::default()
    };

    let first_id = run_session(&config, |controller| {
        add(controller, form("Alice", "20", "A", "91.5", "Beijing"))
    })
    .unwrap();

    let records = run_session(&config, |controller| listing(controller)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, first_id);

    let (controller, _) = seeded();
    controller.close().unwrap();
}
