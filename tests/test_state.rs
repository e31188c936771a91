// State coordinator, event bus and debounce tests
// Author: Gabriel Demetrios Lafis

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{Local, TimeZone};

use weather_dashboard_engine::{
    data::{DataSet, DatasetLoader, SyntheticSource},
    processing::{ChartPipeline, ChartSettings, FilterUpdate, Selection},
    state::{
        markdown_report, spawn_debouncer, EventKind, FilterDebouncer, ObserverError, RecommendationKind,
        StateCoordinator, StateEvent, DEFAULT_SECTION,
    },
};

fn dataset(rows: usize) -> DataSet {
    DatasetLoader::new().load(&SyntheticSource::new(2024, rows)).unwrap()
}

fn coordinator() -> StateCoordinator {
    StateCoordinator::new(ChartPipeline::standard(&ChartSettings::default()))
}

fn recorder(coordinator: &mut StateCoordinator, filter: Option<EventKind>) -> Rc<RefCell<Vec<EventKind>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    coordinator.subscribe(filter, move |event, _| {
        sink.borrow_mut().push(event.kind());
        Ok(())
    });
    seen
}

#[test]
fn test_set_dataset_resets_filtered_view() {
    let mut coordinator = coordinator();
    let seen = recorder(&mut coordinator, None);

    coordinator.set_dataset(dataset(150));

    assert_eq!(*seen.borrow(), vec![EventKind::Dataset]);
    assert_eq!(coordinator.filtered_records().len(), 150);
    assert_eq!(coordinator.charts().len(), 12);
    assert!(coordinator.weather_stats().total_countries > 0);
}

#[test]
fn test_filter_update_emits_filters_then_charts() {
    let mut coordinator = coordinator();
    coordinator.set_dataset(dataset(300));

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    coordinator.subscribe(None, move |event, state| {
        sink.borrow_mut().push((event.clone(), state.filtered.len()));
        Ok(())
    });

    coordinator
        .update_filters(&FilterUpdate::default().country(Selection::Only("Japan".to_string())))
        .unwrap();

    let events = events.borrow();
    assert_eq!(events.len(), 2);

    let filtered = coordinator.filtered_records().len();
    match &events[0].0 {
        StateEvent::FiltersChanged { filters, filtered_rows } => {
            assert_eq!(filters.country, Selection::Only("Japan".to_string()));
            assert_eq!(*filtered_rows, filtered);
        },
        other => panic!("unexpected first event {:?}", other),
    }
    assert_eq!(events[0].1, filtered);
    assert_eq!(events[1].0.kind(), EventKind::Charts);

    assert!(coordinator.filtered_records().iter().all(|r| r.country.as_deref() == Some("Japan")));
}

#[test]
fn test_invalid_update_changes_nothing() {
    let mut coordinator = coordinator();
    coordinator.set_dataset(dataset(120));
    let seen = recorder(&mut coordinator, None);

    assert!(coordinator.update_filters(&FilterUpdate::default().month(Selection::Only(13))).is_err());
    assert!(seen.borrow().is_empty());
    assert!(coordinator.filters().is_default());
}

#[test]
fn test_failing_observers_do_not_block_others() {
    let mut coordinator = coordinator();
    coordinator.set_dataset(dataset(120));

    coordinator.subscribe(None, |_, _| Err(ObserverError::new("chart container missing")));
    coordinator.subscribe(None, |_, _| panic!("observer exploded"));
    let seen = recorder(&mut coordinator, None);

    coordinator.update_filters(&FilterUpdate::default().show_outliers(false)).unwrap();

    assert_eq!(*seen.borrow(), vec![EventKind::Filters, EventKind::Charts]);
}

#[test]
fn test_filtered_subscription_and_unsubscribe() {
    let mut coordinator = coordinator();
    let ui_only = recorder(&mut coordinator, Some(EventKind::Ui));

    let seen = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&seen);
    let id = coordinator.subscribe(None, move |_, _| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    coordinator.set_dataset(dataset(110));
    coordinator.set_current_section("charts");
    coordinator.set_online(false);

    assert_eq!(*ui_only.borrow(), vec![EventKind::Ui]);
    assert_eq!(*seen.borrow(), 3);

    assert!(coordinator.unsubscribe(id));
    assert!(!coordinator.unsubscribe(id));
    coordinator.set_loading(true, Some("Working"));
    assert_eq!(*seen.borrow(), 3);
    assert_eq!(ui_only.borrow().len(), 2);
    assert!(!coordinator.state().online);
}

#[test]
fn test_reset_restores_defaults_and_keeps_dataset() {
    let mut coordinator = coordinator();
    coordinator.set_dataset(dataset(200));
    coordinator.update_filters(&FilterUpdate::default().month(Selection::Only(2))).unwrap();
    coordinator.set_current_section("analysis");
    coordinator.set_error("boom");

    let seen = recorder(&mut coordinator, None);
    coordinator.reset();

    assert_eq!(*seen.borrow(), vec![EventKind::Reset]);
    assert!(coordinator.filters().is_default());
    assert_eq!(coordinator.state().ui.current_section, DEFAULT_SECTION);
    assert!(coordinator.state().ui.error.is_none());
    assert_eq!(coordinator.filtered_records().len(), 200);
}

#[test]
fn test_stats_and_recommendations() {
    let mut coordinator = coordinator();
    assert!(coordinator.recommendations().is_empty());

    coordinator.set_dataset(dataset(150));
    coordinator.update_filters(&FilterUpdate::default().month(Selection::Only(5))).unwrap();

    let stats = coordinator.stats();
    assert!(stats.has_dataset);
    assert_eq!(stats.dataset_size, 150);
    assert_eq!(stats.filtered_size, coordinator.filtered_records().len());
    assert_eq!(stats.active_filters, 1);
    assert!(!stats.has_error);

    // One month out of 150 rows leaves fewer than 100 records
    let recommendations = coordinator.recommendations();
    assert!(recommendations.iter().any(|r| r.kind == RecommendationKind::Data));
}

#[test]
fn test_snapshot_round_trip() {
    let mut source = coordinator();
    source.set_dataset(dataset(180));
    source
        .update_filters(
            &FilterUpdate::default()
                .year(Selection::Only(2024))
                .temperature_range(-5.0, 25.0)
                .show_outliers(false),
        )
        .unwrap();
    source.set_current_section("maps");

    let exported = source.export_state().unwrap();
    let document: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(document["ui"]["current_section"], "maps");
    assert_eq!(document["metadata"]["total_rows"], 180);

    let mut target = coordinator();
    target.set_dataset(dataset(180));
    target.import_state(&exported).unwrap();

    assert_eq!(target.filters(), source.filters());
    assert_eq!(target.state().ui.current_section, "maps");
    assert_eq!(target.filtered_records().len(), source.filtered_records().len());
}

#[test]
fn test_import_failure_sets_error() {
    let mut coordinator = coordinator();

    assert!(coordinator.import_state("{not json").is_err());
    assert_eq!(
        coordinator.state().ui.error.as_deref(),
        Some("Failed to import dashboard configuration")
    );

    let bad_month = r#"{"filters": {"month": 14}}"#;
    assert!(coordinator.import_state(bad_month).is_err());
    assert!(coordinator.filters().is_default());
}

#[test]
fn test_markdown_report() {
    let mut coordinator = coordinator();
    coordinator.set_dataset(dataset(100));
    coordinator.update_filters(&FilterUpdate::default().month(Selection::Only(1))).unwrap();

    let generated_at = Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let report = markdown_report(coordinator.filtered_records(), coordinator.filters(), generated_at);

    assert!(report.starts_with("# Global Weather Report"));
    assert!(report.contains("**Generated:** 2024-03-01 12:00:00"));
    assert!(report.contains(&format!("- **Records analyzed:** {}", coordinator.filtered_records().len())));
    assert!(report.contains("## Applied Filters\nMonth: January"));
}

#[test]
fn test_debouncer_keeps_only_last_value() {
    let start = Instant::now();
    let mut debouncer = FilterDebouncer::new(Duration::from_millis(300));

    let first = debouncer.submit("a", start);
    let second = debouncer.submit("b", start + Duration::from_millis(200));
    assert!(!debouncer.is_current(first));
    assert!(debouncer.is_current(second));

    assert_eq!(debouncer.take_ready(start + Duration::from_millis(400)), None);
    assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(500)));
    assert_eq!(debouncer.take_ready(start + Duration::from_millis(500)), Some((second, "b")));
    assert!(!debouncer.has_pending());
    assert_eq!(debouncer.take_ready(start + Duration::from_secs(5)), None);
}

#[test]
fn test_debouncer_cancel() {
    let start = Instant::now();
    let mut debouncer = FilterDebouncer::new(Duration::from_millis(300));

    debouncer.submit(1, start);
    assert!(debouncer.cancel());
    assert!(!debouncer.cancel());
    assert_eq!(debouncer.take_ready(start + Duration::from_secs(1)), None);
}

#[tokio::test(start_paused = true)]
async fn test_spawned_debouncer_forwards_last_value_of_burst() {
    let (tx, mut rx) = spawn_debouncer::<u32>(Duration::from_millis(300));

    tx.send(1).unwrap();
    tx.send(2).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(3).unwrap();

    let started = tokio::time::Instant::now();
    assert_eq!(rx.recv().await, Some(3));
    assert!(started.elapsed() >= Duration::from_millis(300));

    tx.send(4).unwrap();
    drop(tx);
    assert_eq!(rx.recv().await, Some(4));
    assert_eq!(rx.recv().await, None);
}
