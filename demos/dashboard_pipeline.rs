// Dashboard pipeline example
// Author: Gabriel Demetrios Lafis

use std::time::{Duration, Instant};

use weather_dashboard_engine::{
    data::SyntheticSource,
    processing::{ChartKind, FilterUpdate, Selection},
    render::{Dashboard, FileRenderer},
    state::EventKind,
    utils::{init_logging, Config},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    init_logging(config.log_level_filter(), None)?;

    let out_dir = std::env::temp_dir().join("weather-dashboard-demo");
    let mut dashboard = Dashboard::new(&config, FileRenderer::new(&out_dir)?);

    // Print every filter change as it is applied
    dashboard.coordinator_mut().subscribe(Some(EventKind::Filters), |event, state| {
        println!("-> {:?}: {} records in view", event.kind(), state.filtered.len());
        Ok(())
    });

    dashboard.load(&SyntheticSource::new(42, 1_000))?;

    let stats = dashboard.coordinator().weather_stats();
    println!("Countries: {}", stats.total_countries);
    println!("Average temperature: {:.1}°C", stats.avg_temperature);
    println!("Average humidity: {:.1}%", stats.avg_humidity);

    // A burst of changes collapses into the last one
    let start = Instant::now();
    dashboard.request_filter_change(&FilterUpdate::default().month(Selection::Only(1)), start)?;
    dashboard.request_filter_change(&FilterUpdate::default().month(Selection::Only(7)), start + Duration::from_millis(100))?;
    dashboard.request_filter_change(
        &FilterUpdate::default().country(Selection::Only("Japan".to_string())),
        start + Duration::from_millis(150),
    )?;

    if let Some(deadline) = dashboard.next_deadline() {
        dashboard.poll(deadline)?;
    }

    println!("\nActive filters: {}", dashboard.coordinator().filters().describe());

    for (output, data) in dashboard.coordinator().charts().successes() {
        let marker = if data.is_empty() { "empty" } else { "ok" };
        println!("{:<16} {:<10} {}", output.container_id, output.kind, marker);
    }
    println!("Charts written to {}", out_dir.display());

    if ChartKind::ALL.iter().any(|k| dashboard.coordinator().charts().get(*k).is_none()) {
        println!("Some charts could not be prepared, see the log");
    }

    for recommendation in dashboard.coordinator().recommendations() {
        println!("[{:?}] {}", recommendation.kind, recommendation.message);
    }

    println!("\n{}", dashboard.report());

    Ok(())
}
