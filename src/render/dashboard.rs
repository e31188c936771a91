// Dashboard composition: loader, coordinator, debouncer and renderer
// Author: Gabriel Demetrios Lafis

use std::cell::{Ref, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use log::{error, info};

use crate::data::{CsvSink, DataSink, DataSource, DatasetLoader};
use crate::processing::{ChartPipeline, FilterState, FilterUpdate};
use crate::state::{
    DashboardState, EventKind, FilterDebouncer, ObserverError, RequestToken, StateCoordinator,
    StateEvent, SubscriptionId,
};
use crate::utils::{Config, DashboardError};
use super::ChartRenderer;

/// The dashboard as a whole.
///
/// Owns every component; the renderer is subscribed to the coordinator so
/// that chart data reaches it after each load, filter change or reset.
pub struct Dashboard<R: ChartRenderer + 'static> {
    coordinator: StateCoordinator,
    renderer: Rc<RefCell<R>>,
    loader: DatasetLoader,
    debouncer: FilterDebouncer<FilterState>,
    desired: FilterState,
    render_subscription: SubscriptionId,
}

impl<R: ChartRenderer + 'static> Dashboard<R> {
    /// Create a new dashboard drawing through `renderer`
    pub fn new(config: &Config, renderer: R) -> Self {
        let pipeline = ChartPipeline::standard(&config.charts);
        let mut coordinator = StateCoordinator::with_filters(pipeline, config.filters.clone());

        let renderer = Rc::new(RefCell::new(renderer));
        let target = Rc::clone(&renderer);
        let render_subscription = coordinator.subscribe(None, move |event, state| {
            let mut renderer = target
                .try_borrow_mut()
                .map_err(|_| ObserverError::new("renderer is busy"))?;
            push_charts(&mut *renderer, event, state)
        });

        Dashboard {
            coordinator,
            renderer,
            loader: DatasetLoader::new().with_min_rows_warning(config.data.min_rows_warning),
            debouncer: FilterDebouncer::new(config.debounce.delay()),
            desired: config.filters.clone(),
            render_subscription,
        }
    }

    pub fn coordinator(&self) -> &StateCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut StateCoordinator {
        &mut self.coordinator
    }

    pub fn renderer(&self) -> Ref<'_, R> {
        self.renderer.borrow()
    }

    pub fn render_subscription(&self) -> SubscriptionId {
        self.render_subscription
    }

    /// Load a dataset and draw every chart.
    ///
    /// On failure the error is recorded in the UI state and returned.
    pub fn load(&mut self, source: &dyn DataSource) -> Result<(), DashboardError> {
        self.coordinator.set_loading(true, Some("Loading weather data..."));

        let dataset = match self.loader.load(source) {
            Ok(dataset) => dataset,
            Err(err) => {
                let err = DashboardError::from(err);
                error!("Failed to load weather data from {}: {}", source.name(), err);
                self.coordinator.set_loading(false, None);
                self.coordinator.set_error(&err.to_string());
                return Err(err);
            },
        };

        info!("Weather data loaded from {}: {} records", source.name(), dataset.len());

        if self.coordinator.state().ui.error.is_some() {
            self.coordinator.clear_error();
        }
        self.coordinator.set_dataset(dataset);

        // The new dataset arrives unfiltered; bring the view back in line
        // with the filters already in place
        let result = if self.coordinator.filters().is_default() {
            Ok(())
        } else {
            let update = FilterUpdate::replace_with(self.coordinator.filters());
            self.coordinator.update_filters(&update)
        };
        self.desired = self.coordinator.filters().clone();
        self.coordinator.set_loading(false, None);

        if let Err(err) = result {
            let err = DashboardError::from(err);
            error!("Failed to filter weather data from {}: {}", source.name(), err);
            self.coordinator.set_error(&err.to_string());
            return Err(err);
        }

        Ok(())
    }

    /// Queue a filter change; it is applied by `poll` once input settles
    pub fn request_filter_change(&mut self, update: &FilterUpdate, now: Instant) -> Result<RequestToken, DashboardError> {
        self.desired = self.desired.merged(update)?;
        Ok(self.debouncer.submit(self.desired.clone(), now))
    }

    /// Apply the pending filter change if its quiet period is over.
    ///
    /// Returns whether filters were applied.
    pub fn poll(&mut self, now: Instant) -> Result<bool, DashboardError> {
        let filters = match self.debouncer.take_ready(now) {
            Some((_, filters)) => filters,
            None => return Ok(false),
        };

        self.coordinator.update_filters(&FilterUpdate::replace_with(&filters))?;
        Ok(true)
    }

    /// When the pending filter change becomes ready, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Apply a filter change immediately, dropping any pending request
    pub fn apply_filters_now(&mut self, update: &FilterUpdate) -> Result<(), DashboardError> {
        self.debouncer.cancel();
        self.desired = self.desired.merged(update)?;
        self.coordinator.update_filters(&FilterUpdate::replace_with(&self.desired))?;
        Ok(())
    }

    /// Back to default filters and UI; the dataset is kept
    pub fn reset(&mut self) {
        self.debouncer.cancel();
        self.coordinator.reset();
        self.desired = self.coordinator.filters().clone();
    }

    /// Write the filtered records as CSV; returns the number of rows
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize, DashboardError> {
        let records = self.coordinator.filtered_records();
        CsvSink::new(path.as_ref(), ',').write(records)?;

        info!("{} weather records exported to {}", records.len(), path.as_ref().display());
        Ok(records.len())
    }

    pub fn export_state(&self) -> Result<String, DashboardError> {
        Ok(self.coordinator.export_state()?)
    }

    pub fn import_state(&mut self, json: &str) -> Result<(), DashboardError> {
        self.debouncer.cancel();
        self.coordinator.import_state(json)?;
        self.desired = self.coordinator.filters().clone();
        Ok(())
    }

    pub fn report(&self) -> String {
        self.coordinator.report()
    }
}

/// Hand the prepared charts of `state` to the renderer
fn push_charts<R: ChartRenderer + ?Sized>(
    renderer: &mut R,
    event: &StateEvent,
    state: &DashboardState,
) -> Result<(), ObserverError> {
    let redraw = match event.kind() {
        EventKind::Dataset | EventKind::Reset => false,
        EventKind::Charts => true,
        _ => return Ok(()),
    };

    let mut failures = Vec::new();

    for output in &state.charts.outputs {
        let result = match &output.result {
            Ok(data) if redraw => renderer.update(&output.container_id, data, output.kind),
            Ok(data) => renderer.render(&output.container_id, data, output.kind),
            Err(_) => renderer.clear(&output.container_id),
        };

        if let Err(err) = result {
            failures.push(format!("{}: {}", output.container_id, err));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ObserverError::new(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::data::{MemorySource, SyntheticSource};
    use crate::processing::Selection;
    use crate::render::{MockChartRenderer, RenderError};

    fn counting_renderer(renders: Arc<AtomicUsize>, updates: Arc<AtomicUsize>) -> MockChartRenderer {
        let mut renderer = MockChartRenderer::new();
        renderer.expect_render().returning(move |_, _, _| {
            renders.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        renderer.expect_update().returning(move |_, _, _| {
            updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        renderer.expect_clear().returning(|_| Ok(()));
        renderer
    }

    #[test]
    fn test_load_renders_every_prepared_chart() {
        let renders = Arc::new(AtomicUsize::new(0));
        let updates = Arc::new(AtomicUsize::new(0));
        let renderer = counting_renderer(renders.clone(), updates.clone());

        let mut dashboard = Dashboard::new(&Config::default(), renderer);
        dashboard.load(&SyntheticSource::new(7, 200)).unwrap();

        let prepared = dashboard.coordinator().charts().successes().count();
        assert!(prepared > 0);
        assert_eq!(renders.load(Ordering::SeqCst), prepared);
        assert_eq!(updates.load(Ordering::SeqCst), 0);
        assert!(!dashboard.coordinator().state().ui.is_loading);
    }

    #[test]
    fn test_filter_change_is_debounced() {
        let renders = Arc::new(AtomicUsize::new(0));
        let updates = Arc::new(AtomicUsize::new(0));
        let renderer = counting_renderer(renders, updates.clone());

        let mut dashboard = Dashboard::new(&Config::default(), renderer);
        dashboard.load(&SyntheticSource::new(7, 200)).unwrap();

        let start = Instant::now();
        dashboard.request_filter_change(&FilterUpdate::default().month(Selection::Only(3)), start).unwrap();
        dashboard
            .request_filter_change(&FilterUpdate::default().show_outliers(false), start + Duration::from_millis(100))
            .unwrap();

        assert!(!dashboard.poll(start + Duration::from_millis(200)).unwrap());
        assert_eq!(updates.load(Ordering::SeqCst), 0);

        assert!(dashboard.poll(start + Duration::from_millis(450)).unwrap());
        let filters = dashboard.coordinator().filters();
        assert_eq!(filters.month, Selection::Only(3));
        assert!(!filters.show_outliers);
        assert!(updates.load(Ordering::SeqCst) > 0);

        assert!(!dashboard.poll(start + Duration::from_millis(900)).unwrap());
    }

    #[test]
    fn test_renderer_failure_does_not_fail_load() {
        let mut renderer = MockChartRenderer::new();
        renderer
            .expect_render()
            .returning(|id, _, _| Err(RenderError::UnknownContainer(id.to_string())));
        renderer.expect_clear().returning(|_| Ok(()));

        let mut dashboard = Dashboard::new(&Config::default(), renderer);
        assert!(dashboard.load(&SyntheticSource::new(3, 150)).is_ok());
        assert_eq!(dashboard.coordinator().filtered_records().len(), 150);
    }

    #[test]
    fn test_failed_load_records_error() {
        let renderer = MockChartRenderer::new();
        let mut dashboard = Dashboard::new(&Config::default(), renderer);

        let err = dashboard.load(&MemorySource::new("empty", Vec::new())).unwrap_err();
        assert!(err.is_retryable());
        assert!(dashboard.coordinator().state().ui.error.is_some());
        assert!(dashboard.coordinator().dataset().is_none());
    }

    #[test]
    fn test_reload_keeps_filtered_view_in_sync() {
        let renderer = counting_renderer(Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let mut dashboard = Dashboard::new(&Config::default(), renderer);
        dashboard.load(&SyntheticSource::new(5, 300)).unwrap();

        dashboard.apply_filters_now(&FilterUpdate::default().month(Selection::Only(3))).unwrap();
        let filtered = dashboard.coordinator().filtered_records().len();
        assert!(filtered < 300);

        dashboard.load(&SyntheticSource::new(5, 300)).unwrap();

        let coordinator = dashboard.coordinator();
        assert_eq!(coordinator.filters().month, Selection::Only(3));
        assert_eq!(coordinator.filtered_records().len(), filtered);
        assert!(coordinator.filtered_records().iter().all(|r| r.month == Some(3.0)));
        assert_eq!(coordinator.stats().filtered_size, filtered);
    }

    #[test]
    fn test_invalid_configured_filters_end_loading_with_error() {
        let mut config = Config::default();
        config.filters.month = Selection::Only(13);
        assert!(config.validate().is_err());

        let renderer = counting_renderer(Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let mut dashboard = Dashboard::new(&config, renderer);

        assert!(dashboard.load(&SyntheticSource::new(5, 120)).is_err());
        let ui = &dashboard.coordinator().state().ui;
        assert!(!ui.is_loading);
        assert!(ui.error.is_some());
    }

    #[test]
    fn test_reset_cancels_pending_request() {
        let renderer = counting_renderer(Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let mut dashboard = Dashboard::new(&Config::default(), renderer);
        dashboard.load(&SyntheticSource::new(11, 120)).unwrap();

        let start = Instant::now();
        dashboard.request_filter_change(&FilterUpdate::default().month(Selection::Only(5)), start).unwrap();
        dashboard.reset();

        assert!(dashboard.next_deadline().is_none());
        assert!(!dashboard.poll(start + Duration::from_secs(1)).unwrap());
        assert!(dashboard.coordinator().filters().is_default());
    }
}
