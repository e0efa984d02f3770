// src/viewer.rs
//! Controller for the fetch/render loop.
//!
//! `Viewer` holds all display state and hands back the futures the UI
//! runtime should run. It never spawns anything itself, which keeps every
//! state change inside the single-threaded update loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::cloud_handler::SheetsApi;
use crate::config::{ViewerConfig, POLL_INTERVAL};
use crate::data_types::Table;
use crate::errors::SheetError;
use crate::poller::{Poller, TickOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    ConfigError,
    Initializing,
    Ready,
    InitFailed,
    ShutDown,
}

#[derive(Debug, Clone, Default)]
pub struct Status {
    pub is_loading: bool,
    pub config_error: Option<SheetError>,
    pub init_error: Option<SheetError>,
    pub fetch_error: Option<SheetError>,
    pub last_update: Option<DateTime<Local>>,
    pub client_ready: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub table: Option<Table>,
    pub status: Status,
}

pub struct Viewer<A> {
    config: Option<Arc<ViewerConfig>>,
    api: Option<A>,
    poller: Poller,
    phase: Phase,
    display: DisplayState,
}

impl<A: SheetsApi> Viewer<A> {
    pub fn new(config: Result<ViewerConfig, SheetError>) -> Self {
        let mut display = DisplayState::default();
        let (config, phase, period) = match config {
            Ok(config) => {
                let period = config.poll_interval;
                (Some(config.shared()), Phase::Uninitialized, period)
            }
            Err(err) => {
                tracing::error!(kind = ?err.kind(), error = %err, "configuration error");
                display.status.config_error = Some(err);
                (None, Phase::ConfigError, POLL_INTERVAL)
            }
        };

        Viewer {
            config,
            api: None,
            poller: Poller::new(period),
            phase,
            display,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_polling()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poller.period()
    }

    /// Load and initialize the client. Returns `None`, and touches no
    /// network, unless the viewer is freshly configured.
    pub fn mount(
        &mut self,
        api: A,
    ) -> Option<impl Future<Output = Result<A, SheetError>> + Send + 'static> {
        if self.phase != Phase::Uninitialized {
            return None;
        }
        let config = Arc::clone(self.config.as_ref()?);
        self.phase = Phase::Initializing;

        Some(async move {
            let api = api.load_client().await?;
            api.init_client(config).await
        })
    }

    /// Apply the outcome of [`Viewer::mount`]. On success, polling starts
    /// and the first fetch is returned.
    pub fn client_initialized(
        &mut self,
        result: Result<A, SheetError>,
    ) -> Option<impl Future<Output = Result<Table, SheetError>> + Send + 'static> {
        if self.phase != Phase::Initializing {
            return None;
        }

        match result {
            Ok(api) => {
                tracing::info!("sheets client ready");
                self.api = Some(api);
                self.phase = Phase::Ready;
                self.display.status.client_ready = true;
                match self.poller.start() {
                    TickOutcome::Fetch => self.begin_fetch(),
                    TickOutcome::Skipped | TickOutcome::Inactive => None,
                }
            }
            Err(err) => {
                tracing::error!(kind = ?err.kind(), detail = err.detail().unwrap_or_default(), "client initialization failed");
                self.phase = Phase::InitFailed;
                self.display.status.init_error = Some(err);
                None
            }
        }
    }

    pub fn tick(
        &mut self,
    ) -> Option<impl Future<Output = Result<Table, SheetError>> + Send + 'static> {
        match self.poller.tick() {
            TickOutcome::Fetch => self.begin_fetch(),
            TickOutcome::Skipped => {
                tracing::debug!("fetch still in flight, skipping tick");
                None
            }
            TickOutcome::Inactive => None,
        }
    }

    fn begin_fetch(
        &mut self,
    ) -> Option<impl Future<Output = Result<Table, SheetError>> + Send + 'static> {
        let (api, config) = match (self.api.clone(), self.config.as_ref()) {
            (Some(api), Some(config)) => (api, config),
            _ => {
                self.poller.finish(true);
                return None;
            }
        };

        self.display.status.is_loading = true;
        self.display.status.fetch_error = None;
        Some(api.fetch_range(config.spreadsheet_id.clone(), config.range.clone()))
    }

    /// Apply a fetch result. Results arriving after shutdown still land.
    pub fn fetch_finished(&mut self, result: Result<Table, SheetError>) {
        self.poller.finish(result.is_ok());
        self.display.status.is_loading = false;

        match result {
            Ok(table) => {
                tracing::info!(range = %table.range, rows = table.values.len(), "sheet data updated");
                self.display.table = Some(table);
                self.display.status.last_update = Some(Local::now());
            }
            Err(err) => {
                tracing::error!(
                    kind = ?err.kind(),
                    detail = err.detail().unwrap_or_default(),
                    poller = ?self.poller.state(),
                    "fetching sheet data failed"
                );
                self.display.status.fetch_error = Some(err);
            }
        }
    }

    /// Stop polling and drop the client.
    pub fn shutdown(&mut self) {
        self.poller.cancel();
        self.api = None;
        self.display.status.client_ready = false;
        self.phase = Phase::ShutDown;
    }
}

/// "Never" before the first successful fetch, else the local time.
pub fn format_last_update(last_update: Option<DateTime<Local>>) -> String {
    match last_update {
        Some(at) => at.format("%X").to_string(),
        None => "Never".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::display::{render_sheet, render_status, SheetView};
    use crate::poller::PollState;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory client that counts every call.
    #[derive(Clone, Default)]
    struct MockSheets {
        loads: Arc<AtomicUsize>,
        inits: Arc<AtomicUsize>,
        fetches: Arc<AtomicUsize>,
        fail_init: bool,
        responses: Arc<Mutex<VecDeque<Result<Table, SheetError>>>>,
    }

    impl MockSheets {
        fn with_responses(responses: Vec<Result<Table, SheetError>>) -> Self {
            MockSheets {
                responses: Arc::new(Mutex::new(responses.into())),
                ..MockSheets::default()
            }
        }

        fn network_calls(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
                + self.inits.load(Ordering::SeqCst)
                + self.fetches.load(Ordering::SeqCst)
        }
    }

    impl SheetsApi for MockSheets {
        fn load_client(self) -> impl Future<Output = Result<Self, SheetError>> + Send {
            async move {
                self.loads.fetch_add(1, Ordering::SeqCst);
                Ok(self)
            }
        }

        fn init_client(
            self,
            _config: Arc<ViewerConfig>,
        ) -> impl Future<Output = Result<Self, SheetError>> + Send {
            async move {
                self.inits.fetch_add(1, Ordering::SeqCst);
                if self.fail_init {
                    Err(SheetError::client_init("bad key"))
                } else {
                    Ok(self)
                }
            }
        }

        fn fetch_range(
            self,
            _spreadsheet_id: String,
            _range: String,
        ) -> impl Future<Output = Result<Table, SheetError>> + Send {
            async move {
                self.fetches.fetch_add(1, Ordering::SeqCst);
                self.responses
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Ok(Table::default()))
            }
        }
    }

    fn valid_config() -> Result<ViewerConfig, SheetError> {
        AppConfig {
            api_key: Some("key".into()),
            sheet_id: Some("sheet".into()),
            dark: false,
        }
        .viewer_config()
    }

    fn sample_table() -> Table {
        Table {
            range: "Sheet1!A1:B2".into(),
            values: vec![vec![json!("A"), json!("B")], vec![json!("1"), json!("2")]],
        }
    }

    async fn ready_viewer(api: MockSheets) -> Viewer<MockSheets> {
        let mut viewer = Viewer::new(valid_config());
        let init = viewer.mount(api).expect("mount should start init");
        let first = viewer
            .client_initialized(init.await)
            .expect("first fetch");
        viewer.fetch_finished(first.await);
        viewer
    }

    fn visible_errors(viewer: &Viewer<MockSheets>) -> usize {
        let display = viewer.display();
        let sheet = render_sheet(
            display.table.as_ref(),
            display.status.is_loading,
            display.status.fetch_error.as_ref(),
        );
        let status = render_status(&display.status);
        usize::from(matches!(sheet, SheetView::Error(_))) + usize::from(status.banner.is_some())
    }

    #[tokio::test]
    async fn successful_fetch_renders_table() {
        let api = MockSheets::with_responses(vec![Ok(sample_table())]);
        let viewer = ready_viewer(api.clone()).await;

        assert_eq!(viewer.phase(), Phase::Ready);
        assert!(viewer.is_polling());
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);

        let display = viewer.display();
        assert!(display.status.client_ready);
        assert!(!display.status.is_loading);
        assert!(display.status.last_update.is_some());
        match render_sheet(display.table.as_ref(), false, None) {
            SheetView::Table(layout) => {
                assert_eq!(layout.headers, vec!["A", "B"]);
                assert_eq!(layout.rows, vec![vec!["1".to_string(), "2".to_string()]]);
            }
            other => panic!("expected a table, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_values_show_placeholder() {
        let empty = Table {
            range: "Sheet1!A1:Z1000".into(),
            values: Vec::new(),
        };
        let viewer = ready_viewer(MockSheets::with_responses(vec![Ok(empty)])).await;
        let display = viewer.display();
        assert!(display.table.as_ref().unwrap().is_empty());
        assert_eq!(
            render_sheet(display.table.as_ref(), false, None),
            SheetView::NoData
        );
    }

    #[tokio::test]
    async fn failure_stops_polling() {
        let api = MockSheets::with_responses(vec![Err(SheetError::fetch("403"))]);
        let mut viewer = ready_viewer(api.clone()).await;

        assert!(!viewer.is_polling());
        assert_eq!(visible_errors(&viewer), 1);

        // Two more periods elapse.
        assert!(viewer.tick().is_none());
        assert!(viewer.tick().is_none());
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(visible_errors(&viewer), 1);
    }

    #[tokio::test]
    async fn failure_keeps_previous_table() {
        let api = MockSheets::with_responses(vec![Ok(sample_table()), Err(SheetError::fetch("403"))]);
        let mut viewer = ready_viewer(api).await;
        let second = viewer.tick().expect("second fetch");
        viewer.fetch_finished(second.await);

        let display = viewer.display();
        assert_eq!(display.table, Some(sample_table()));
        assert!(matches!(
            render_sheet(display.table.as_ref(), false, display.status.fetch_error.as_ref()),
            SheetView::Error(_)
        ));
    }

    #[tokio::test]
    async fn one_fetch_in_flight() {
        let api = MockSheets::with_responses(vec![Ok(sample_table()), Ok(sample_table())]);
        let mut viewer = Viewer::new(valid_config());
        let init = viewer.mount(api.clone()).unwrap();
        let first = viewer.client_initialized(init.await).unwrap();

        assert!(viewer.poller.in_flight());
        assert!(viewer.display().status.is_loading);
        assert!(viewer.tick().is_none());
        assert!(viewer.tick().is_none());

        viewer.fetch_finished(first.await);
        assert!(!viewer.poller.in_flight());

        let second = viewer.tick().expect("tick after completion fetches");
        assert!(viewer.tick().is_none());
        viewer.fetch_finished(second.await);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_key_makes_no_calls() {
        let api = MockSheets::default();
        let config = AppConfig {
            api_key: None,
            sheet_id: Some("sheet".into()),
            dark: false,
        }
        .viewer_config();
        let mut viewer = Viewer::new(config);

        assert_eq!(viewer.phase(), Phase::ConfigError);
        assert!(viewer.mount(api.clone()).is_none());
        assert!(viewer.tick().is_none());
        assert_eq!(api.network_calls(), 0);

        let status = render_status(&viewer.display().status);
        assert_eq!(
            status.banner.as_deref(),
            Some("Missing API key. Please check your environment variables.")
        );
        assert_eq!(visible_errors(&viewer), 1);
    }

    #[tokio::test]
    async fn init_failure_is_final() {
        let api = MockSheets {
            fail_init: true,
            ..MockSheets::default()
        };
        let mut viewer = Viewer::new(valid_config());
        let init = viewer.mount(api.clone()).unwrap();
        assert_eq!(viewer.phase(), Phase::Initializing);
        assert!(viewer.client_initialized(init.await).is_none());

        assert_eq!(viewer.phase(), Phase::InitFailed);
        assert!(!viewer.display().status.client_ready);
        assert!(viewer.tick().is_none());
        assert!(viewer.mount(api.clone()).is_none());
        assert_eq!(api.loads.load(Ordering::SeqCst), 1);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(visible_errors(&viewer), 1);
    }

    #[tokio::test]
    async fn shutdown_cancels_polling() {
        let api = MockSheets::with_responses(vec![Ok(sample_table())]);
        let mut viewer = ready_viewer(api.clone()).await;
        viewer.shutdown();

        assert_eq!(viewer.phase(), Phase::ShutDown);
        assert!(!viewer.is_polling());
        assert!(viewer.tick().is_none());
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn late_result_after_shutdown_applies() {
        let api = MockSheets::with_responses(vec![Ok(sample_table())]);
        let mut viewer = Viewer::new(valid_config());
        let init = viewer.mount(api).unwrap();
        let first = viewer.client_initialized(init.await).unwrap();
        viewer.shutdown();
        viewer.fetch_finished(first.await);

        assert_eq!(viewer.display().table, Some(sample_table()));
        assert!(!viewer.is_polling());
        assert!(!viewer.poller.in_flight());
    }

    #[test]
    fn stop_state_is_reported() {
        let mut viewer: Viewer<MockSheets> = Viewer::new(valid_config());
        assert_eq!(viewer.phase(), Phase::Uninitialized);
        assert_eq!(viewer.poll_interval(), Duration::from_secs(60));
        viewer.shutdown();
        assert!(viewer.tick().is_none());
        assert_eq!(viewer.poller.state(), PollState::Cancelled);
    }

    #[test]
    fn last_update_formatting() {
        assert_eq!(format_last_update(None), "Never");
        let formatted = format_last_update(Some(Local::now()));
        assert!(!formatted.is_empty());
        assert_ne!(formatted, "Never");
    }
}
