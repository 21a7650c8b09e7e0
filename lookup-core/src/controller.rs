use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::runtime::Handle;
use tracing::{debug, error, instrument, warn};

use crate::{
    Config,
    api::{ApiError, WeatherApi},
    debounce::Debouncer,
    model::{CityCandidate, HistoryResponse, SearchResponse},
    render::{self, PanelUpdate},
    view::View,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Quiet period before a suggestion fetch is sent.
    pub debounce: Duration,
    /// Shortest trimmed input (in characters) that triggers suggestions.
    pub min_query_chars: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ControllerOptions {
    fn from(config: &Config) -> Self {
        Self { debounce: config.debounce(), min_query_chars: config.min_query_chars }
    }
}

/// Issues sequence numbers so only the newest response of a kind is applied.
#[derive(Debug, Default)]
struct Latest(AtomicU64);

impl Latest {
    fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, seq: u64) -> bool {
        self.0.load(Ordering::SeqCst) == seq
    }
}

struct Inner {
    api: Arc<dyn WeatherApi>,
    view: Arc<dyn View>,
    debouncer: Debouncer,
    min_query_chars: usize,
    suggestions: Latest,
    history: Latest,
}

/// Autocomplete-and-search controller.
///
/// Cheap to clone; clones share the debounce timer, the API client and the view.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("api", &self.inner.api)
            .field("debounce", &self.inner.debouncer.delay())
            .field("min_query_chars", &self.inner.min_query_chars)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// `runtime` is where debounced fetches run; input handlers may be called
    /// from threads outside it.
    pub fn new(
        api: Arc<dyn WeatherApi>,
        view: Arc<dyn View>,
        options: ControllerOptions,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                view,
                debouncer: Debouncer::new(options.debounce, runtime),
                min_query_chars: options.min_query_chars,
                suggestions: Latest::default(),
                history: Latest::default(),
            }),
        }
    }

    pub fn api(&self) -> &Arc<dyn WeatherApi> {
        &self.inner.api
    }

    /// Page start-up: show whatever history the server already has.
    pub async fn start(&self) {
        self.load_history().await;
    }

    /// Keystroke in the city input.
    pub fn on_input(&self, text: &str) {
        self.inner.debouncer.cancel();

        let query = text.trim();
        if query.chars().count() < self.inner.min_query_chars {
            // A response still in flight must not bring the panel back.
            self.inner.suggestions.issue();
            self.inner.view.hide_suggestions();
            return;
        }

        debug!(query, "scheduling suggestion fetch");
        let this = self.clone();
        let query = query.to_string();
        self.inner.debouncer.schedule(async move { this.fetch_suggestions(&query).await });
    }

    /// Fetch and render suggestions right away, bypassing the debounce timer.
    #[instrument(skip(self))]
    pub async fn fetch_suggestions(&self, query: &str) {
        let seq = self.inner.suggestions.issue();

        let response = match self.inner.api.search(query).await {
            Ok(response) => response,
            // A JSON error body carries no candidates, which closes the panel.
            Err(err @ ApiError::Status { structured: true, .. }) => {
                warn!(error = %err, "search rejected");
                SearchResponse::default()
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch suggestions");
                return;
            }
        };

        if !self.inner.suggestions.is_current(seq) {
            debug!(seq, "dropping stale suggestions");
            return;
        }

        match render::suggestions(&response) {
            PanelUpdate::Show(rows) => self.inner.view.show_suggestions(rows),
            PanelUpdate::Hide => self.inner.view.hide_suggestions(),
        }
    }

    /// Search button or Enter. Blank input is ignored.
    pub async fn submit(&self, text: &str) {
        let city = text.trim();
        if !city.is_empty() {
            self.search(city).await;
        }
    }

    pub async fn select_suggestion(&self, candidate: &CityCandidate) {
        self.inner.view.set_input(&candidate.name);
        self.inner.view.hide_suggestions();
        self.search(&candidate.name).await;
    }

    pub async fn select_history(&self, city: &str) {
        self.inner.view.set_input(city);
        self.search(city).await;
    }

    /// Fetch and show the forecast for `city`, then refresh history.
    #[instrument(skip(self))]
    pub async fn search(&self, city: &str) {
        match self.inner.api.forecast(city).await {
            Ok(response) => {
                self.inner.view.show_forecast(render::forecast(&response));
                self.load_history().await;
            }
            Err(err) => {
                match &err {
                    ApiError::Status { .. } => warn!(error = %err, "forecast rejected"),
                    _ => error!(error = %err, "failed to fetch forecast"),
                }
                self.inner.view.notify_error(&err.user_message());
            }
        }
    }

    pub async fn load_history(&self) {
        let seq = self.inner.history.issue();

        let response = match self.inner.api.history().await {
            Ok(response) => response,
            Err(err @ ApiError::Status { structured: true, .. }) => {
                warn!(error = %err, "history rejected");
                HistoryResponse::default()
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch history");
                return;
            }
        };

        if !self.inner.history.is_current(seq) {
            debug!(seq, "dropping stale history");
            return;
        }

        match render::history(&response) {
            PanelUpdate::Show(entries) => self.inner.view.show_history(entries),
            PanelUpdate::Hide => self.inner.view.hide_history(),
        }
    }

    /// Any click in the document. Only clicks outside the suggestions widget dismiss it.
    pub fn on_click(&self, inside_suggestions: bool) {
        if !inside_suggestions {
            self.inner.view.hide_suggestions();
        }
    }
}
