use crate::render::{ForecastView, SuggestionRow};

/// UI adapter driven by the [`Controller`](crate::Controller).
///
/// Implementations only mutate whatever surface they own; every decision about
/// what to show is made before these methods are called.
pub trait View: Send + Sync {
    /// Replace the text of the city input.
    fn set_input(&self, text: &str);

    /// Replace the suggestions panel content and make it visible.
    fn show_suggestions(&self, rows: Vec<SuggestionRow>);

    fn hide_suggestions(&self);

    /// Fill the results section and make it visible.
    fn show_forecast(&self, forecast: ForecastView);

    /// Replace the history panel content and make it visible.
    fn show_history(&self, entries: Vec<String>);

    fn hide_history(&self);

    /// Present a user-facing error without blocking.
    fn notify_error(&self, message: &str);
}
