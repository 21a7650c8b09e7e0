//! Terminal adapter for the lookup controller.

use inquire::{
    CustomUserError,
    autocompletion::{Autocomplete, Replacement},
};
use lookup_core::{CityCandidate, Controller, ForecastView, SuggestionRow, View};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What a submitted line refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
    Suggestion(CityCandidate),
    History(String),
    Typed(String),
}

#[derive(Debug, Default)]
struct Screen {
    input: String,
    suggestions: Vec<SuggestionRow>,
    suggestions_visible: bool,
    history: Vec<String>,
    history_visible: bool,
    last_error: Option<String>,
}

/// `View` that keeps panel state for the prompt and prints results.
///
/// Suggestions are only read by the prompt's autocompletion; one-shot mode
/// additionally reports an empty history.
#[derive(Debug)]
pub struct TerminalView {
    screen: Mutex<Screen>,
    one_shot: bool,
}

impl TerminalView {
    pub fn interactive() -> Self {
        Self { screen: Mutex::new(Screen::default()), one_shot: false }
    }

    pub fn one_shot() -> Self {
        Self { screen: Mutex::new(Screen::default()), one_shot: true }
    }

    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rows offered by the prompt: open suggestions first, otherwise history.
    pub fn rows(&self) -> Vec<String> {
        let screen = self.screen();
        if screen.suggestions_visible {
            screen.suggestions.iter().map(|row| row.label.clone()).collect()
        } else if screen.history_visible {
            screen.history.clone()
        } else {
            Vec::new()
        }
    }

    /// Map a submitted line back to the row it came from, if any.
    pub fn resolve(&self, answer: &str) -> Choice {
        let screen = self.screen();
        if screen.suggestions_visible {
            if let Some(row) = screen.suggestions.iter().find(|row| row.label == answer) {
                return Choice::Suggestion(row.candidate.clone());
            }
        }
        if screen.history_visible && screen.history.iter().any(|city| city == answer) {
            return Choice::History(answer.to_string());
        }
        Choice::Typed(answer.to_string())
    }

    pub fn input(&self) -> String {
        self.screen().input.clone()
    }

    pub fn take_error(&self) -> Option<String> {
        self.screen().last_error.take()
    }
}

impl View for TerminalView {
    fn set_input(&self, text: &str) {
        self.screen().input = text.to_string();
    }

    fn show_suggestions(&self, rows: Vec<SuggestionRow>) {
        let mut screen = self.screen();
        screen.suggestions = rows;
        screen.suggestions_visible = true;
    }

    fn hide_suggestions(&self) {
        self.screen().suggestions_visible = false;
    }

    fn show_forecast(&self, forecast: ForecastView) {
        println!();
        println!("{}", forecast.city_label);
        for entry in &forecast.entries {
            println!("  {:<8} {}", entry.time, entry.reading);
        }
        println!();
    }

    fn show_history(&self, entries: Vec<String>) {
        println!("History: {}", entries.join(" | "));
        let mut screen = self.screen();
        screen.history = entries;
        screen.history_visible = true;
    }

    fn hide_history(&self) {
        if self.one_shot {
            println!("No search history yet.");
        }
        self.screen().history_visible = false;
    }

    fn notify_error(&self, message: &str) {
        eprintln!("error: {message}");
        self.screen().last_error = Some(message.to_string());
    }
}

/// Feeds prompt keystrokes to the controller and offers whatever the panels hold.
#[derive(Debug, Clone)]
pub struct LiveSuggestions {
    controller: Controller,
    view: Arc<TerminalView>,
}

impl LiveSuggestions {
    pub fn new(controller: Controller, view: Arc<TerminalView>) -> Self {
        Self { controller, view }
    }
}

impl Autocomplete for LiveSuggestions {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        self.controller.on_input(input);
        Ok(self.view.rows())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        // Completing a suggestion fills in the bare city name.
        Ok(highlighted_suggestion.map(|label| match self.view.resolve(&label) {
            Choice::Suggestion(candidate) => candidate.name,
            Choice::History(city) | Choice::Typed(city) => city,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(candidate: CityCandidate) -> SuggestionRow {
        SuggestionRow { label: candidate.label(), candidate }
    }

    #[test]
    fn rows_prefer_open_suggestions() {
        let view = TerminalView::interactive();
        assert!(view.rows().is_empty());

        view.show_history(vec!["Oslo".into()]);
        assert_eq!(view.rows(), ["Oslo"]);

        view.show_suggestions(vec![row(CityCandidate::new("Paris").with_country("France"))]);
        assert_eq!(view.rows(), ["Paris, France"]);

        view.hide_suggestions();
        assert_eq!(view.rows(), ["Oslo"]);
    }

    #[test]
    fn resolve_maps_labels_back_to_candidates() {
        let view = TerminalView::interactive();
        let paris = CityCandidate::new("Paris").with_country("France");
        view.show_suggestions(vec![row(paris.clone())]);
        view.show_history(vec!["Oslo".into()]);

        assert_eq!(view.resolve("Paris, France"), Choice::Suggestion(paris));
        assert_eq!(view.resolve("Oslo"), Choice::History("Oslo".into()));
        assert_eq!(view.resolve("Rome"), Choice::Typed("Rome".into()));
    }

    #[test]
    fn hidden_suggestions_do_not_resolve() {
        let view = TerminalView::interactive();
        view.show_suggestions(vec![row(CityCandidate::new("Paris").with_country("France"))]);
        view.hide_suggestions();

        assert_eq!(view.resolve("Paris, France"), Choice::Typed("Paris, France".into()));
    }

    #[test]
    fn errors_are_kept_until_taken() {
        let view = TerminalView::one_shot();
        view.notify_error("City not found");
        assert_eq!(view.take_error().as_deref(), Some("City not found"));
        assert_eq!(view.take_error(), None);
    }
}
