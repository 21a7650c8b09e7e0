//! Pure conversion from API payloads to what a [`View`](crate::View) displays.
//!
//! Nothing here touches a UI; adapters only receive the values built here.

use crate::model::{CityCandidate, CityStat, ForecastResponse, HistoryResponse, SearchResponse};

/// What to do with a list panel after a response arrives.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelUpdate<T> {
    /// Replace the panel content with these rows and make it visible.
    Show(Vec<T>),
    Hide,
}

impl<T> PanelUpdate<T> {
    fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() { PanelUpdate::Hide } else { PanelUpdate::Show(rows) }
    }
}

/// One row of the suggestions panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRow {
    pub label: String,
    pub candidate: CityCandidate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub time: String,
    pub reading: String,
}

/// Rendered results section.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastView {
    pub city_label: String,
    pub entries: Vec<ForecastEntry>,
}

pub fn suggestions(response: &SearchResponse) -> PanelUpdate<SuggestionRow> {
    let rows = response
        .cities
        .iter()
        .flatten()
        .map(|candidate| SuggestionRow { label: candidate.label(), candidate: candidate.clone() })
        .collect();

    PanelUpdate::from_rows(rows)
}

pub fn history(response: &HistoryResponse) -> PanelUpdate<String> {
    PanelUpdate::from_rows(response.history.clone().unwrap_or_default())
}

pub fn forecast(response: &ForecastResponse) -> ForecastView {
    ForecastView {
        city_label: response.city.label(),
        entries: response
            .forecast
            .iter()
            .map(|point| ForecastEntry { time: point.time.clone(), reading: point.reading() })
            .collect(),
    }
}

pub fn stats(stats: &[CityStat]) -> Vec<String> {
    stats.iter().map(|s| format!("{}: {}", s.city, s.count)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastPoint;

    #[test]
    fn suggestions_render_labels_in_order() {
        let response = SearchResponse {
            cities: Some(vec![
                CityCandidate::new("Paris").with_country("France"),
                CityCandidate::new("Paris").with_admin1("Texas").with_country("United States"),
            ]),
        };

        let PanelUpdate::Show(rows) = suggestions(&response) else {
            panic!("expected visible panel");
        };
        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Paris, France", "Paris, Texas, United States"]);
        assert_eq!(rows[1].candidate.name, "Paris");
    }

    #[test]
    fn empty_or_missing_cities_hide_panel() {
        assert_eq!(suggestions(&SearchResponse { cities: Some(vec![]) }), PanelUpdate::Hide);
        assert_eq!(suggestions(&SearchResponse { cities: None }), PanelUpdate::Hide);
    }

    #[test]
    fn history_keeps_server_order_and_duplicates() {
        let response = HistoryResponse {
            history: Some(vec!["Rome".into(), "Oslo".into(), "Rome".into()]),
        };
        assert_eq!(
            history(&response),
            PanelUpdate::Show(vec!["Rome".into(), "Oslo".into(), "Rome".into()])
        );
        assert_eq!(history(&HistoryResponse { history: Some(vec![]) }), PanelUpdate::Hide);
        assert_eq!(history(&HistoryResponse::default()), PanelUpdate::Hide);
    }

    #[test]
    fn forecast_entries_split_time_and_reading() {
        let response = ForecastResponse {
            city: CityCandidate::new("Paris").with_admin1("Île-de-France").with_country("France"),
            forecast: vec![
                ForecastPoint { time: "12:00".into(), temperature: 20.0, unit: "°C".into() },
                ForecastPoint { time: "13:00".into(), temperature: 21.4, unit: "°C".into() },
            ],
        };

        let view = forecast(&response);
        assert_eq!(view.city_label, "Paris, Île-de-France, France");
        assert_eq!(
            view.entries,
            vec![
                ForecastEntry { time: "12:00".into(), reading: "20°C".into() },
                ForecastEntry { time: "13:00".into(), reading: "21.4°C".into() },
            ]
        );
    }

    #[test]
    fn stats_lines() {
        let lines = stats(&[CityStat { city: "Moscow".into(), count: 3 }]);
        assert_eq!(lines, ["Moscow: 3"]);
    }
}
