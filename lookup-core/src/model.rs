use serde::{Deserialize, Serialize};

/// A location suggestion returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCandidate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    // Sent by the server, never displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl CityCandidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin1: None,
            country: None,
            id: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_admin1(mut self, admin1: impl Into<String>) -> Self {
        self.admin1 = Some(admin1.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Display label: `name[, admin1][, country]`, skipping absent or empty parts.
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        for part in [&self.admin1, &self.country].into_iter().flatten() {
            if !part.is_empty() {
                label.push_str(", ");
                label.push_str(part);
            }
        }
        label
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub time: String,
    pub temperature: f64,
    pub unit: String,
}

impl ForecastPoint {
    /// Temperature and unit as one string, e.g. `20°C`.
    pub fn reading(&self) -> String {
        format!("{}{}", self.temperature, self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub city: CityCandidate,
    #[serde(default)]
    pub forecast: Vec<ForecastPoint>,
}

/// Body of `/api/weather/search`. A missing or `null` list means "no candidates".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub cities: Option<Vec<CityCandidate>>,
}

/// Body of `/api/weather/history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Option<Vec<String>>,
}

/// One row of `/api/weather/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityStat {
    pub city: String,
    pub count: u64,
}

/// Structured error body of a non-2xx forecast response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_with_country_only() {
        let city = CityCandidate::new("Paris").with_country("France");
        assert_eq!(city.label(), "Paris, France");
    }

    #[test]
    fn label_with_admin1_and_country() {
        let city = CityCandidate::new("Paris")
            .with_admin1("Île-de-France")
            .with_country("France");
        assert_eq!(city.label(), "Paris, Île-de-France, France");
    }

    #[test]
    fn label_skips_empty_parts() {
        let city = CityCandidate::new("Oslo").with_admin1("").with_country("Norway");
        assert_eq!(city.label(), "Oslo, Norway");
        assert_eq!(CityCandidate::new("Oslo").label(), "Oslo");
    }

    #[test]
    fn reading_uses_shortest_number_form() {
        let whole = ForecastPoint { time: "12:00".into(), temperature: 20.0, unit: "°C".into() };
        let frac = ForecastPoint { time: "13:00".into(), temperature: -3.5, unit: "°C".into() };
        assert_eq!(whole.reading(), "20°C");
        assert_eq!(frac.reading(), "-3.5°C");
    }

    #[test]
    fn candidate_accepts_server_extras() {
        let json = r#"{"id":123,"name":"Москва","latitude":55.75,"longitude":37.61,
                       "country":"Россия","admin1":null}"#;
        let city: CityCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(city.label(), "Москва, Россия");
        assert_eq!(city.id, Some(123));
    }

    #[test]
    fn search_response_tolerates_missing_cities() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.cities, None);
        let parsed: SearchResponse = serde_json::from_str(r#"{"cities":null}"#).unwrap();
        assert_eq!(parsed.cities, None);
    }
}
