use async_trait::async_trait;
use reqwest::{
    Client,
    header::{COOKIE, HeaderMap, SET_COOKIE},
};
use serde::de::DeserializeOwned;
use std::{
    fmt::Debug,
    sync::{Mutex, PoisonError},
};
use thiserror::Error;
use tracing::debug;

use crate::{
    Config,
    model::{CityStat, ErrorBody, ForecastResponse, HistoryResponse, SearchResponse},
};

/// Shown when the forecast endpoint rejects a request without a `detail`.
pub const FORECAST_REJECTED_MESSAGE: &str = "Failed to get the weather forecast";

/// Shown when the forecast request fails before a usable response arrives.
pub const FORECAST_FAILED_MESSAGE: &str = "An error occurred while fetching the weather forecast";

const USER_ID_COOKIE: &str = "user_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search,
    Forecast,
    History,
    Stats,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Search => "/api/weather/search",
            Endpoint::Forecast => "/api/weather/forecast",
            Endpoint::History => "/api/weather/history",
            Endpoint::Stats => "/api/weather/stats",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} returned status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        endpoint: Endpoint,
        status: u16,
        detail: Option<String>,
        /// The body was valid JSON, just not a success payload.
        structured: bool,
    },
}

impl ApiError {
    /// Text presented to the user when a search flow fails with this error.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { detail: Some(detail), .. } if !detail.is_empty() => detail.clone(),
            ApiError::Status { .. } => FORECAST_REJECTED_MESSAGE.to_string(),
            ApiError::Transport { .. } | ApiError::Decode { .. } => {
                FORECAST_FAILED_MESSAGE.to_string()
            }
        }
    }
}

/// Backend contract consumed by the controller.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn search(&self, query: &str) -> Result<SearchResponse, ApiError>;

    async fn forecast(&self, city: &str) -> Result<ForecastResponse, ApiError>;

    async fn history(&self) -> Result<HistoryResponse, ApiError>;

    async fn stats(&self) -> Result<Vec<CityStat>, ApiError>;
}

/// `WeatherApi` over HTTP, carrying the server's `user_id` cookie between calls.
#[derive(Debug)]
pub struct HttpWeatherApi {
    base_url: String,
    http: Client,
    user_id: Mutex<Option<String>>,
}

impl HttpWeatherApi {
    pub fn new(base_url: impl Into<String>, user_id: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: Client::new(),
            user_id: Mutex::new(user_id),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_url.clone(), config.user_id.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Identity currently sent to the server, if any.
    pub fn user_id(&self) -> Option<String> {
        self.user_id.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn capture_user_id(&self, headers: &HeaderMap) {
        let issued = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(user_id_from_set_cookie);

        if let Some(id) = issued {
            debug!(user_id = id, "server issued user id");
            *self.user_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(id.to_string());
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint.path());

        let mut req = self.http.get(&url).query(query);
        if let Some(id) = self.user_id() {
            req = req.header(COOKIE, format!("{USER_ID_COOKIE}={id}"));
        }

        let res = req.send().await.map_err(|source| ApiError::Transport { endpoint, source })?;
        self.capture_user_id(res.headers());

        let status = res.status();
        let body = res.text().await.map_err(|source| ApiError::Transport { endpoint, source })?;

        if !status.is_success() {
            let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
            let structured = parsed.is_some();
            let detail = parsed
                .and_then(|value| serde_json::from_value::<ErrorBody>(value).ok())
                .and_then(|b| b.detail);
            return Err(ApiError::Status { endpoint, status: status.as_u16(), detail, structured });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }
}

#[async_trait]
impl WeatherApi for HttpWeatherApi {
    async fn search(&self, query: &str) -> Result<SearchResponse, ApiError> {
        self.get_json(Endpoint::Search, &[("q", query)]).await
    }

    async fn forecast(&self, city: &str) -> Result<ForecastResponse, ApiError> {
        self.get_json(Endpoint::Forecast, &[("city", city)]).await
    }

    async fn history(&self) -> Result<HistoryResponse, ApiError> {
        self.get_json(Endpoint::History, &[]).await
    }

    async fn stats(&self) -> Result<Vec<CityStat>, ApiError> {
        self.get_json(Endpoint::Stats, &[]).await
    }
}

fn user_id_from_set_cookie(value: &str) -> Option<&str> {
    let pair = value.split(';').next()?.trim();
    let (name, id) = pair.split_once('=')?;
    let id = id.trim().trim_matches('"');
    (name.trim() == USER_ID_COOKIE && !id.is_empty()).then_some(id)
}
