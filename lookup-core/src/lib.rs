//! Core library for the `weather-lookup` client.
//!
//! This crate defines:
//! - Configuration handling
//! - The weather service API contract and its HTTP client
//! - Debounced autocomplete and the search/history controller
//! - Pure rendering of API payloads into view models
//!
//! It is used by `lookup-cli`, but any UI can drive it by implementing [`View`].

pub mod api;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod model;
pub mod render;
pub mod view;

pub use api::{ApiError, HttpWeatherApi, WeatherApi};
pub use config::Config;
pub use controller::{Controller, ControllerOptions};
pub use model::{CityCandidate, CityStat, ForecastPoint, ForecastResponse};
pub use render::{ForecastView, PanelUpdate, SuggestionRow};
pub use view::View;
