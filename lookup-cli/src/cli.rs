use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Text};
use lookup_core::{
    Config, Controller, ControllerOptions, HttpWeatherApi, PanelUpdate, View, WeatherApi,
    render,
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::terminal::{Choice, LiveSuggestions, TerminalView};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-lookup", version, about = "Look up weather forecasts by city")]
pub struct Cli {
    /// Weather service root URL for this run (overrides config).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Type a city with live suggestions (default).
    Interactive,

    /// List cities matching a query.
    Search {
        /// At least two characters of a city name.
        query: String,
    },

    /// Show the forecast for a city.
    Forecast {
        /// City name.
        city: String,
    },

    /// Show previously searched cities.
    History,

    /// Show how often each city was searched.
    Stats,

    /// Update stored settings.
    Configure {
        /// Weather service root URL, e.g. "http://127.0.0.1:8000".
        #[arg(long = "set-base-url")]
        set_base_url: Option<String>,

        /// Quiet period before suggestions are fetched.
        #[arg(long)]
        debounce_ms: Option<u64>,

        /// Shortest input that triggers suggestions.
        #[arg(long)]
        min_query_chars: Option<usize>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(url) = self.base_url {
            config.base_url = url;
        }

        let command = self.command.unwrap_or(Command::Interactive);
        let api = Arc::new(HttpWeatherApi::from_config(&config));
        debug!(base_url = api.base_url(), "using weather service");

        let result = match command {
            Command::Interactive => {
                let view = Arc::new(TerminalView::interactive());
                let controller = build_controller(&config, api.clone(), view.clone());
                interactive(controller, view).await
            }
            Command::Search { query } => search_lines(&config, api.as_ref(), &query)
                .await
                .map(|lines| lines.iter().for_each(|line| println!("{line}"))),
            Command::Forecast { city } => {
                let view = Arc::new(TerminalView::one_shot());
                let controller = build_controller(&config, api.clone(), view.clone());
                controller.submit(&city).await;
                match view.take_error() {
                    Some(message) => Err(anyhow!(message)),
                    None => Ok(()),
                }
            }
            Command::History => history_lines(api.as_ref())
                .await
                .map(|lines| lines.iter().for_each(|line| println!("{line}"))),
            Command::Stats => stats(api.as_ref()).await,
            Command::Configure { set_base_url, debounce_ms, min_query_chars } => {
                return configure(config, set_base_url, debounce_ms, min_query_chars);
            }
        };

        if config.remember_user_id(api.user_id()) {
            if let Err(err) = config.save() {
                warn!(error = %err, "could not persist user id");
            }
        }

        result
    }
}

fn build_controller(
    config: &Config,
    api: Arc<HttpWeatherApi>,
    view: Arc<TerminalView>,
) -> Controller {
    let view: Arc<dyn View> = view;
    Controller::new(api, view, ControllerOptions::from(config), Handle::current())
}

async fn interactive(controller: Controller, view: Arc<TerminalView>) -> anyhow::Result<()> {
    controller.start().await;

    loop {
        let completer = LiveSuggestions::new(controller.clone(), view.clone());
        let last = view.input();

        let answer = tokio::task::spawn_blocking(move || {
            Text::new("City:")
                .with_placeholder(&last)
                .with_autocomplete(completer)
                .with_help_message("Enter to search, empty line or Esc to quit")
                .prompt_skippable()
        })
        .await
        .context("prompt task panicked")?;

        let answer = match answer {
            Ok(Some(answer)) if !answer.trim().is_empty() => answer,
            Ok(_) | Err(InquireError::OperationInterrupted) => return Ok(()),
            Err(err) => return Err(err).context("prompt failed"),
        };
        let choice = view.resolve(&answer);

        // The prompt is gone, so is its suggestions list.
        controller.on_click(false);

        match choice {
            Choice::Suggestion(candidate) => controller.select_suggestion(&candidate).await,
            Choice::History(city) => controller.select_history(&city).await,
            Choice::Typed(text) => controller.submit(&text).await,
        }
        view.take_error();
    }
}

async fn search_lines(
    config: &Config,
    api: &dyn WeatherApi,
    query: &str,
) -> anyhow::Result<Vec<String>> {
    let query = query.trim();
    if query.chars().count() < config.min_query_chars {
        bail!("Query must be at least {} characters long", config.min_query_chars);
    }

    let response = api.search(query).await.context("Failed to fetch suggestions")?;
    Ok(match render::suggestions(&response) {
        PanelUpdate::Show(rows) => rows.into_iter().map(|row| row.label).collect(),
        PanelUpdate::Hide => vec!["No matching cities.".to_string()],
    })
}

async fn history_lines(api: &dyn WeatherApi) -> anyhow::Result<Vec<String>> {
    let response = api.history().await.context("Failed to fetch search history")?;
    Ok(match render::history(&response) {
        PanelUpdate::Show(entries) => entries,
        PanelUpdate::Hide => vec!["No search history yet.".to_string()],
    })
}

async fn stats(api: &dyn WeatherApi) -> anyhow::Result<()> {
    let stats = api.stats().await.context("Failed to fetch search statistics")?;
    if stats.is_empty() {
        println!("No searches recorded yet.");
    }
    for line in render::stats(&stats) {
        println!("{line}");
    }
    Ok(())
}

fn configure(
    mut config: Config,
    base_url: Option<String>,
    debounce_ms: Option<u64>,
    min_query_chars: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(url) = base_url {
        config.base_url = url;
    }
    if let Some(ms) = debounce_ms {
        config.debounce_ms = ms;
    }
    if let Some(chars) = min_query_chars {
        config.min_query_chars = chars;
    }

    config.validate()?;
    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    println!("  base_url        = {}", config.base_url);
    println!("  debounce_ms     = {}", config.debounce_ms);
    println!("  min_query_chars = {}", config.min_query_chars);
    Ok(())
}
