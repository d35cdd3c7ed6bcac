use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use current_weather::{Config, Language, Location, QueryOptions, Unit, client_from_config};
use inquire::{Password, Select, Text};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "current-weather",
    version,
    about = "Current weather from OpenWeather"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Log requests and responses to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default unit/language.
    Configure,

    /// Weather at geographic coordinates.
    Coords {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Weather for a city name.
    City {
        name: String,
        /// State code (US only).
        #[arg(long)]
        state: Option<String>,
        /// ISO 3166 country code.
        #[arg(long)]
        country: Option<String>,
    },

    /// Weather for a city id from the service's city list.
    Id { id: u64 },

    /// Weather for a postal code, optionally suffixed with a country code ("10001,us").
    Zip { code: String },
}

/// Lookup flags accepted before or after the subcommand.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Unit system: standard, metric or imperial. Overrides the configured default.
    #[arg(long, global = true)]
    units: Option<Unit>,

    /// Description language code, e.g. "en" or "fr". Overrides the configured default.
    #[arg(long, global = true)]
    lang: Option<Language>,

    /// Print the parsed response as JSON.
    #[arg(long, global = true)]
    json: bool,
}

impl QueryArgs {
    fn options(&self, config: &Config) -> QueryOptions {
        let defaults = config.query_options();
        QueryOptions {
            unit: self.units.or(defaults.unit),
            language: self.lang.clone().or(defaults.language),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let location = match self.command {
            Command::Configure => return configure(),
            Command::Coords {
                latitude,
                longitude,
            } => Location::Coordinates {
                latitude,
                longitude,
            },
            Command::City {
                name,
                state,
                country,
            } => Location::CityName {
                name,
                state,
                country,
            },
            Command::Id { id } => Location::CityId(id),
            Command::Zip { code } => Location::PostalCode(code),
        };

        let config = Config::load()?;
        let client = client_from_config(&config)?;
        let options = self.query.options(&config);
        tracing::debug!(%location, ?options, "resolved query");

        let weather = client
            .current(&location, &options)
            .await
            .with_context(|| format!("Failed to fetch current weather for {location}"))?;

        if self.query.json {
            println!("{}", serde_json::to_string_pretty(&weather)?);
        } else {
            let unit = options.unit.unwrap_or(Unit::Standard);
            print!("{}", output::render(&weather, unit));
        }

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave blank to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key);
    }

    let mut units: Vec<Unit> = Unit::all().to_vec();
    if let Some(current) = config.units {
        units.retain(|u| *u != current);
        units.insert(0, current);
    }
    config.units = Some(Select::new("Default unit system:", units).prompt()?);

    let current_lang = config
        .language
        .as_ref()
        .map(Language::to_string)
        .unwrap_or_default();
    let lang = Text::new("Default language code (blank for the service default):")
        .with_default(&current_lang)
        .prompt()?;
    config.language = if lang.trim().is_empty() {
        None
    } else {
        Some(lang.parse()?)
    };

    if let Some(language) = config.language.as_ref().filter(|l| !l.is_documented()) {
        eprintln!(
            "Note: '{language}' is not a documented language code; \
             the service may ignore it."
        );
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    if !config.is_configured() {
        eprintln!("No API key stored yet; requests will fail until one is configured.");
    }

    Ok(())
}
