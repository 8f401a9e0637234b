use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use darksky_core::{
    Block, Config, DarkSkyService, DataPoint, ForecastOptions, ForecastResult, Units,
};
use inquire::{Password, Select, Text};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "darksky", version, about = "Dark Sky forecast CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default units/language.
    Configure,

    /// Show the forecast for a location.
    Forecast {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        #[arg(allow_negative_numbers = true)]
        longitude: f64,

        /// RFC 3339 date/time; if absent, means "now".
        #[arg(long)]
        time: Option<String>,

        /// auto, ca, uk2, us or si.
        #[arg(long)]
        units: Option<Units>,

        /// Language code for summaries, e.g. "de".
        #[arg(long)]
        lang: Option<String>,

        /// Block to leave out; may be repeated.
        #[arg(long)]
        exclude: Vec<Block>,

        /// Hour-by-hour data for the next week.
        #[arg(long)]
        extend: bool,

        /// Print the raw result as JSON.
        #[arg(long)]
        json: bool,

        #[arg(long, env = "DARKSKY_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Forecast {
                latitude,
                longitude,
                time,
                units,
                lang,
                exclude,
                extend,
                json,
                api_key,
            } => {
                let mut config = Config::load()?;
                if let Some(key) = api_key {
                    config.set_api_key(key);
                }

                let mut options = config.default_options();
                if let Some(time) = time.as_deref() {
                    options = options.at(parse_time(time)?);
                }
                if let Some(units) = units {
                    options = options.with_units(units);
                }
                if let Some(lang) = lang {
                    options = options.with_language(lang);
                }
                options = exclude.into_iter().fold(options, ForecastOptions::excluding);
                if extend {
                    options = options.extend_hourly();
                }

                debug!(?options, "resolved forecast options");

                let service = DarkSkyService::from_config(&config)?;
                let result = service.get_forecast_with(latitude, longitude, &options).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_forecast(&result);
                }
                Ok(())
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Dark Sky API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(Units::all().iter().position(|u| *u == Units::default()).unwrap_or(0))
        .prompt()
        .context("Failed to read units")?;
    config.units = Some(units);

    let lang = Text::new("Language code (empty for English):")
        .prompt()
        .context("Failed to read language")?;
    let lang = lang.trim();
    config.language = (!lang.is_empty()).then(|| lang.to_string());

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    let dt = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid --time '{value}', expected RFC 3339"))?;
    Ok(dt.with_timezone(&Utc))
}

fn print_forecast(result: &ForecastResult) {
    let forecast = &result.response;
    println!(
        "Forecast for {}, {} ({})",
        forecast.latitude,
        forecast.longitude,
        forecast.timezone.as_deref().unwrap_or("unknown timezone")
    );

    if let Some(now) = &forecast.currently {
        println!();
        println!("Now: {}", describe(now));
    }

    if let Some(daily) = &forecast.daily {
        println!();
        if let Some(summary) = &daily.summary {
            println!("{summary}");
        }
        for day in &daily.data {
            let date = day
                .time_utc()
                .map(|t| t.format("%a %Y-%m-%d").to_string())
                .unwrap_or_else(|| "?".to_string());
            println!(
                "  {date}  {} / {}  {}",
                fmt_value(day.temperature_low.or(day.temperature_min)),
                fmt_value(day.temperature_high.or(day.temperature_max)),
                day.summary.as_deref().unwrap_or("")
            );
        }
    }

    for alert in forecast.alerts.iter().flatten() {
        println!();
        println!(
            "[{}] {}",
            alert.severity.as_deref().unwrap_or("alert"),
            alert.title.as_deref().unwrap_or("Untitled alert")
        );
        if let Some(expires) = alert.expires_utc() {
            println!("  expires {expires}");
        }
        if let Some(uri) = &alert.uri {
            println!("  {uri}");
        }
    }

    println!();
    println!(
        "API calls: {}, response time: {}",
        result.headers.api_calls.map(|n| n.to_string()).as_deref().unwrap_or("n/a"),
        result.headers.response_time.as_deref().unwrap_or("n/a")
    );
}

fn describe(point: &DataPoint) -> String {
    let mut parts = vec![point.summary.clone().unwrap_or_else(|| "Unknown".to_string())];
    if let Some(t) = point.temperature {
        parts.push(format!("{t:.1}°"));
    }
    if let Some(h) = point.humidity {
        parts.push(format!("humidity {:.0}%", h * 100.0));
    }
    if let Some(p) = point.precip_probability {
        parts.push(format!("precip {:.0}%", p * 100.0));
    }
    if let Some(w) = point.wind_speed {
        parts.push(format!("wind {w:.1}"));
    }
    parts.join(", ")
}

fn fmt_value(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.0}°")).unwrap_or_else(|| "-".to_string())
}
