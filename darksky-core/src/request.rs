use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.darksky.net/forecast";

/// Unit system for the returned values. `Us` is what the API uses when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Picked by the API from the location.
    Auto,
    /// SI, except wind speed in km/h.
    Ca,
    /// SI, except distances and wind speed in miles.
    Uk2,
    #[default]
    Us,
    Si,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Auto => "auto",
            Units::Ca => "ca",
            Units::Uk2 => "uk2",
            Units::Us => "us",
            Units::Si => "si",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Auto, Units::Ca, Units::Uk2, Units::Us, Units::Si]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let lower = value.to_lowercase();

        Units::all()
            .iter()
            .copied()
            .find(|u| u.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!("Unknown units '{value}'. Supported units: auto, ca, uk2, us, si.")
            })
    }
}

/// A block of the response that can be left out with `exclude`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Block {
    Currently,
    Minutely,
    Hourly,
    Daily,
    Alerts,
    Flags,
}

impl Block {
    pub fn as_str(&self) -> &'static str {
        match self {
            Block::Currently => "currently",
            Block::Minutely => "minutely",
            Block::Hourly => "hourly",
            Block::Daily => "daily",
            Block::Alerts => "alerts",
            Block::Flags => "flags",
        }
    }

    pub const fn all() -> &'static [Block] {
        &[
            Block::Currently,
            Block::Minutely,
            Block::Hourly,
            Block::Daily,
            Block::Alerts,
            Block::Flags,
        ]
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Block {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let lower = value.to_lowercase();

        Block::all().iter().copied().find(|b| b.as_str() == lower).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown block '{value}'. Supported blocks: currently, minutely, hourly, daily, alerts, flags."
            )
        })
    }
}

/// Optional query parameters. Anything left at its default is not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastOptions {
    /// Forecast for a point in time instead of now.
    pub time: Option<DateTime<Utc>>,
    pub units: Option<Units>,
    /// Language code for text summaries, e.g. "de".
    pub language: Option<String>,
    pub exclude: Vec<Block>,
    /// Return hour-by-hour data for the next week instead of two days.
    pub extend_hourly: bool,
}

impl ForecastOptions {
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn excluding(mut self, block: Block) -> Self {
        if !self.exclude.contains(&block) {
            self.exclude.push(block);
        }
        self
    }

    pub fn extend_hourly(mut self) -> Self {
        self.extend_hourly = true;
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(units) = self.units.filter(|u| *u != Units::default()) {
            pairs.push(("units", units.as_str().to_string()));
        }
        if let Some(lang) = self.language.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            pairs.push(("lang", urlencoding::encode(lang).into_owned()));
        }
        if !self.exclude.is_empty() {
            let names: Vec<&str> = self.exclude.iter().map(Block::as_str).collect();
            pairs.push(("exclude", names.join(",")));
        }
        if self.extend_hourly {
            pairs.push(("extend", "hourly".to_string()));
        }

        pairs
    }
}

/// A validated forecast request.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastQuery {
    api_key: String,
    latitude: f64,
    longitude: f64,
    options: ForecastOptions,
}

impl ForecastQuery {
    pub fn new(
        api_key: &str,
        latitude: f64,
        longitude: f64,
        options: ForecastOptions,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::InvalidApiKey);
        }

        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        if !lat_ok || !lon_ok {
            return Err(Error::InvalidCoordinates { latitude, longitude });
        }

        Ok(Self { api_key: api_key.to_string(), latitude, longitude, options })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn options(&self) -> &ForecastOptions {
        &self.options
    }

    /// Full request URL: `{base}/{key}/{lat},{lon}[,{time}][?query]`.
    pub fn to_url(&self, base: &str) -> String {
        let mut url = format!(
            "{}/{}/{},{}",
            base.trim_end_matches('/'),
            urlencoding::encode(&self.api_key),
            self.latitude,
            self.longitude,
        );

        if let Some(time) = self.options.time {
            url.push_str(&format!(",{}", time.timestamp()));
        }

        let query: Vec<String> =
            self.options.query_pairs().into_iter().map(|(k, v)| format!("{k}={v}")).collect();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }

        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_options_build_bare_url() {
        let query = ForecastQuery::new("fakekey", 29.4264, -98.5105, ForecastOptions::default())
            .expect("valid query");

        assert_eq!(
            query.to_url(DEFAULT_BASE_URL),
            "https://api.darksky.net/forecast/fakekey/29.4264,-98.5105"
        );
    }

    #[rstest]
    #[case("")]
    #[case(" ")]
    #[case("\t")]
    #[case("  ")]
    fn blank_api_key_is_rejected(#[case] key: &str) {
        let err = ForecastQuery::new(key, 0.0, 0.0, ForecastOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidApiKey));
        assert!(err.is_argument());
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(-91.0, 0.0)]
    #[case(0.0, 180.1)]
    #[case(0.0, -200.0)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn out_of_range_coordinates_are_rejected(#[case] lat: f64, #[case] lon: f64) {
        let err = ForecastQuery::new("key", lat, lon, ForecastOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinates { .. }));
    }

    #[test]
    fn boundary_coordinates_are_accepted() {
        assert!(ForecastQuery::new("key", 90.0, -180.0, ForecastOptions::default()).is_ok());
        assert!(ForecastQuery::new("key", -90.0, 180.0, ForecastOptions::default()).is_ok());
    }

    #[test]
    fn all_options_are_appended_in_order() {
        let time = DateTime::<Utc>::from_timestamp(1_509_993_277, 0).unwrap();
        let options = ForecastOptions::default()
            .at(time)
            .with_units(Units::Si)
            .with_language("de")
            .excluding(Block::Minutely)
            .excluding(Block::Flags)
            .excluding(Block::Minutely)
            .extend_hourly();

        let query = ForecastQuery::new("key", 42.915, -78.741, options).unwrap();

        assert_eq!(
            query.to_url("http://localhost:8080/forecast/"),
            "http://localhost:8080/forecast/key/42.915,-78.741,1509993277\
             ?units=si&lang=de&exclude=minutely,flags&extend=hourly"
        );
    }

    #[test]
    fn default_units_and_blank_language_are_not_sent() {
        let options = ForecastOptions::default().with_units(Units::Us).with_language("  ");
        let query = ForecastQuery::new("key", 1.0, 2.0, options).unwrap();

        assert_eq!(query.to_url(DEFAULT_BASE_URL), "https://api.darksky.net/forecast/key/1,2");
    }

    #[test]
    fn api_key_is_percent_encoded() {
        let query = ForecastQuery::new("a/b c", 0.0, 0.0, ForecastOptions::default()).unwrap();
        assert_eq!(query.to_url(DEFAULT_BASE_URL), "https://api.darksky.net/forecast/a%2Fb%20c/0,0");
    }

    #[test]
    fn coordinates_survive_formatting_exactly() {
        let (lat, lon) = (29.4264_f64, -98.5105_f64);
        let query = ForecastQuery::new("key", lat, lon, ForecastOptions::default()).unwrap();
        let url = query.to_url(DEFAULT_BASE_URL);

        let coords = url.rsplit('/').next().unwrap();
        let (lat_s, lon_s) = coords.split_once(',').unwrap();
        assert_eq!(lat_s.parse::<f64>().unwrap(), lat);
        assert_eq!(lon_s.parse::<f64>().unwrap(), lon);
    }

    #[test]
    fn units_and_blocks_parse_case_insensitively() {
        assert_eq!("UK2".parse::<Units>().unwrap(), Units::Uk2);
        assert_eq!("Hourly".parse::<Block>().unwrap(), Block::Hourly);
        assert!("kelvin".parse::<Units>().unwrap_err().to_string().contains("Unknown units"));
        assert!("weekly".parse::<Block>().is_err());
    }
}
