//! Forecast payload returned by the API.
//!
//! The upstream schema grows over time, so decoding is tolerant: unknown fields are ignored,
//! and a field with an unexpected JSON type decodes to `None` instead of failing the parse.
//! Only `latitude` and `longitude` are required.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::response::ResponseHeaders;

/// Parsed forecast plus the informational headers that came with it.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    pub response: ForecastResponse,
    pub headers: ResponseHeaders,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name, e.g. "America/Chicago".
    #[serde(default, deserialize_with = "lenient")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub offset: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub currently: Option<DataPoint>,
    #[serde(default, deserialize_with = "lenient")]
    pub minutely: Option<DataBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub hourly: Option<DataBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub daily: Option<DataBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub alerts: Option<Vec<Alert>>,
    #[serde(default, deserialize_with = "lenient")]
    pub flags: Option<Flags>,
}

/// A series of data points with an optional summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataBlock {
    #[serde(default, deserialize_with = "lenient")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub icon: Option<String>,
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

/// Weather conditions for an instant (currently), a minute, an hour or a day.
///
/// Which fields are populated depends on the block and on what the upstream sources provide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    /// UNIX seconds.
    #[serde(default, deserialize_with = "lenient")]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub icon: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub sunrise_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub sunset_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub moon_phase: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub nearest_storm_distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub nearest_storm_bearing: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub precip_intensity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub precip_intensity_error: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub precip_intensity_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub precip_intensity_max_time: Option<i64>,
    /// 0.0 to 1.0.
    #[serde(default, deserialize_with = "lenient")]
    pub precip_probability: Option<f64>,
    /// "rain", "snow" or "sleet".
    #[serde(default, deserialize_with = "lenient")]
    pub precip_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub precip_accumulation: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_high_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_low_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_min_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_max_time: Option<i64>,

    #[serde(default, deserialize_with = "lenient")]
    pub apparent_temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub apparent_temperature_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub apparent_temperature_high_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub apparent_temperature_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub apparent_temperature_low_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub apparent_temperature_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub apparent_temperature_min_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub apparent_temperature_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub apparent_temperature_max_time: Option<i64>,

    #[serde(default, deserialize_with = "lenient")]
    pub dew_point: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind_gust: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind_gust_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind_bearing: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cloud_cover: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub uv_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub uv_index_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub visibility: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub ozone: Option<f64>,
}

impl DataPoint {
    pub fn time_utc(&self) -> Option<DateTime<Utc>> {
        self.time.and_then(unix_to_utc)
    }
}

/// Severe weather alert issued for the requested location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub regions: Option<Vec<String>>,
    /// "advisory", "watch" or "warning".
    #[serde(default, deserialize_with = "lenient")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub expires: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub uri: Option<String>,
}

impl Alert {
    pub fn expires_utc(&self) -> Option<DateTime<Utc>> {
        self.expires.and_then(unix_to_utc)
    }
}

/// Metadata about the data sources and units behind a forecast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Flags {
    /// Present when no data is available for the location.
    #[serde(default, deserialize_with = "lenient")]
    pub darksky_unavailable: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub nearest_station: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub sources: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub units: Option<String>,
}

/// Decodes a field, mapping a value of the wrong shape to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_missing_fields_are_tolerated() {
        let json = r#"{
            "latitude": 1.5,
            "longitude": -2.25,
            "brandNewField": {"nested": true},
            "currently": {"temperature": 71.3}
        }"#;

        let forecast: ForecastResponse = serde_json::from_str(json).unwrap();

        assert_eq!(forecast.latitude, 1.5);
        assert_eq!(forecast.longitude, -2.25);
        assert!(forecast.timezone.is_none());
        assert!(forecast.hourly.is_none());
        assert_eq!(forecast.currently.unwrap().temperature, Some(71.3));
    }

    #[test]
    fn mistyped_field_degrades_to_none() {
        let json = r#"{
            "latitude": 0,
            "longitude": 0,
            "offset": "minus six",
            "currently": {"temperature": "hot", "humidity": 0.5},
            "flags": {"units": "us", "nearest-station": [1, 2]}
        }"#;

        let forecast: ForecastResponse = serde_json::from_str(json).unwrap();

        assert!(forecast.offset.is_none());
        let currently = forecast.currently.unwrap();
        assert!(currently.temperature.is_none());
        assert_eq!(currently.humidity, Some(0.5));
        let flags = forecast.flags.unwrap();
        assert_eq!(flags.units.as_deref(), Some("us"));
        assert!(flags.nearest_station.is_none());
    }

    #[test]
    fn missing_coordinates_fail() {
        let err = serde_json::from_str::<ForecastResponse>(r#"{"timezone": "UTC"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn data_point_time_converts_to_utc() {
        let point = DataPoint { time: Some(1_509_993_277), ..Default::default() };
        let time = point.time_utc().unwrap();
        assert_eq!(time.to_rfc3339(), "2017-11-06T18:34:37+00:00");
    }
}
