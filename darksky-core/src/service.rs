use tracing::debug;

use crate::{
    Config,
    error::{Error, Result},
    model::ForecastResult,
    request::{DEFAULT_BASE_URL, ForecastOptions, ForecastQuery},
    response::map_response,
    transport::{HttpClient, ReqwestClient},
};

/// Entry point for forecast calls.
///
/// Construction never validates the API key; that happens on each call, before any request
/// is sent.
#[derive(Debug)]
pub struct DarkSkyService {
    api_key: String,
    base_url: String,
    http: Box<dyn HttpClient>,
}

impl DarkSkyService {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(api_key, ReqwestClient::new())
    }

    pub fn with_client(api_key: impl Into<String>, client: impl HttpClient + 'static) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Box::new(client),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forecast for the coordinates with default options.
    pub async fn get_forecast(&self, latitude: f64, longitude: f64) -> Result<ForecastResult> {
        self.get_forecast_with(latitude, longitude, &ForecastOptions::default()).await
    }

    pub async fn get_forecast_with(
        &self,
        latitude: f64,
        longitude: f64,
        options: &ForecastOptions,
    ) -> Result<ForecastResult> {
        let query = ForecastQuery::new(&self.api_key, latitude, longitude, options.clone())?;
        let url = query.to_url(&self.base_url);

        debug!(latitude, longitude, "requesting forecast");

        let raw = self.http.send_request(&url).await.map_err(Error::Transport)?;
        let result = map_response(raw)?;

        debug!(
            api_calls = ?result.headers.api_calls,
            response_time = ?result.headers.response_time,
            "forecast parsed"
        );

        Ok(result)
    }

    /// Build a service from the stored configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured.\n\
                 Hint: run `darksky configure` or set DARKSKY_API_KEY."
            )
        })?;

        let mut service = Self::new(api_key);
        if let Some(base_url) = &config.base_url {
            service = service.with_base_url(base_url.clone());
        }

        Ok(service)
    }
}

/// Optional API key variant of [`DarkSkyService::new`]; a missing key fails on first call.
impl From<Option<String>> for DarkSkyService {
    fn from(api_key: Option<String>) -> Self {
        Self::new(api_key.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Units;

    #[test]
    fn constructor_accepts_non_empty_key() {
        let service = DarkSkyService::new("fakekey");
        assert_eq!(service.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = DarkSkyService::from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `darksky configure`"));
    }

    #[test]
    fn from_config_applies_base_url() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            units: Some(Units::Si),
            language: None,
            base_url: Some("http://localhost:1234/forecast".into()),
        };

        let service = DarkSkyService::from_config(&cfg).expect("configured");
        assert_eq!(service.base_url(), "http://localhost:1234/forecast");
    }

    #[tokio::test]
    async fn missing_key_fails_at_call_time() {
        let service = DarkSkyService::from(None);
        let err = service.get_forecast(0.0, 0.0).await.unwrap_err();
        assert!(matches!(err, Error::InvalidApiKey));
    }
}
