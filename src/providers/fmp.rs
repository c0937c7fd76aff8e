use crate::core::config::FmpProviderConfig;
use crate::core::{ConfigError, FetchError, FetchTask, PriceSeries, PriceSeriesProvider};
use crate::providers::util::with_retry;
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Intraday closes from Financial Modeling Prep's `historical-chart` endpoint.
pub struct FmpProvider {
    base_url: Url,
    api_key: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl FmpProvider {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("FMP API key").into());
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("hurstscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid FMP base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid FMP base URL: {base_url}");
        }
        Ok(FmpProvider {
            base_url,
            api_key: api_key.to_string(),
            client,
            retries: 2,
            retry_delay_ms: 500,
        })
    }

    pub fn from_config(config: &FmpProviderConfig) -> anyhow::Result<Self> {
        Self::new(&config.base_url, &config.resolve_api_key()?)
    }

    pub fn with_retry_policy(mut self, retries: usize, retry_delay_ms: u64) -> Self {
        self.retries = retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Chart URL for `task`; the ticker is percent-encoded as a single path
    /// segment.
    fn chart_url(&self, task: &FetchTask) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "api",
                "v3",
                "historical-chart",
                task.interval.as_str(),
                task.ticker.as_str(),
            ]);
        }
        url.query_pairs_mut()
            .append_pair("from", &task.start.format("%Y-%m-%d").to_string())
            .append_pair("to", &task.end.format("%Y-%m-%d").to_string())
            .append_pair("apikey", &self.api_key);
        url
    }

    async fn request(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        // 403 marks a plan restriction on one endpoint, not a rejected key.
        match status {
            s if s.is_success() => Ok(body),
            StatusCode::UNAUTHORIZED => Err(FetchError::Unauthorized(
                error_message(&body).unwrap_or_else(|| status.to_string()),
            )),
            s => Err(FetchError::Http { status: s.as_u16() }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FmpBar {
    date: String,
    close: f64,
}

#[derive(Debug, Deserialize)]
struct FmpErrorResponse {
    #[serde(rename = "Error Message")]
    error_message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<FmpErrorResponse>(body)
        .ok()
        .map(|e| e.error_message)
}

/// Parses a bar array and orders it by timestamp, oldest first. Bars sharing a
/// timestamp keep their first occurrence.
fn parse_bars(body: &str) -> Result<Vec<(NaiveDateTime, f64)>, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::Parse("empty response".to_string()));
    }
    if let Some(message) = error_message(body) {
        return Err(FetchError::Parse(format!("provider error: {message}")));
    }

    let bars: Vec<FmpBar> =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut closes = bars
        .into_iter()
        .map(|bar| {
            NaiveDateTime::parse_from_str(&bar.date, DATE_FORMAT)
                .map(|date| (date, bar.close))
                .map_err(|e| FetchError::Parse(format!("invalid date '{}': {e}", bar.date)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    closes.sort_by_key(|(date, _)| *date);
    closes.dedup_by_key(|(date, _)| *date);
    Ok(closes)
}

#[async_trait]
impl PriceSeriesProvider for FmpProvider {
    #[instrument(
        name = "FmpFetch",
        skip(self, task),
        fields(ticker = %task.ticker, interval = %task.interval)
    )]
    async fn fetch_closes(&self, task: &FetchTask) -> Result<PriceSeries, FetchError> {
        let url = self.chart_url(task);
        debug!(
            "Requesting {} closes for {} from {} to {}",
            task.interval, task.ticker, task.start, task.end
        );

        let body = with_retry(|| self.request(&url), self.retries, self.retry_delay_ms).await?;
        let bars = parse_bars(&body)?;
        debug!(bars = bars.len(), "Parsed price bars");

        PriceSeries::new(bars.into_iter().map(|(_, close)| close).collect())
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}
