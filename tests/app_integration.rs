use hurstscan::cli::scan::{ReportFormat, scan_with_progress};
use hurstscan::core::config::AppConfig;
use hurstscan::core::{Interval, Regime, TaskError, TaskKey};
use hurstscan::providers::fmp::FmpProvider;
use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Newest-first bars, the provider's native order.
    pub fn bars_newest_first(closes: &[f64]) -> String {
        let bars: Vec<String> = closes
            .iter()
            .enumerate()
            .rev()
            .map(|(i, close)| {
                format!(
                    r#"{{"date": "2024-03-01 {:02}:{:02}:00", "open": {close}, "close": {close}, "volume": 100}}"#,
                    9 + i / 60,
                    i % 60
                )
            })
            .collect();
        format!("[{}]", bars.join(","))
    }

    pub async fn mount_chart(
        mock_server: &MockServer,
        interval: &str,
        ticker: &str,
        status_code: u16,
        body: &str,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/api/v3/historical-chart/{interval}/{ticker}")))
            .and(query_param("apikey", "integration-key"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(mock_server)
            .await;
    }
}

fn write_config(dir: &tempfile::TempDir, base_url: &str, tickers: &str, intervals: &str) -> String {
    let config_path = dir.path().join("config.yaml");
    let config_content = format!(
        r#"
tickers: {tickers}
intervals: {intervals}
start: 2024-03-01
end: 2024-03-01
workers: 3
timeout_secs: 5
retries: 0
providers:
  fmp:
    base_url: {base_url}
    api_key: integration-key
"#
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path.to_string_lossy().into_owned()
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    let rising: Vec<f64> = (100..=110).map(f64::from).collect();
    let body = test_utils::bars_newest_first(&rising);
    for interval in ["5min", "1hour"] {
        for ticker in ["AAPL", "MSFT"] {
            test_utils::mount_chart(&mock_server, interval, ticker, 200, &body).await;
        }
    }

    let dir = tempfile::TempDir::new().unwrap();
    let config_path = write_config(&dir, &mock_server.uri(), "[AAPL, MSFT]", "[5min, 1hour]");

    let result = hurstscan::run_command(
        hurstscan::AppCommand::Scan {
            format: ReportFormat::Json,
            workers: Some(2),
        },
        Some(&config_path),
    )
    .await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_scan_records_every_pair_with_failures_isolated() {
    let mock_server = wiremock::MockServer::start().await;
    let rising: Vec<f64> = (100..=110).map(f64::from).collect();
    let constant = vec![50.0; 12];

    test_utils::mount_chart(
        &mock_server,
        "1min",
        "AAPL",
        200,
        &test_utils::bars_newest_first(&rising),
    )
    .await;
    test_utils::mount_chart(
        &mock_server,
        "4hour",
        "AAPL",
        200,
        &test_utils::bars_newest_first(&constant),
    )
    .await;
    test_utils::mount_chart(&mock_server, "1min", "GS", 200, "[]").await;
    test_utils::mount_chart(&mock_server, "4hour", "GS", 500, "").await;

    let dir = tempfile::TempDir::new().unwrap();
    let config_path = write_config(&dir, &mock_server.uri(), "[AAPL, GS]", "[1min, 4hour]");
    let config = AppConfig::load_from_path(&config_path).unwrap();
    let provider = FmpProvider::from_config(&config.providers.fmp)
        .unwrap()
        .with_retry_policy(config.retries, config.retry_delay_ms);

    let table = scan_with_progress(&config, &provider).await.unwrap();
    info!(rows = ?table.rows(), "Scan finished");

    assert!(table.is_complete());
    assert_eq!(table.capacity(), 4);

    let cell = |ticker: &str, interval| {
        table
            .get(&TaskKey {
                ticker: ticker.to_string(),
                interval,
            })
            .unwrap()
            .clone()
    };

    let rising = cell("AAPL", Interval::OneMinute);
    assert_eq!(
        rising.classification.regime(),
        Some(Regime::TrendPersistent)
    );

    let constant = cell("AAPL", Interval::FourHours);
    assert!(
        constant
            .classification
            .to_string()
            .starts_with("unavailable: degenerate series")
    );

    let empty = cell("GS", Interval::OneMinute);
    assert!(matches!(empty.result, Err(TaskError::Estimate(_))));
    assert_eq!(
        empty.classification.to_string(),
        "unavailable: insufficient data: need at least 3 prices, got 0"
    );

    let server_error = cell("GS", Interval::FourHours);
    assert_eq!(
        server_error.classification.to_string(),
        "unavailable: HTTP error: 500"
    );
}

#[test_log::test(tokio::test)]
async fn test_missing_credential_fails_before_scheduling() {
    let mock_server = wiremock::MockServer::start().await;

    let dir = tempfile::TempDir::new().unwrap();
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            r#"
tickers: [AAPL]
intervals: [1min]
start: 2024-03-01
end: 2024-03-01
providers:
  fmp:
    base_url: {}
    api_key: ""
"#,
            mock_server.uri()
        ),
    )
    .unwrap();

    let result = hurstscan::run_command(
        hurstscan::AppCommand::Scan {
            format: ReportFormat::Table,
            workers: None,
        },
        config_path.to_str(),
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("missing credential"), "{err}");
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_forbidden_endpoint_leaves_other_cells_computed() {
    let mock_server = wiremock::MockServer::start().await;
    let rising: Vec<f64> = (100..=110).map(f64::from).collect();
    let body = test_utils::bars_newest_first(&rising);

    test_utils::mount_chart(
        &mock_server,
        "1min",
        "AAPL",
        403,
        r#"{"Error Message": "Exclusive Endpoint"}"#,
    )
    .await;
    test_utils::mount_chart(&mock_server, "1hour", "AAPL", 200, &body).await;
    test_utils::mount_chart(&mock_server, "1min", "MSFT", 200, &body).await;
    test_utils::mount_chart(&mock_server, "1hour", "MSFT", 200, &body).await;

    let dir = tempfile::TempDir::new().unwrap();
    let config_path = write_config(&dir, &mock_server.uri(), "[AAPL, MSFT]", "[1min, 1hour]");
    let mut config = AppConfig::load_from_path(&config_path).unwrap();
    // The forbidden pair is the first task, so a short-circuit would skip the rest.
    config.workers = 1;
    let provider = FmpProvider::from_config(&config.providers.fmp)
        .unwrap()
        .with_retry_policy(config.retries, config.retry_delay_ms);

    let table = scan_with_progress(&config, &provider).await.unwrap();
    assert!(table.is_complete());

    let forbidden = table
        .get(&TaskKey {
            ticker: "AAPL".to_string(),
            interval: Interval::OneMinute,
        })
        .unwrap();
    assert_eq!(
        forbidden.classification.to_string(),
        "unavailable: HTTP error: 403"
    );

    let aborted = table
        .iter()
        .filter(|(_, cell)| matches!(cell.result, Err(TaskError::Aborted)))
        .count();
    assert_eq!(aborted, 0);

    for (key, cell) in table.iter() {
        if key.ticker == "AAPL" && key.interval == Interval::OneMinute {
            continue;
        }
        assert_eq!(
            cell.classification.regime(),
            Some(Regime::TrendPersistent),
            "{} {}",
            key.ticker,
            key.interval
        );
    }
}
