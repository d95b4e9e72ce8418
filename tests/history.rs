use chrono::{DateTime, TimeDelta, Utc};
use kline_data::{
    exchange::binance::BinanceClient,
    history::{backfill_year, load_history, save_history, update_history},
    Candle,
};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn millis(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(time.timestamp_millis()).unwrap()
}

fn candle(open_time: DateTime<Utc>, close: f64) -> Candle {
    Candle {
        open_time,
        open: close,
        high: close,
        low: close,
        close,
        volume: 1.0,
        close_time: open_time + TimeDelta::hours(1) - TimeDelta::milliseconds(1),
        quote_volume: 1.0,
        trade_count: 10,
        taker_buy_volume: 0.5,
        taker_buy_quote_volume: 0.5,
    }
}

/// Binance kline array row matching `candle(open_time, close)`.
fn kline_row(open_time: DateTime<Utc>, close: f64) -> serde_json::Value {
    let open_millis = open_time.timestamp_millis();
    let close_millis = (open_time + TimeDelta::hours(1)).timestamp_millis() - 1;
    json!([
        open_millis,
        close.to_string(),
        close.to_string(),
        close.to_string(),
        close.to_string(),
        "1.0",
        close_millis,
        "1.0",
        10,
        "0.5",
        "0.5",
        "0"
    ])
}

// ---------------------------------------------------------------------------
// Test 1: a saved table loads back identically
// ---------------------------------------------------------------------------
#[test]
fn test_save_and_load_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("BTCUSDT_1h.csv");

    let start = DateTime::from_timestamp_millis(1609459200000).unwrap();
    let candles = vec![
        candle(start, 29000.0),
        candle(start + TimeDelta::hours(1), 29200.0),
        candle(start + TimeDelta::hours(2), 29500.0),
    ];

    save_history(&path, &candles).unwrap();
    let loaded = load_history(&path).unwrap();

    assert_eq!(loaded, candles);
}

// ---------------------------------------------------------------------------
// Test 2: loading a missing file is an error, not an empty table
// ---------------------------------------------------------------------------
#[test]
fn test_load_history_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_history(&dir.path().join("missing.csv")).is_err());
}

// ---------------------------------------------------------------------------
// Test 3: update_history is a no-op while the table is current
// ---------------------------------------------------------------------------
#[tokio::test]
async fn test_update_history_up_to_date() {
    let mock_server = MockServer::start().await;
    let client = BinanceClient::with_base_url(&mock_server.uri()).unwrap();

    // Catch-all to verify no request is sent.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("BTCUSDT_1h.csv");

    let last_open = millis(Utc::now() - TimeDelta::minutes(30));
    let existing = vec![candle(last_open - TimeDelta::hours(1), 1.0), candle(last_open, 2.0)];
    save_history(&csv_path, &existing).unwrap();

    let updated = update_history(&client, &csv_path, "BTCUSDT", "1h", Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(updated, existing);
}

// ---------------------------------------------------------------------------
// Test 4: backfill_year walks every generated window in order and
// concatenates the per-window batches
// ---------------------------------------------------------------------------
#[tokio::test]
async fn test_backfill_year_concatenates_windows() {
    let mock_server = MockServer::start().await;
    let client = BinanceClient::with_base_url(&mock_server.uri()).unwrap();

    // 2023 at 12h bars with 500-bar pages splits into exactly two windows:
    // [Jan 1 00:00, Sep 8 00:00) and [Sep 8 00:00, Dec 31 23:00].
    let window_one = DateTime::from_timestamp(1672531200, 0).unwrap();
    let window_two = DateTime::from_timestamp(1694131200, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/klines"))
        .and(query_param("startTime", "1672531200000"))
        .and(query_param("endTime", "1694131200000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline_row(window_one, 1.0),
            kline_row(window_one + TimeDelta::hours(12), 2.0),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/klines"))
        .and(query_param("startTime", "1694131200000"))
        .and(query_param("endTime", "1704063600000"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([kline_row(window_two, 3.0)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let candles = backfill_year(&client, "BTCUSDT", "12h", 2023, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(candles.len(), 3);
    assert!((candles[0].close - 1.0).abs() < 1e-9);
    assert!((candles[1].close - 2.0).abs() < 1e-9);
    assert!((candles[2].close - 3.0).abs() < 1e-9, "second window appended after the first");
    assert_eq!(candles[0].open_time, window_one);
    assert_eq!(candles[2].open_time, window_two);
}

// ---------------------------------------------------------------------------
// Test 5: update_history fetches the missing range, merges keep-last on the
// overlapping open time, and rewrites the file
// ---------------------------------------------------------------------------
#[tokio::test]
async fn test_update_history_fetches_and_merges() {
    let mock_server = MockServer::start().await;
    let client = BinanceClient::with_base_url(&mock_server.uri()).unwrap();

    // Truncated to milliseconds so the overlapping fetched row shares the key.
    let last_open = millis(Utc::now() - TimeDelta::hours(3));

    // One 500-bar window covers the whole 3h gap, so exactly one request.
    Mock::given(method("GET"))
        .and(path("/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline_row(last_open, 42.0),
            kline_row(last_open + TimeDelta::hours(1), 43.0),
            kline_row(last_open + TimeDelta::hours(2), 44.0),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("BTCUSDT_1h.csv");

    let existing = vec![candle(last_open - TimeDelta::hours(1), 1.0), candle(last_open, 2.0)];
    save_history(&csv_path, &existing).unwrap();

    let updated = update_history(&client, &csv_path, "BTCUSDT", "1h", Duration::ZERO)
        .await
        .unwrap();

    // 2 existing rows + 3 fetched, one shared open time kept from the fetch.
    assert_eq!(updated.len(), 4);
    assert!((updated[0].close - 1.0).abs() < 1e-9);
    assert!((updated[1].close - 42.0).abs() < 1e-9, "fetched row wins the overlap");
    assert!((updated[2].close - 43.0).abs() < 1e-9);
    assert!((updated[3].close - 44.0).abs() < 1e-9);

    // Ascending by open time.
    assert!(updated.windows(2).all(|w| w[0].open_time < w[1].open_time));

    // The merged table was persisted.
    let reloaded = load_history(&csv_path).unwrap();
    assert_eq!(reloaded, updated);
}
