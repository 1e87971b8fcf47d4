use crate::config::{Config, MarketDataProvider};
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const KEYS: &[&str] = &[
    "SERVER_PORT",
    "LOOKBACK",
    "MODEL_PATH",
    "DECISION_STRONG_PCT",
    "DECISION_MILD_PCT",
    "MARKET_DATA_PROVIDER",
    "CSV_DATA_DIR",
    "MARKET_DATA_TIMEOUT_SECS",
    "OBSERVABILITY_ENABLED",
    "OBSERVABILITY_INTERVAL",
];

fn clear_env() {
    for key in KEYS {
        // SAFETY: tests touching the environment hold ENV_LOCK.
        unsafe { env::remove_var(key) };
    }
}

fn set(key: &str, value: &str) {
    // SAFETY: tests touching the environment hold ENV_LOCK.
    unsafe { env::set_var(key, value) };
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.model.lookback, 100);
    assert_eq!(config.model.thresholds.strong_pct, 5.0);
    assert_eq!(config.model.thresholds.mild_pct, 2.0);
    assert_eq!(config.market_data.provider, MarketDataProvider::Yahoo);
    assert_eq!(config.market_data.max_retries, 3);
    assert!(config.observability.enabled);
    assert_eq!(config.observability.interval_secs, 60);
}

#[test]
fn test_config_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();
    set("SERVER_PORT", "9000");
    set("LOOKBACK", "60");
    set("MODEL_PATH", "/models/lstm.onnx");
    set("MARKET_DATA_PROVIDER", "csv");
    set("CSV_DATA_DIR", "/var/prices");
    set("OBSERVABILITY_ENABLED", "false");
    set("OBSERVABILITY_INTERVAL", "15");

    let config = Config::from_env().unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.model.lookback, 60);
    assert_eq!(config.model.model_path.to_str(), Some("/models/lstm.onnx"));
    assert_eq!(config.market_data.provider, MarketDataProvider::Csv);
    assert_eq!(config.market_data.csv_data_dir.to_str(), Some("/var/prices"));
    assert!(!config.observability.enabled);
    assert_eq!(config.observability.interval_secs, 15);

    clear_env();
}

#[test]
fn test_config_rejects_invalid_values() {
    let _guard = get_env_lock().lock().unwrap();

    clear_env();
    set("LOOKBACK", "0");
    assert!(Config::from_env().is_err());

    clear_env();
    set("LOOKBACK", "many");
    assert!(Config::from_env().is_err());

    clear_env();
    set("DECISION_STRONG_PCT", "1.0");
    set("DECISION_MILD_PCT", "2.0");
    assert!(Config::from_env().is_err());

    clear_env();
    set("MARKET_DATA_PROVIDER", "bloomberg");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_config_rejects_invalid_observability_values() {
    let _guard = get_env_lock().lock().unwrap();

    clear_env();
    set("OBSERVABILITY_INTERVAL", "ten");
    let err = format!("{:#}", Config::from_env().unwrap_err());
    assert!(err.contains("OBSERVABILITY_INTERVAL"), "{}", err);

    clear_env();
    set("OBSERVABILITY_INTERVAL", "0");
    assert!(Config::from_env().is_err());

    clear_env();
    set("OBSERVABILITY_ENABLED", "maybe");
    let err = format!("{:#}", Config::from_env().unwrap_err());
    assert!(err.contains("OBSERVABILITY_ENABLED"), "{}", err);

    clear_env();
}
