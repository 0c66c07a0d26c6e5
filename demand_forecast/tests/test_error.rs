use demand_forecast::error::ForecastError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    let math_error = sales_math::MathError::InsufficientData("empty series".to_string());
    let forecast_error = ForecastError::from(math_error);
    assert!(matches!(forecast_error, ForecastError::MathError(_)));

    let toml_error = toml::from_str::<toml::Value>("window_size = ").unwrap_err();
    let forecast_error = ForecastError::from(toml_error);
    assert!(matches!(forecast_error, ForecastError::ConfigError(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InsufficientHistory { target_week: 1 };
    assert!(error.to_string().contains("before week 1"));

    let error = ForecastError::NoTargetData(9);
    assert_eq!(error.to_string(), "No enhanced data for week 9");

    let error = ForecastError::StoreError("lock poisoned".to_string());
    assert_eq!(error.to_string(), "Store error: lock poisoned");

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}

#[test]
fn test_error_is_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}

    let error = ForecastError::SchemaError("missing column Week".to_string());
    assert_error(&error);

    // converts cleanly into anyhow at the binary boundary
    let wrapped: anyhow::Error = error.into();
    assert!(wrapped.to_string().contains("missing column Week"));
}
