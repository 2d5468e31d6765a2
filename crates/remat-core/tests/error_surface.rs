use remat_core::errors::{ErrorInfo, RematError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("index", "42")
        .with_context("shape", "64x64")
}

#[test]
fn grid_error_surface() {
    let err = RematError::Grid(sample_info("unsupported-rank", "grid rank out of range"));
    assert_eq!(err.info().code, "unsupported-rank");
    assert!(err.info().context.contains_key("index"));
}

#[test]
fn tracker_error_surface() {
    let err = RematError::Tracker(sample_info("untracked-descriptor", "descriptor not tracked"));
    assert_eq!(err.info().code, "untracked-descriptor");
    assert!(err.info().context.contains_key("shape"));
}

#[test]
fn sampler_error_surface() {
    let err = RematError::Sampler(sample_info("no-interface", "grid is homogeneous"));
    assert_eq!(err.info().code, "no-interface");
}

#[test]
fn cost_error_surface() {
    let err = RematError::Cost(sample_info("zero-baseline", "baseline distance is zero"));
    assert_eq!(err.info().code, "zero-baseline");
}

#[test]
fn config_error_surface() {
    let err = RematError::Config(sample_info("bad-lambda", "lambda out of range"));
    assert_eq!(err.info().code, "bad-lambda");
}

#[test]
fn kernel_error_surface() {
    let err = RematError::Kernel(sample_info("cost-regression", "rollback cost mismatch"));
    assert_eq!(err.info().code, "cost-regression");
}

#[test]
fn display_includes_hint_and_context() {
    let err = RematError::Sampler(
        ErrorInfo::new("no-interface", "grid is homogeneous")
            .with_context("retries", "1024")
            .with_hint("use a target with both phases present"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("no-interface"));
    assert!(rendered.contains("retries=1024"));
    assert!(rendered.contains("both phases"));
}
