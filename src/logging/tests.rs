use super::*;

#[test]
fn configured_filter_is_used_when_valid() {
    let settings = LoggingSettings {
        filter: "tapedeck=debug,warn".into(),
        with_target: false,
    };
    assert!(build_filter(&settings).is_ok());
}

#[test]
fn second_init_reports_already_installed() {
    let settings = LoggingSettings::default();
    // The first call may race with other tests; only the second outcome is
    // deterministic.
    let _ = init(&settings);
    assert!(matches!(init(&settings), Err(LoggingError::AlreadyInstalled)));
}
