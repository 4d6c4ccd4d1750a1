use std::path::PathBuf;
use std::time::Duration;

use camgrab_core::{
    Classification, FailureKind, GrabSettings, IgnorePolicy, SettingsError,
    DEFAULT_IGNORED_STATUS_CODES, DEFAULT_SAVE_DIR,
};
use pretty_assertions::assert_eq;

#[test]
fn defaults_mirror_constructor_surface() {
    let settings = GrabSettings::new("http://example.com/out.jpg").unwrap();

    assert_eq!(settings.url, "http://example.com/out.jpg");
    assert_eq!(settings.interval(), Duration::from_secs(2));
    assert_eq!(settings.save_dir, Some(PathBuf::from(DEFAULT_SAVE_DIR)));
    assert!(settings.saving_enabled());
    assert!(settings.policy.ignore_timeout);
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    assert_eq!(settings.max_ticks, None);
}

#[test]
fn invalid_url_is_rejected() {
    let err = GrabSettings::new("not a url").unwrap_err();
    assert!(matches!(err, SettingsError::InvalidUrl { .. }));
}

#[test]
fn negative_interval_is_rejected() {
    let settings = GrabSettings::new("http://x/out.jpg").unwrap().with_every(-1.0);
    assert_eq!(
        settings.validate(),
        Err(SettingsError::InvalidInterval("-1".to_string()))
    );
}

#[test]
fn oversized_interval_is_rejected_and_saturates() {
    let settings = GrabSettings::new("http://x/out.jpg").unwrap().with_every(1e20);
    assert_eq!(
        settings.validate(),
        Err(SettingsError::InvalidInterval(1e20f64.to_string()))
    );
    assert_eq!(settings.interval(), Duration::MAX);

    let settings = settings.with_every(f64::NAN);
    assert!(settings.validate().is_err());
}

#[test]
fn disabling_save_dir_disables_saving() {
    let settings = GrabSettings::new("http://x/out.jpg")
        .unwrap()
        .with_every(0.0)
        .with_save_dir(None);
    assert!(!settings.saving_enabled());
    assert_eq!(settings.interval(), Duration::ZERO);
}

#[test]
fn every_default_code_is_tolerated() {
    let policy = IgnorePolicy::default();
    for code in DEFAULT_IGNORED_STATUS_CODES {
        assert_eq!(
            policy.classify(&FailureKind::HttpStatus(code)),
            Classification::Tolerated,
            "status {code}"
        );
    }
}

#[test]
fn unlisted_codes_are_fatal_until_enabled() {
    let mut policy = IgnorePolicy::default();
    assert_eq!(
        policy.classify(&FailureKind::HttpStatus(404)),
        Classification::Fatal
    );
    assert_eq!(
        policy.classify(&FailureKind::HttpStatus(403)),
        Classification::Fatal
    );

    policy.set_ignore(404, true);
    assert_eq!(
        policy.classify(&FailureKind::HttpStatus(404)),
        Classification::Tolerated
    );

    policy.set_ignore(404, false).set_ignore(503, false);
    assert_eq!(
        policy.classify(&FailureKind::HttpStatus(404)),
        Classification::Fatal
    );
    assert_eq!(
        policy.classify(&FailureKind::HttpStatus(503)),
        Classification::Fatal
    );
}

#[test]
fn timeout_follows_ignore_timeout_flag() {
    let mut policy = IgnorePolicy::default();
    assert_eq!(policy.classify(&FailureKind::Timeout), Classification::Tolerated);
    policy.set_ignore_timeout(false);
    assert_eq!(policy.classify(&FailureKind::Timeout), Classification::Fatal);
}

#[test]
fn settings_load_from_partial_ron() {
    engine_logging::initialize_for_tests();
    let text = r#"(
        url: "http://cam.local/snapshot.jpg",
        every: 0.5,
        save_dir: None,
        policy: (ignored_status_codes: [404], ignore_timeout: false),
    )"#;
    let settings: GrabSettings = ron::from_str(text).unwrap();

    assert_eq!(settings.url, "http://cam.local/snapshot.jpg");
    assert_eq!(settings.interval(), Duration::from_millis(500));
    assert!(!settings.saving_enabled());
    assert!(settings.policy.is_ignored(404));
    assert!(!settings.policy.is_ignored(503));
    assert!(!settings.policy.ignore_timeout);
    assert_eq!(settings.timeout, 30.0);
}
