use collectree_test_fixtures::warnings_configs;
use collectree_warnings::deprecated::{PRIVATE, STRICT_OPTION, YIELD_FIXTURE};
use collectree_warnings::{
    check_private, FilterAction, Warning, WarningCategory, WarningError, WarningRecorder,
    WarningSink, WarningsConfig,
};

fn load(name: &str) -> WarningsConfig {
    let json = warnings_configs::json(name).expect("fixture exists");
    WarningsConfig::from_json_str(&json).expect("fixture config is valid")
}

#[test]
fn every_fixture_config_is_valid() {
    for key in warnings_configs::keys() {
        let cfg = load(&key);
        assert!(cfg.build_filters().is_ok(), "{key}");
    }
}

#[test]
fn strict_config_turns_warnings_into_errors() {
    let cfg = load("strict");
    let sink = cfg.into_sink(WarningRecorder::new()).unwrap();

    match check_private(false, &sink) {
        Err(WarningError::Raised(rec)) => assert_eq!(rec.warning, PRIVATE),
        other => panic!("expected PRIVATE to be raised, got {other:?}"),
    }
    assert!(check_private(true, &sink).is_ok());
}

#[test]
fn strict_config_keeps_its_ignore_exceptions() {
    let sink = load("strict").into_sink(WarningRecorder::new()).unwrap();

    sink.emit(Warning::new(WarningCategory::DeprecationWarning, "the imp module is deprecated").into())
        .unwrap();
    sink.emit(Warning::new(WarningCategory::ImportWarning, "Not importing directory x").into())
        .unwrap();
    assert!(sink.inner().is_empty());

    let err = sink
        .emit(Warning::new(WarningCategory::DeprecationWarning, "mode is deprecated").into())
        .unwrap_err();
    assert!(matches!(err, WarningError::Raised(_)));
}

#[test]
fn lenient_config_drops_framework_deprecations_and_forwards_the_rest() {
    let cfg = load("lenient");
    assert_eq!(cfg.default_action, FilterAction::Always);
    let sink = cfg.into_sink(WarningRecorder::new()).unwrap();

    sink.emit(YIELD_FIXTURE.clone().into()).unwrap();
    sink.emit(STRICT_OPTION.clone().into()).unwrap();
    assert!(sink.inner().is_empty());

    let plain = Warning::new(WarningCategory::DeprecationWarning, "deprecated");
    sink.emit(plain.clone().into()).unwrap();
    sink.emit(plain.into()).unwrap();
    assert_eq!(sink.inner().len(), 2);
}
