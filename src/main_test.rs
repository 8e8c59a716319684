use super::*;

#[test]
fn test_watch_namespace_defaults_to_all() {
    assert_eq!(watch_namespace(None), None);
    assert_eq!(watch_namespace(Some(String::new())), None);
    assert_eq!(watch_namespace(Some("  ".to_string())), None);
}

#[test]
fn test_watch_namespace_trims_value() {
    assert_eq!(
        watch_namespace(Some(" redhat-rhmi-operator ".to_string())),
        Some("redhat-rhmi-operator".to_string())
    );
}

#[test]
fn test_health_port_default() {
    assert_eq!(health_port(None).unwrap(), DEFAULT_HEALTH_PORT);
    assert_eq!(health_port(Some(String::new())).unwrap(), DEFAULT_HEALTH_PORT);
}

#[test]
fn test_health_port_override() {
    assert_eq!(health_port(Some("9090".to_string())).unwrap(), 9090);
}

#[test]
fn test_health_port_rejects_garbage() {
    let err = health_port(Some("eighty".to_string())).unwrap_err();
    assert!(err.to_string().contains("RHMI_HEALTH_PORT"));

    assert!(health_port(Some("70000".to_string())).is_err());
}
