use super::{settings_from_sources, Settings};

#[test]
fn defaults_to_port_5000_on_all_interfaces() {
    assert_eq!(settings_from_sources(None, None, None), Settings::default());
    assert_eq!(Settings::default().server_bind, "0.0.0.0:5000");
}

#[test]
fn file_bind_addr_is_applied() {
    let settings = settings_from_sources(Some("bind_addr = \"127.0.0.1:7000\""), None, None);
    assert_eq!(settings.server_bind, "127.0.0.1:7000");
}

#[test]
fn port_env_overrides_file() {
    let settings = settings_from_sources(
        Some("bind_addr = \"127.0.0.1:7000\""),
        Some("8080".to_string()),
        None,
    );
    assert_eq!(settings.server_bind, "0.0.0.0:8080");
}

#[test]
fn explicit_bind_wins_over_port() {
    let settings = settings_from_sources(
        None,
        Some("8080".to_string()),
        Some("127.0.0.1:9000".to_string()),
    );
    assert_eq!(settings.server_bind, "127.0.0.1:9000");
}

#[test]
fn invalid_sources_are_ignored() {
    let settings = settings_from_sources(
        Some("bind_addr = [broken"),
        Some("not-a-port".to_string()),
        Some("   ".to_string()),
    );
    assert_eq!(settings, Settings::default());
}
