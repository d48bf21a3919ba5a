use super::*;
use std::collections::HashMap;
use tempfile::TempDir;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults() {
    let settings = Settings::default();
    assert_eq!(settings.feishu.webhook_url, None);
    assert_eq!(settings.feishu.timeout_secs, 5);
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.log.level, "info");
    assert!(!settings.is_configured());
}

#[test]
fn default_settings_template_parses_to_defaults() {
    let settings = parse_settings(DEFAULT_SETTINGS).unwrap();
    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.feishu.webhook_url, None);
}

#[test]
fn parse_partial_file() {
    let settings = parse_settings(
        r#"
[feishu]
webhook_url = "https://open.feishu.cn/open-apis/bot/v2/hook/abc"

[server]
port = 8080
"#,
    )
    .unwrap();
    assert!(settings.is_configured());
    assert_eq!(
        settings.webhook_url().unwrap(),
        "https://open.feishu.cn/open-apis/bot/v2/hook/abc"
    );
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.feishu.timeout_secs, 5);
}

#[test]
fn parse_invalid_toml() {
    assert!(parse_settings("[server\nport = ").is_err());
    assert!(parse_settings("[server]\nport = \"eighty\"").is_err());
}

#[test]
fn blank_webhook_url_is_not_configured() {
    let mut settings = Settings::default();
    settings.feishu.webhook_url = Some("   ".to_string());
    assert!(!settings.is_configured());
    let err = settings.webhook_url().unwrap_err();
    assert!(err.to_string().contains("FEISHU_WEBHOOK_URL"));
}

#[test]
fn env_overrides_file() {
    let mut settings = parse_settings("[server]\nport = 8080\nhost = \"127.0.0.1\"").unwrap();
    settings
        .apply_env(env_of(&[
            ("FEISHU_WEBHOOK_URL", "https://hook.example/env"),
            ("PORT", "9090"),
            ("LOG_LEVEL", "debug"),
            ("FEISHU_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
    assert_eq!(settings.webhook_url().unwrap(), "https://hook.example/env");
    assert_eq!(settings.server.port, 9090);
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.log.level, "debug");
    assert_eq!(settings.timeout(), Duration::from_secs(3));
}

#[test]
fn env_invalid_port() {
    let mut settings = Settings::default();
    let err = settings.apply_env(env_of(&[("PORT", "http")])).unwrap_err();
    assert!(err.to_string().contains("Invalid PORT"));
}

#[test]
fn flags_override_env() {
    let mut settings = Settings::default();
    settings
        .apply_env(env_of(&[("FEISHU_WEBHOOK_URL", "https://env"), ("PORT", "9090")]))
        .unwrap();
    settings.apply_overrides(Overrides {
        webhook_url: Some("https://flag".to_string()),
        host: Some("127.0.0.1".to_string()),
        port: None,
    });
    assert_eq!(settings.webhook_url().unwrap(), "https://flag");
    assert_eq!(settings.bind_addr(), "127.0.0.1:9090");
}

#[test]
fn timeout_is_at_least_one_second() {
    let mut settings = Settings::default();
    settings.feishu.timeout_secs = 0;
    assert_eq!(settings.timeout(), Duration::from_secs(1));
}

#[test]
fn load_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[log]\nlevel = \"warn\"\n").unwrap();

    let settings = load_settings_file(Some(&path)).unwrap();
    assert_eq!(settings.log.level, "warn");
}

#[test]
fn load_missing_explicit_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.toml");
    let err = load_settings_file(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Settings file not found"));
}

#[test]
fn init_writes_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.toml");

    assert!(init_settings_file(&path).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_SETTINGS);

    std::fs::write(&path, "[server]\nport = 1\n").unwrap();
    assert!(!init_settings_file(&path).unwrap());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "[server]\nport = 1\n"
    );
}

#[test]
fn settings_path_location() {
    if let Ok(path) = settings_path() {
        assert!(path.ends_with("sentry-feishu/settings.toml"));
    }
}
