use super::super::{Config, Period, ProxySettings};
use super::*;

#[test]
fn default_config_is_valid() {
    assert!(validate(&Config::default()).is_ok());
}

#[test]
fn rejects_zero_row_cap() {
    let mut config = Config::default();
    config.api.top = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("api.top"));
}

#[test]
fn rejects_zero_timeout() {
    let mut config = Config::default();
    config.api.timeout_secs = 0;
    assert!(validate(&config).is_err());
}

#[test]
fn rejects_empty_basename() {
    let mut config = Config::default();
    config.report.basename = String::new();
    assert!(validate(&config).is_err());
}

#[test]
fn rejects_identical_periods() {
    let mut config = Config::default();
    config.report.previous_period = Period::parse("202501").unwrap();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("must differ"));
}

#[test]
fn rejects_empty_recipient_list() {
    let mut config = Config::default();
    config.mail.recipients.clear();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("mail.recipients"));
}

#[test]
fn rejects_malformed_addresses() {
    let mut config = Config::default();
    config.mail.sender = "not-an-address".to_string();
    assert!(validate(&config).is_err());

    let mut config = Config::default();
    config.mail.recipients = vec!["ops@example.com".to_string(), "@missing-local.com".to_string()];
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("recipients[1]"));
}

#[test]
fn rejects_empty_user_id() {
    let mut config = Config::default();
    config.mail.user_id = String::new();
    assert!(validate(&config).is_err());
}

#[test]
fn rejects_degenerate_proxy_section() {
    let mut config = Config::default();
    config.proxy = Some(ProxySettings {
        host: String::new(),
        port: 8080,
    });
    assert!(validate(&config).is_err());

    let mut config = Config::default();
    config.proxy = Some(ProxySettings {
        host: "proxy.example.com".to_string(),
        port: 0,
    });
    assert!(validate(&config).is_err());
}
