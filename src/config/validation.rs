use crate::error::{PixReportError, Result};

use super::Config;

/// Validate semantic correctness beyond what the types enforce.
///
/// # Errors
/// Returns a `Config` error naming the first offending field.
pub fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.is_empty() {
        return Err(PixReportError::Config(
            "api.base_url cannot be empty".to_string(),
        ));
    }

    if config.api.top == 0 {
        return Err(PixReportError::Config(
            "api.top must be at least 1".to_string(),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(PixReportError::Config(
            "api.timeout_secs must be at least 1".to_string(),
        ));
    }

    if config.report.basename.is_empty() {
        return Err(PixReportError::Config(
            "report.basename cannot be empty".to_string(),
        ));
    }

    if config.report.current_period == config.report.previous_period {
        return Err(PixReportError::Config(
            "report.current_period and report.previous_period must differ".to_string(),
        ));
    }

    validate_address(&config.mail.sender, "mail.sender")?;

    if config.mail.recipients.is_empty() {
        return Err(PixReportError::Config(
            "mail.recipients must contain at least one address".to_string(),
        ));
    }
    for (i, recipient) in config.mail.recipients.iter().enumerate() {
        validate_address(recipient, &format!("mail.recipients[{i}]"))?;
    }

    if config.mail.user_id.is_empty() {
        return Err(PixReportError::Config(
            "mail.user_id cannot be empty".to_string(),
        ));
    }

    if let Some(proxy) = &config.proxy {
        if proxy.host.is_empty() {
            return Err(PixReportError::Config(
                "proxy.host cannot be empty".to_string(),
            ));
        }
        if proxy.port == 0 {
            return Err(PixReportError::Config(
                "proxy.port cannot be zero".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_address(address: &str, field: &str) -> Result<()> {
    // Not RFC 5322; just enough to catch swapped or empty fields.
    let well_formed = address
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if well_formed {
        Ok(())
    } else {
        Err(PixReportError::Config(format!(
            "{field} is not a valid email address: '{address}'"
        )))
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
