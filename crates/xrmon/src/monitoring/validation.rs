//! Validation of monitor configuration before anything is scheduled.
//!
//! Rejects malformed X-Road identifiers and timing values that would either
//! hammer the Security Server or make a check meaningless.

use anyhow::{anyhow, Result};
use url::Url;

/// Validate the Security Server base URL
pub fn validate_server_url(server: &str) -> Result<()> {
    let url = Url::parse(server).map_err(|e| anyhow!("Invalid Security Server URL: {}", e))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("Invalid scheme for Security Server URL: {}", other)),
    }

    if url.host_str().is_none() {
        return Err(anyhow!("Security Server URL has no host"));
    }

    Ok(())
}

/// Validate an X-Road subsystem identifier.
///
/// Accepts `INSTANCE/CLASS/CODE` and `INSTANCE/CLASS/CODE/SUBSYSTEM`.
pub fn validate_subsystem(subsystem: &str) -> Result<()> {
    let parts: Vec<&str> = subsystem.split('/').collect();

    if parts.len() != 3 && parts.len() != 4 {
        return Err(anyhow!(
            "Subsystem identifier must have 3 or 4 segments (INSTANCE/CLASS/CODE[/SUBSYSTEM]): {}",
            subsystem
        ));
    }

    for part in parts {
        if part.is_empty() {
            return Err(anyhow!("Subsystem identifier has an empty segment: {}", subsystem));
        }
        if part.chars().any(char::is_whitespace) {
            return Err(anyhow!("Subsystem identifier contains whitespace: {}", subsystem));
        }
    }

    Ok(())
}

/// Validate an X-Road service code
pub fn validate_service_code(service: &str) -> Result<()> {
    if service.is_empty() {
        return Err(anyhow!("Service code must not be empty"));
    }

    if service.contains('/') {
        return Err(anyhow!("Service code must not contain '/': {}", service));
    }

    if service.chars().any(char::is_whitespace) {
        return Err(anyhow!("Service code contains whitespace: {}", service));
    }

    Ok(())
}

/// Validate check interval
pub fn validate_check_interval(interval_seconds: u64) -> Result<()> {
    const MIN_INTERVAL: u64 = 10; // 10 seconds
    const MAX_INTERVAL: u64 = 86400; // 24 hours

    if interval_seconds < MIN_INTERVAL {
        return Err(anyhow!(
            "Check interval too short: {} seconds (minimum: {})",
            interval_seconds,
            MIN_INTERVAL
        ));
    }

    if interval_seconds > MAX_INTERVAL {
        return Err(anyhow!(
            "Check interval too long: {} seconds (maximum: {})",
            interval_seconds,
            MAX_INTERVAL
        ));
    }

    Ok(())
}

/// Validate probe timeout
pub fn validate_timeout(timeout_seconds: u64) -> Result<()> {
    const MIN_TIMEOUT: u64 = 1;
    const MAX_TIMEOUT: u64 = 300; // 5 minutes

    if timeout_seconds < MIN_TIMEOUT {
        return Err(anyhow!(
            "Timeout too short: {} seconds (minimum: {})",
            timeout_seconds,
            MIN_TIMEOUT
        ));
    }

    if timeout_seconds > MAX_TIMEOUT {
        return Err(anyhow!(
            "Timeout too long: {} seconds (maximum: {})",
            timeout_seconds,
            MAX_TIMEOUT
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_server_url() {
        assert!(validate_server_url("http://localhost:8080").is_ok());
        assert!(validate_server_url("https://ss.example.org").is_ok());

        assert!(validate_server_url("ftp://example.com").is_err());
        assert!(validate_server_url("not a url").is_err());
    }

    #[test]
    fn test_validate_subsystem() {
        // Valid - member and subsystem level identifiers
        assert!(validate_subsystem("GOV/12345678/TestSystem").is_ok());
        assert!(validate_subsystem("DEV/COM/98765432/Billing").is_ok());

        // Invalid - wrong segment count
        assert!(validate_subsystem("GOV/12345678").is_err());
        assert!(validate_subsystem("A/B/C/D/E").is_err());

        // Invalid - empty or whitespace segments
        assert!(validate_subsystem("GOV//TestSystem").is_err());
        assert!(validate_subsystem("GOV/123 456/TestSystem").is_err());
    }

    #[test]
    fn test_validate_service_code() {
        assert!(validate_service_code("testService").is_ok());
        assert!(validate_service_code("getRandom.v1").is_ok());

        assert!(validate_service_code("").is_err());
        assert!(validate_service_code("a/b").is_err());
        assert!(validate_service_code("has space").is_err());
    }

    #[test]
    fn test_validate_check_interval() {
        assert!(validate_check_interval(10).is_ok()); // Min
        assert!(validate_check_interval(60).is_ok()); // Normal
        assert!(validate_check_interval(86400).is_ok()); // Max

        assert!(validate_check_interval(5).is_err()); // Too short
        assert!(validate_check_interval(100000).is_err()); // Too long
    }

    #[test]
    fn test_validate_timeout() {
        assert!(validate_timeout(1).is_ok());
        assert!(validate_timeout(10).is_ok());
        assert!(validate_timeout(300).is_ok());

        assert!(validate_timeout(0).is_err());
        assert!(validate_timeout(301).is_err());
    }
}
