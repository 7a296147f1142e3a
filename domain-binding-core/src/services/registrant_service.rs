//! Registrant (WHOIS) lookup with fixed retry

use std::sync::Arc;

use regex::Regex;

use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::types::WhoisRecord;

/// Lines that mean the registry has no record for the name.
const NO_MATCH: &str =
    r"(?i)^\s*(no match|not found|no data found|no entries found|domain not found)";

/// Registrant lookup service
pub struct RegistrantLookupService {
    ctx: Arc<ServiceContext>,
}

impl RegistrantLookupService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Look up and parse the registrant record.
    ///
    /// Every failure is retried up to `max_attempts` times with a fixed
    /// `retry_interval` between attempts. `Ok(None)` means the registry
    /// reported no match.
    pub async fn lookup(&self, domain_name: &str) -> CoreResult<Option<WhoisRecord>> {
        let max_attempts = self.ctx.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.ctx.registrant_lookup.lookup(domain_name).await {
                Ok(raw) => return Ok(parse_whois_record(domain_name, &raw)),
                Err(e) if attempt < max_attempts => {
                    log::warn!(
                        "WHOIS lookup for {domain_name} failed (attempt {attempt}/{max_attempts}): {e}"
                    );
                    tokio::time::sleep(self.ctx.config.retry_interval()).await;
                    attempt += 1;
                }
                Err(e) => {
                    log::error!(
                        "WHOIS lookup for {domain_name} failed after {max_attempts} attempts: {e}"
                    );
                    return Err(e.into());
                }
            }
        }
    }
}

/// Parse a line-oriented `key: value` WHOIS record.
///
/// Returns `None` as soon as a no-match marker line is seen. Keys are matched
/// case-insensitively and the first value of each field wins; anything else is
/// ignored.
pub fn parse_whois_record(domain_name: &str, raw: &str) -> Option<WhoisRecord> {
    let mut record = WhoisRecord {
        domain_name: domain_name.to_string(),
        ..WhoisRecord::default()
    };
    let no_match = match Regex::new(NO_MATCH) {
        Ok(re) => Some(re),
        Err(e) => {
            log::error!("Invalid WHOIS no-match pattern: {e}");
            None
        }
    };

    for line in raw.lines() {
        if no_match.as_ref().is_some_and(|re| re.is_match(line)) {
            return None;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let slot = match key.trim().to_ascii_lowercase().as_str() {
            "registrar" | "registrar name" | "sponsoring registrar" => &mut record.registrar,
            "registrant name" | "registrant" => &mut record.registrant_name,
            "registrant organization" | "registrant organisation" => {
                &mut record.registrant_organization
            }
            "registrant country" => &mut record.registrant_country,
            "registrant email" => &mut record.registrant_email,
            "admin email" => &mut record.admin_email,
            "tech email" => &mut record.tech_email,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::test_utils::{
        REGISTERED_WHOIS, TestOptions, create_test_context, create_test_context_with,
        whois_network_error,
    };
    use crate::config::WorkflowConfig;

    #[test]
    fn no_match_pattern_compiles() {
        assert!(Regex::new(NO_MATCH).is_ok());
    }

    #[test]
    fn parses_known_fields() {
        let record = parse_whois_record("example.com", REGISTERED_WHOIS).unwrap();
        assert_eq!(record.domain_name, "example.com");
        assert_eq!(record.registrar.as_deref(), Some("Example Registrar, Inc."));
        assert_eq!(record.registrant_name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.registrant_organization.as_deref(), Some("Example Org"));
        assert_eq!(record.registrant_country.as_deref(), Some("US"));
        assert_eq!(record.registrant_email.as_deref(), Some("owner@example.com"));
        assert_eq!(record.admin_email.as_deref(), Some("admin@example.com"));
        assert_eq!(record.tech_email.as_deref(), Some("tech@example.com"));
    }

    #[test]
    fn no_match_markers_yield_none() {
        for raw in [
            "No match for \"MISSING-ANYTHING.NET\".\n>>> Last update of whois database",
            "NOT FOUND\n",
            "  No Data Found\n",
            "% header\nno entries found for the selected source(s).\n",
            "Domain not found.\n",
        ] {
            assert!(parse_whois_record("missing-anything.net", raw).is_none(), "{raw:?}");
        }
    }

    #[test]
    fn keys_are_case_insensitive_and_first_wins() {
        let raw = "REGISTRAR: First\nregistrar: Second\nREGISTRANT EMAIL:  a@b.c \n";
        let record = parse_whois_record("example.com", raw).unwrap();
        assert_eq!(record.registrar.as_deref(), Some("First"));
        assert_eq!(record.registrant_email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn garbage_lines_are_ignored() {
        let raw = ">>> junk <<<\n\nRegistrar:\nnot a pair\nTech Email: t@example.com\n";
        let record = parse_whois_record("example.com", raw).unwrap();
        assert!(record.registrar.is_none());
        assert_eq!(record.tech_email.as_deref(), Some("t@example.com"));
    }

    #[test]
    fn marker_must_start_the_line() {
        let raw = "Registrar: Not Found Holdings\n";
        let record = parse_whois_record("example.com", raw).unwrap();
        assert_eq!(record.registrar.as_deref(), Some("Not Found Holdings"));
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let h = create_test_context();
        h.lookup.push(Err(whois_network_error())).await;
        h.lookup.push(Err(whois_network_error())).await;

        let svc = RegistrantLookupService::new(h.ctx.clone());
        let record = svc.lookup("example.com").await.unwrap();
        assert!(record.is_some());
        assert_eq!(h.lookup.calls().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_five_attempts() {
        let h = create_test_context_with(TestOptions {
            config: WorkflowConfig::default(),
            ..TestOptions::default()
        });
        h.lookup.set_fallback(Err(whois_network_error())).await;

        let svc = RegistrantLookupService::new(h.ctx.clone());
        let started = tokio::time::Instant::now();
        let result = svc.lookup("example.com").await;

        assert!(matches!(result, Err(CoreError::Provider(_))));
        assert_eq!(h.lookup.calls().await, 5);
        // four 1s pauses, none after the last attempt
        let elapsed = started.elapsed();
        assert!(elapsed >= std::time::Duration::from_secs(4));
        assert!(elapsed < std::time::Duration::from_secs(5));
    }

    #[tokio::test]
    async fn no_match_is_not_retried() {
        let h = create_test_context();
        h.lookup
            .set_fallback(Ok("No match for \"MISSING-ANYTHING.NET\".".into()))
            .await;

        let svc = RegistrantLookupService::new(h.ctx.clone());
        assert!(svc.lookup("missing-anything.net").await.unwrap().is_none());
        assert_eq!(h.lookup.calls().await, 1);
    }
}
