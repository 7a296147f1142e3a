//! Domain availability check result

use serde::{Deserialize, Serialize};

use super::domain::Domain;

/// Certificate state of a resumable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationHint {
    CertNotApproved,
    ValidationTimedOut,
}

/// Registrant contact fields parsed from a WHOIS record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoisRecord {
    pub domain_name: String,
    pub registrar: Option<String>,
    pub registrant_name: Option<String>,
    pub registrant_organization: Option<String>,
    pub registrant_country: Option<String>,
    pub registrant_email: Option<String>,
    pub admin_email: Option<String>,
    pub tech_email: Option<String>,
}

/// Outcome of `check_availability`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub domain_name: String,
    pub available: bool,
    /// Present when the caller's organization already owns the domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_domain: Option<Domain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_hint: Option<ValidationHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisRecord>,
}

impl AvailabilityResult {
    pub fn taken(domain_name: &str) -> Self {
        Self {
            domain_name: domain_name.to_string(),
            available: false,
            existing_domain: None,
            validation_hint: None,
            whois: None,
        }
    }

    pub fn resumable(domain: Domain, hint: Option<ValidationHint>) -> Self {
        Self {
            domain_name: domain.domain_name.clone(),
            available: false,
            existing_domain: Some(domain),
            validation_hint: hint,
            whois: None,
        }
    }

    pub fn available(whois: WhoisRecord) -> Self {
        Self {
            domain_name: whois.domain_name.clone(),
            available: true,
            existing_domain: None,
            validation_hint: None,
            whois: Some(whois),
        }
    }
}
