//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use domain_binding_provider::ProviderError;

/// Core layer error type
///
/// Serialized as `{"code": "<camelCaseVariant>", "details": ...}` so callers can
/// branch on `code` without parsing messages.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details", rename_all = "camelCase")]
pub enum CoreError {
    /// Not a bare registrable domain under a known public suffix
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    /// A domain record with this name already exists
    #[error("Domain is not available: {0}")]
    DomainNotAvailable(String),

    /// Domain record not found
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// Certificate record not found
    #[error("Certificate not found: {0}")]
    CertificateNotFound(String),

    /// The record belongs to another organization
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Validation email not approved yet
    #[error("Certificate for {0} has not been approved yet")]
    CertNotApproved(String),

    /// Validation window closed; the email must be resent
    #[error("Certificate validation for {0} timed out")]
    ValidationTimedOut(String),

    /// Any other non-issued certificate status at confirm time
    #[error("Certificate for {domain} is not issued (status: {status})")]
    CertificateNotIssued { domain: String, status: String },

    /// The certificate's common name is not the wildcard for the domain
    #[error("Certificate {certificate_id} does not cover {domain}")]
    CertificateMismatch {
        certificate_id: String,
        domain: String,
    },

    /// Certificate still referenced by a domain
    #[error("Certificate {0} is still in use")]
    CertificateInUse(String),

    /// Registrant lookup reported no match for an otherwise available domain
    #[error("No WHOIS record for {domain}")]
    NoWhoisRecord { domain: String, available: bool },

    /// Name collides with a pre-migration registry entry
    #[error("Domain {0} is registered in the legacy registry")]
    LegacyDomainRegistered(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    #[serde(rename = "providerError")]
    Provider(#[from] ProviderError),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// Stable machine-readable code, identical to the serialized `code` tag.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDomainName(_) => "invalidDomainName",
            Self::DomainNotAvailable(_) => "domainNotAvailable",
            Self::DomainNotFound(_) => "domainNotFound",
            Self::CertificateNotFound(_) => "certificateNotFound",
            Self::Forbidden(_) => "forbidden",
            Self::CertNotApproved(_) => "certNotApproved",
            Self::ValidationTimedOut(_) => "validationTimedOut",
            Self::CertificateNotIssued { .. } => "certificateNotIssued",
            Self::CertificateMismatch { .. } => "certificateMismatch",
            Self::CertificateInUse(_) => "certificateInUse",
            Self::NoWhoisRecord { .. } => "noWhoisRecord",
            Self::LegacyDomainRegistered(_) => "legacyDomainRegistered",
            Self::Provider(_) => "providerError",
            Self::StorageError(_) => "storageError",
            Self::ValidationError(_) => "validationError",
        }
    }

    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_expected(),
            Self::StorageError(_) => false,
            _ => true,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
