use serde::{Deserialize, Serialize};

// ============ Provider Types ============

/// Identifies which edge provider implementation to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// AWS Certificate Manager + `CloudFront`. Requires feature `aws`.
    Aws,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
        }
    }
}

// ============ Certificate Types ============

/// Lifecycle status of a certificate as reported by the certificate authority.
///
/// Serialized using the authority's own status strings (`"PENDING_VALIDATION"`,
/// `"ISSUED"`, ...). Statuses this crate does not know about are preserved in
/// [`Other`](Self::Other) instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CertificateStatus {
    /// Waiting for the domain owner to approve the validation email.
    PendingValidation,
    /// Validated and usable.
    Issued,
    /// The validation window closed without approval.
    ValidationTimedOut,
    /// Issued but no longer in use.
    Inactive,
    /// Past its expiry date.
    Expired,
    /// Revoked by the authority.
    Revoked,
    /// Issuance failed.
    Failed,
    /// Any status string not covered above.
    Other(String),
}

impl CertificateStatus {
    /// The authority's wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::PendingValidation => "PENDING_VALIDATION",
            Self::Issued => "ISSUED",
            Self::ValidationTimedOut => "VALIDATION_TIMED_OUT",
            Self::Inactive => "INACTIVE",
            Self::Expired => "EXPIRED",
            Self::Revoked => "REVOKED",
            Self::Failed => "FAILED",
            Self::Other(s) => s,
        }
    }

    /// Whether the certificate can never become usable.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::ValidationTimedOut | Self::Failed | Self::Revoked | Self::Expired
        )
    }
}

impl From<String> for CertificateStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PENDING_VALIDATION" => Self::PendingValidation,
            "ISSUED" => Self::Issued,
            "VALIDATION_TIMED_OUT" => Self::ValidationTimedOut,
            "INACTIVE" => Self::Inactive,
            "EXPIRED" => Self::Expired,
            "REVOKED" => Self::Revoked,
            "FAILED" => Self::Failed,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for CertificateStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<CertificateStatus> for String {
    fn from(value: CertificateStatus) -> Self {
        match value {
            CertificateStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certificate details returned by the authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDetail {
    /// Authority-assigned certificate identifier (ARN for AWS).
    pub certificate_id: String,
    /// Primary name on the certificate (e.g. `"*.example.com"`).
    pub domain_name: String,
    /// Additional names covered by the certificate.
    #[serde(default)]
    pub subject_alternative_names: Vec<String>,
    /// Current lifecycle status.
    pub status: CertificateStatus,
}

/// Request to import an externally issued certificate.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCertificateRequest {
    /// Display name attached to the imported certificate.
    pub name: String,
    /// PEM encoded private key.
    pub private_key: String,
    /// PEM encoded leaf certificate.
    pub certificate_body: String,
    /// PEM encoded intermediate chain.
    pub certificate_chain: Option<String>,
}

impl std::fmt::Debug for UploadCertificateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCertificateRequest")
            .field("name", &self.name)
            .field("private_key", &"[redacted]")
            .field("certificate_body_len", &self.certificate_body.len())
            .field(
                "certificate_chain_len",
                &self.certificate_chain.as_ref().map(String::len),
            )
            .finish()
    }
}

// ============ CDN Types ============

/// Deployment status of a CDN distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CdnStatus {
    /// Configuration is still propagating to edge locations.
    InProgress,
    /// Fully deployed and serving traffic.
    Deployed,
    /// Any status string not covered above.
    Other(String),
}

impl CdnStatus {
    /// The CDN's wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => "InProgress",
            Self::Deployed => "Deployed",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for CdnStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "InProgress" => Self::InProgress,
            "Deployed" => Self::Deployed,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for CdnStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<CdnStatus> for String {
    fn from(value: CdnStatus) -> Self {
        match value {
            CdnStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for CdnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CDN distribution created for a custom domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdnDistribution {
    /// Provider-assigned distribution identifier.
    pub distribution_id: String,
    /// Hostname the customer should point a CNAME at.
    pub domain_name: String,
    /// Current deployment status.
    pub status: CdnStatus,
}

// ============ Credential Types ============

/// Type-safe credential container for all supported edge providers.
///
/// # Serialization
///
/// Serialized as a tagged enum with `"provider"` as the tag and `"credentials"` as the content:
///
/// ```json
/// { "provider": "aws", "credentials": { "access_key_id": "...", "secret_access_key": "..." } }
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// AWS credentials.
    #[serde(rename = "aws")]
    Aws {
        /// IAM access key id.
        access_key_id: String,
        /// IAM secret access key.
        secret_access_key: String,
        /// STS session token for temporary credentials.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_token: Option<String>,
    },
}

impl ProviderCredentials {
    /// Returns the [`ProviderType`] corresponding to this credential variant.
    pub fn provider_type(&self) -> ProviderType {
        match self {
            Self::Aws { .. } => ProviderType::Aws,
        }
    }
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aws {
                access_key_id,
                session_token,
                ..
            } => f
                .debug_struct("Aws")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"[redacted]")
                .field("session_token", &session_token.as_ref().map(|_| "[redacted]"))
                .finish(),
        }
    }
}

// ============ Provider Configuration ============

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_price_class() -> String {
    "PriceClass_100".to_string()
}

const fn default_max_retries() -> u32 {
    2
}

/// Everything needed to build an edge provider.
///
/// Passed to [`create_provider()`](crate::create_provider).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Authentication material; also selects the backend.
    pub credentials: ProviderCredentials,
    /// Region used for certificate requests. CDN certificates must live in `us-east-1`.
    #[serde(default = "default_region")]
    pub region: String,
    /// Origin host every distribution forwards to.
    pub origin_domain: String,
    /// CDN price class applied to new distributions.
    #[serde(default = "default_price_class")]
    pub price_class: String,
    /// Automatic retries for transient HTTP failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl ProviderConfig {
    /// Builds a config with default region, price class and retry count.
    pub fn new(credentials: ProviderCredentials, origin_domain: impl Into<String>) -> Self {
        Self {
            credentials,
            region: default_region(),
            origin_domain: origin_domain.into(),
            price_class: default_price_class(),
            max_retries: default_max_retries(),
        }
    }
}
