//! Certificate record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use domain_binding_provider::CertificateStatus;

/// Locally cached certificate status.
///
/// `Pending` before the authority has been polled, the authority's own status
/// afterwards, and `Deployed` once a distribution uses the certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CertificateRecordStatus {
    Pending,
    Authority(CertificateStatus),
    Deployed,
}

impl CertificateRecordStatus {
    /// Whether the certificate can never become usable.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Authority(status) if status.is_terminal_failure())
    }
}

impl From<String> for CertificateRecordStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pending" => Self::Pending,
            "Deployed" => Self::Deployed,
            _ => Self::Authority(CertificateStatus::from(value)),
        }
    }
}

impl From<CertificateRecordStatus> for String {
    fn from(value: CertificateRecordStatus) -> Self {
        match value {
            CertificateRecordStatus::Pending => "Pending".to_string(),
            CertificateRecordStatus::Deployed => "Deployed".to_string(),
            CertificateRecordStatus::Authority(s) => s.into(),
        }
    }
}

/// A certificate owned by an organization, requested through the workflow or uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Authority-assigned id.
    pub certificate_id: String,
    pub org_id: String,
    pub name: String,
    /// `*.{domain}` for workflow certificates.
    pub common_name: String,
    pub alt_names: Vec<String>,
    pub status: CertificateRecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Certificate {
    /// Wildcard common name for a bare domain.
    pub fn wildcard_for(domain_name: &str) -> String {
        format!("*.{domain_name}")
    }

    /// Record for a freshly requested wildcard certificate.
    #[must_use]
    pub fn requested(certificate_id: String, org_id: &str, domain_name: &str) -> Self {
        let now = Utc::now();
        Self {
            certificate_id,
            org_id: org_id.to_string(),
            name: domain_name.to_string(),
            common_name: Self::wildcard_for(domain_name),
            alt_names: vec![domain_name.to_string()],
            status: CertificateRecordStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this certificate is the wildcard match for `domain_name`.
    pub fn covers(&self, domain_name: &str) -> bool {
        self.common_name == Self::wildcard_for(domain_name)
    }

    pub fn is_owned_by(&self, org_id: &str) -> bool {
        self.org_id == org_id
    }

    pub fn set_status(&mut self, status: CertificateRecordStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
