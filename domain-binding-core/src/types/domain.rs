//! Custom domain record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use domain_binding_provider::{CdnStatus, CertificateStatus};

/// Provisioning status of a [`Domain`].
///
/// `Pending -> InProgress -> Deployed`. CDN status strings this crate does not
/// know are kept verbatim in [`Other`](Self::Other).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DomainStatus {
    /// Certificate requested, waiting for validation and confirm.
    Pending,
    /// Distribution created, propagating.
    InProgress,
    /// Distribution live. Terminal.
    Deployed,
    /// Unrecognized CDN status.
    Other(String),
}

impl DomainStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "InProgress",
            Self::Deployed => "Deployed",
            Self::Other(s) => s,
        }
    }

    /// Position in the forward-only progression. Unknown CDN statuses rank with `InProgress`.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InProgress | Self::Other(_) => 1,
            Self::Deployed => 2,
        }
    }

    /// Whether a transition to `next` keeps the status moving forward.
    pub fn can_advance_to(&self, next: &Self) -> bool {
        self != next && next.rank() >= self.rank()
    }

    /// Statuses whose distribution is still worth polling.
    pub fn awaits_distribution(&self) -> bool {
        matches!(self, Self::InProgress | Self::Other(_))
    }
}

impl From<String> for DomainStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pending" => Self::Pending,
            "InProgress" => Self::InProgress,
            "Deployed" => Self::Deployed,
            _ => Self::Other(value),
        }
    }
}

impl From<DomainStatus> for String {
    fn from(value: DomainStatus) -> Self {
        match value {
            DomainStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl From<CdnStatus> for DomainStatus {
    fn from(value: CdnStatus) -> Self {
        match value {
            CdnStatus::InProgress => Self::InProgress,
            CdnStatus::Deployed => Self::Deployed,
            CdnStatus::Other(s) => Self::from(s),
        }
    }
}

impl std::fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A custom domain bound (or being bound) to an organization's applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Bare registrable domain, globally unique.
    pub domain_name: String,
    /// Owning organization. Never changes after creation.
    pub org_id: String,
    /// Wildcard certificate covering `*.{domain_name}`.
    pub certificate_id: Option<String>,
    /// Set by confirm.
    pub cdn_distribution_id: Option<String>,
    /// CNAME target the owner points DNS at. Set by confirm.
    pub dns_value: Option<String>,
    pub status: DomainStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Domain {
    /// A fresh `Pending` record.
    #[must_use]
    pub fn new_pending(
        domain_name: impl Into<String>,
        org_id: impl Into<String>,
        certificate_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            domain_name: domain_name.into(),
            org_id: org_id.into(),
            certificate_id: Some(certificate_id.into()),
            cdn_distribution_id: None,
            dns_value: None,
            status: DomainStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, org_id: &str) -> bool {
        self.org_id == org_id
    }

    /// Set a new status and bump `updated_at`.
    pub fn set_status(&mut self, status: DomainStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// A domain as returned by the list read, with the certificate hint attached
/// to `Pending` entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainView {
    #[serde(flatten)]
    pub domain: Domain,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_status: Option<CertificateStatus>,
}

impl From<Domain> for DomainView {
    fn from(domain: Domain) -> Self {
        Self {
            domain,
            certificate_status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_moves_forward() {
        use DomainStatus::{Deployed, InProgress, Pending};
        assert!(Pending.can_advance_to(&InProgress));
        assert!(InProgress.can_advance_to(&Deployed));
        assert!(!Deployed.can_advance_to(&InProgress));
        assert!(!InProgress.can_advance_to(&Pending));
        assert!(!InProgress.can_advance_to(&InProgress));
    }

    #[test]
    fn unknown_cdn_status_is_preserved() {
        let status = DomainStatus::from(CdnStatus::Other("Disabled".into()));
        assert_eq!(status, DomainStatus::Other("Disabled".into()));
        assert!(status.awaits_distribution());
        assert!(DomainStatus::InProgress.can_advance_to(&status));
        assert!(status.can_advance_to(&DomainStatus::Deployed));
    }

    #[test]
    fn status_serializes_as_plain_string() {
        let json = serde_json::to_string(&DomainStatus::InProgress).unwrap();
        assert_eq!(json, "\"InProgress\"");
        let parsed: DomainStatus = serde_json::from_str("\"Deployed\"").unwrap();
        assert_eq!(parsed, DomainStatus::Deployed);
    }

    #[test]
    fn view_flattens_domain() {
        let mut view = DomainView::from(Domain::new_pending("example.com", "org-1", "cert-1"));
        view.certificate_status = Some(CertificateStatus::PendingValidation);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["domainName"], "example.com");
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["certificateStatus"], "PENDING_VALIDATION");
    }
}
