//! 类型定义模块

mod application;
mod availability;
mod certificate;
mod domain;

pub use application::AppBinding;
pub use availability::{AvailabilityResult, ValidationHint, WhoisRecord};
pub use certificate::{Certificate, CertificateRecordStatus};
pub use domain::{Domain, DomainStatus, DomainView};

// Re-export provider 库的公共类型
pub use domain_binding_provider::{
    CdnDistribution, CdnStatus, CertificateDetail, CertificateStatus, UploadCertificateRequest,
};
