use async_trait::async_trait;

#[cfg(feature = "aws")]
use crate::error::ProviderError;
use crate::error::Result;
use crate::types::{
    CdnDistribution, CdnStatus, CertificateDetail, CertificateStatus, UploadCertificateRequest,
};

/// 原始 API 错误（内部使用）
#[cfg(feature = "aws")]
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（各 Provider 格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

#[cfg(feature = "aws")]
impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[cfg(feature = "aws")]
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 证书 ID / 分发 ID（用于 `ResourceNotFound` / `ResourceInUse`）
    pub resource: Option<String>,
    /// 域名（用于参数错误）
    pub domain: Option<String>,
}

#[cfg(feature = "aws")]
impl ErrorContext {
    pub fn resource(id: impl Into<String>) -> Self {
        Self {
            resource: Some(id.into()),
            domain: None,
        }
    }

    pub fn domain(name: impl Into<String>) -> Self {
        Self {
            resource: None,
            domain: Some(name.into()),
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
/// 各 Provider 实现此 trait 以将原始 API 错误映射到统一错误类型
#[cfg(feature = "aws")]
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Certificate authority + CDN provider.
///
/// One implementation covers both concerns because the CDN can only attach
/// certificates issued or imported through the same account.
#[async_trait]
pub trait EdgeProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// Requests a wildcard certificate `*.{domain}` (plus the apex as SAN),
    /// validated by email. Returns the certificate id.
    async fn request_wildcard_certificate(&self, domain: &str) -> Result<String>;

    /// Fetches certificate details.
    async fn describe_certificate(&self, certificate_id: &str) -> Result<CertificateDetail>;

    /// Fetches only the certificate status.
    async fn get_certificate_status(&self, certificate_id: &str) -> Result<CertificateStatus> {
        Ok(self.describe_certificate(certificate_id).await?.status)
    }

    /// Imports an externally issued certificate.
    async fn upload_certificate(
        &self,
        req: &UploadCertificateRequest,
    ) -> Result<CertificateDetail>;

    /// Deletes a certificate. Fails with `ResourceInUse` while a distribution references it.
    async fn delete_certificate(&self, certificate_id: &str) -> Result<()>;

    /// Re-sends the approval email for a pending certificate.
    async fn resend_validation_email(&self, domain: &str, certificate_id: &str) -> Result<()>;

    /// Creates a distribution serving `*.{domain}` with the given certificate.
    async fn create_cdn_distribution(
        &self,
        domain: &str,
        certificate_id: &str,
    ) -> Result<CdnDistribution>;

    /// Fetches the deployment status of a distribution.
    async fn get_cdn_distribution_status(&self, distribution_id: &str) -> Result<CdnStatus>;

    /// Deletes a distribution, disabling it first when required.
    async fn delete_cdn_distribution(&self, distribution_id: &str) -> Result<()>;
}
