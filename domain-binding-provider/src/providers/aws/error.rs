//! AWS 错误映射
//!
//! ACM 错误来自 JSON body 的 `__type`，`CloudFront` 错误来自 XML `<Code>`，
//! 两者共用同一张映射表。
//!
//! 参考:
//! - <https://docs.aws.amazon.com/acm/latest/APIReference/CommonErrors.html>
//! - <https://docs.aws.amazon.com/cloudfront/latest/APIReference/CommonErrors.html>

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::AwsProvider;

impl ProviderErrorMapper for AwsProvider {
    fn provider_name(&self) -> &'static str {
        "aws"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        let resource = context
            .resource
            .clone()
            .or_else(|| context.domain.clone())
            .unwrap_or_default();

        match raw.code.as_deref() {
            // ============ 认证错误 ============
            Some(
                "UnrecognizedClientException"
                | "InvalidClientTokenId"
                | "InvalidSignatureException"
                | "SignatureDoesNotMatch"
                | "IncompleteSignature"
                | "MissingAuthenticationToken"
                | "ExpiredToken"
                | "ExpiredTokenException",
            ) => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },

            // ============ 权限拒绝 ============
            Some("AccessDenied" | "AccessDeniedException" | "NotAuthorized") => {
                ProviderError::PermissionDenied {
                    provider,
                    raw_message: Some(raw.message),
                }
            }

            // ============ 频率限制 ============
            Some("ThrottlingException" | "Throttling" | "TooManyRequestsException") => {
                ProviderError::RateLimited {
                    provider,
                    retry_after: None,
                    raw_message: Some(raw.message),
                }
            }

            // ============ 配额超限 ============
            Some(
                "LimitExceededException"
                | "TooManyDistributions"
                | "TooManyDistributionCNAMEs"
                | "TooManyCertificates",
            ) => ProviderError::QuotaExceeded {
                provider,
                raw_message: Some(raw.message),
            },

            // ============ 资源不存在 ============
            Some(
                "ResourceNotFoundException"
                | "NoSuchDistribution"
                | "NoSuchResource"
                | "InvalidArnException",
            ) => ProviderError::ResourceNotFound {
                provider,
                resource,
                raw_message: Some(raw.message),
            },

            // ============ 资源占用 / 状态冲突 ============
            Some(
                "ResourceInUseException"
                | "DistributionNotDisabled"
                | "PreconditionFailed"
                | "InvalidIfMatchVersion"
                | "CNAMEAlreadyExists"
                | "DistributionAlreadyExists"
                | "RequestInProgressException"
                | "ConflictException",
            ) => ProviderError::ResourceInUse {
                provider,
                resource,
                raw_message: Some(raw.message),
            },

            // ============ 参数错误 ============
            Some("InvalidDomainValidationOptionsException") => ProviderError::InvalidParameter {
                provider,
                param: "domain".to_string(),
                detail: raw.message,
            },
            Some(
                "InvalidParameterException"
                | "ValidationException"
                | "InvalidArgument"
                | "InvalidViewerCertificate"
                | "InvalidStateException"
                | "IllegalUpdate",
            ) => ProviderError::InvalidParameter {
                provider,
                param: context.domain.unwrap_or_else(|| "request".to_string()),
                detail: raw.message,
            },

            // ============ 服务端错误 ============
            Some("InternalFailure" | "ServiceUnavailable" | "ServiceUnavailableException") => {
                ProviderError::NetworkError {
                    provider,
                    detail: raw.message,
                }
            }

            _ => self.unknown_error(raw),
        }
    }
}
