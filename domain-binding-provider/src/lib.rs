//! # domain-binding-provider
//!
//! Certificate authority and CDN abstraction used to bind custom domains to
//! hosted applications.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Certificates | Distribution | Auth Method |
//! |----------|-------------|--------------|--------------|-------------|
//! | [AWS](https://aws.amazon.com/) | `aws` | ACM (JSON 1.1) | `CloudFront` (REST/XML) | Signature V4 |
//!
//! ## Feature Flags
//!
//! - **`aws`** *(default)*: Enable the AWS provider.
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use domain_binding_provider::{
//!     create_provider, CertificateStatus, EdgeProvider, ProviderConfig, ProviderCredentials,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = create_provider(ProviderConfig::new(
//!         ProviderCredentials::Aws {
//!             access_key_id: "AKID".to_string(),
//!             secret_access_key: "secret".to_string(),
//!             session_token: None,
//!         },
//!         "apps.example.net",
//!     ))?;
//!
//!     // 1. Request *.example.com, validated by email
//!     let cert_id = provider.request_wildcard_certificate("example.com").await?;
//!
//!     // 2. Once approved, put a distribution in front of it
//!     if provider.get_certificate_status(&cert_id).await? == CertificateStatus::Issued {
//!         let dist = provider.create_cdn_distribution("example.com", &cert_id).await?;
//!         println!("CNAME *.example.com -> {}", dist.domain_name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All provider operations return [`Result<T, ProviderError>`](ProviderError).
//!
//! - [`ProviderError::InvalidCredentials`]: authentication failed
//! - [`ProviderError::ResourceNotFound`]: certificate or distribution not found
//! - [`ProviderError::ResourceInUse`]: still referenced or not yet disabled
//! - [`ProviderError::RateLimited`]: API rate limit exceeded (retryable)
//! - [`ProviderError::NetworkError`]: network connectivity issue (retryable)
//!
//! Transient errors (`NetworkError`, `Timeout`, `RateLimited`) are automatically
//! retried with exponential backoff.

mod error;
mod factory;
#[cfg(feature = "aws")]
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::create_provider;

// Re-export core trait only (internal traits are not exported)
pub use traits::EdgeProvider;

// Re-export types
pub use types::{
    CdnDistribution, CdnStatus, CertificateDetail, CertificateStatus, ProviderConfig,
    ProviderCredentials, ProviderType, UploadCertificateRequest,
};

// Re-export log helpers for callers that log provider payloads
pub use utils::log_sanitizer;

// Re-export concrete providers (behind feature flags)
#[cfg(feature = "aws")]
pub use providers::{AwsProvider, AwsProviderBuilder};
