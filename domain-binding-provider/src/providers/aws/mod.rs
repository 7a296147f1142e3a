//! AWS Certificate Manager + `CloudFront` provider

mod acm;
mod cloudfront;
mod error;
mod provider;
mod sign;
/// ACM request/response types and `CloudFront` XML helpers.
pub(crate) mod types;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::create_http_client;

/// `CloudFront` is a global service signed against this region.
pub(crate) const CLOUDFRONT_REGION: &str = "us-east-1";
/// `CloudFront` API host.
pub(crate) const CLOUDFRONT_HOST: &str = "cloudfront.amazonaws.com";
/// `CloudFront` API version prefix.
pub(crate) const CLOUDFRONT_API_VERSION: &str = "2020-05-31";
/// Managed `CachingOptimized` cache policy.
pub(crate) const CACHING_OPTIMIZED_POLICY_ID: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";

/// AWS edge provider: ACM for certificates, `CloudFront` for distribution.
///
/// Authenticates via Signature Version 4.
///
/// # Construction
///
/// ```rust,no_run
/// use domain_binding_provider::AwsProvider;
///
/// let provider = AwsProvider::builder(
///     "your-access-key-id".to_string(),
///     "your-secret-access-key".to_string(),
///     "apps.example.net".to_string(),
/// )
/// .region("us-east-1")
/// .build();
/// ```
pub struct AwsProvider {
    pub(crate) client: Client,
    pub(crate) access_key_id: String,
    pub(crate) secret_access_key: String,
    pub(crate) session_token: Option<String>,
    pub(crate) region: String,
    pub(crate) origin_domain: String,
    pub(crate) price_class: String,
    pub(crate) max_retries: u32,
}

/// Builder for [`AwsProvider`].
pub struct AwsProviderBuilder {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    region: String,
    origin_domain: String,
    price_class: String,
    max_retries: u32,
}

impl AwsProviderBuilder {
    fn new(access_key_id: String, secret_access_key: String, origin_domain: String) -> Self {
        Self {
            access_key_id,
            secret_access_key,
            session_token: None,
            region: CLOUDFRONT_REGION.to_string(),
            origin_domain,
            price_class: "PriceClass_100".to_string(),
            max_retries: 2,
        }
    }

    /// Set the ACM region (default: `us-east-1`).
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Attach an STS session token.
    pub fn session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }

    /// Set the `CloudFront` price class (default: `PriceClass_100`).
    pub fn price_class(mut self, price_class: impl Into<String>) -> Self {
        self.price_class = price_class.into();
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the [`AwsProvider`] instance.
    pub fn build(self) -> Result<AwsProvider> {
        Ok(AwsProvider {
            client: create_http_client("aws")?,
            access_key_id: self.access_key_id,
            secret_access_key: self.secret_access_key,
            session_token: self.session_token,
            region: self.region,
            origin_domain: self.origin_domain,
            price_class: self.price_class,
            max_retries: self.max_retries,
        })
    }
}

impl AwsProvider {
    /// Creates a provider with default settings (`us-east-1`, 2 retries).
    pub fn new(
        access_key_id: String,
        secret_access_key: String,
        origin_domain: String,
    ) -> Result<Self> {
        Self::builder(access_key_id, secret_access_key, origin_domain).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(
        access_key_id: String,
        secret_access_key: String,
        origin_domain: String,
    ) -> AwsProviderBuilder {
        AwsProviderBuilder::new(access_key_id, secret_access_key, origin_domain)
    }

    pub(crate) fn acm_host(&self) -> String {
        format!("acm.{}.amazonaws.com", self.region)
    }
}
