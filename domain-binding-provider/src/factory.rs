//! Provider factory.

use std::sync::Arc;

use crate::error::Result;
use crate::traits::EdgeProvider;
use crate::types::ProviderConfig;

#[cfg(feature = "aws")]
use crate::providers::AwsProvider;
#[cfg(feature = "aws")]
use crate::types::ProviderCredentials;

/// Creates an [`EdgeProvider`] instance from the given configuration.
///
/// The concrete provider type is determined by the [`ProviderCredentials`](crate::ProviderCredentials)
/// variant. The returned provider is wrapped in `Arc<dyn EdgeProvider>` for easy sharing
/// across async tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use domain_binding_provider::{create_provider, ProviderConfig, ProviderCredentials};
///
/// let config = ProviderConfig::new(
///     ProviderCredentials::Aws {
///         access_key_id: "AKID".to_string(),
///         secret_access_key: "secret".to_string(),
///         session_token: None,
///     },
///     "apps.example.net",
/// );
/// let provider = create_provider(config).unwrap();
/// ```
pub fn create_provider(config: ProviderConfig) -> Result<Arc<dyn EdgeProvider>> {
    match config.credentials {
        #[cfg(feature = "aws")]
        ProviderCredentials::Aws {
            access_key_id,
            secret_access_key,
            session_token,
        } => {
            let provider = AwsProvider::builder(access_key_id, secret_access_key, config.origin_domain)
                .session_token(session_token)
                .region(config.region)
                .price_class(config.price_class)
                .max_retries(config.max_retries)
                .build()?;
            Ok(Arc::new(provider))
        }
        #[cfg(not(feature = "aws"))]
        credentials => Err(crate::error::ProviderError::InvalidParameter {
            provider: credentials.provider_type().to_string(),
            param: "provider".to_string(),
            detail: "provider support is not compiled in".to_string(),
        }),
    }
}

#[cfg(all(test, feature = "aws"))]
mod tests {
    use super::*;

    #[test]
    fn creates_aws_provider() {
        let config = ProviderConfig::new(
            ProviderCredentials::Aws {
                access_key_id: "ak".to_string(),
                secret_access_key: "sk".to_string(),
                session_token: None,
            },
            "apps.example.net",
        );
        let provider = create_provider(config);
        assert!(provider.is_ok());
        let Ok(provider) = provider else {
            return;
        };
        assert_eq!(provider.id(), "aws");
    }
}

#[cfg(all(test, not(feature = "aws")))]
mod disabled_tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn aws_credentials_without_feature_are_rejected() {
        let config = ProviderConfig::new(
            ProviderCredentials::Aws {
                access_key_id: "ak".to_string(),
                secret_access_key: "sk".to_string(),
                session_token: None,
            },
            "apps.example.net",
        );
        assert!(matches!(
            create_provider(config),
            Err(ProviderError::InvalidParameter { ref param, .. }) if param == "provider"
        ));
    }
}
