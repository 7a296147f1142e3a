//! Edge provider implementations

/// Shared utilities used by provider implementations.
#[cfg(feature = "aws")]
pub mod common;

#[cfg(feature = "aws")]
mod aws;

#[cfg(feature = "aws")]
pub use aws::{AwsProvider, AwsProviderBuilder};
