//! Legacy (pre-migration) domain registry

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::CoreResult;

/// Names registered under the previous system version.
#[async_trait]
pub trait LegacyDomainRegistry: Send + Sync {
    async fn is_registered(&self, domain_name: &str) -> CoreResult<bool>;
}

/// Registry with no entries, for deployments without a legacy system.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLegacyDomains;

#[async_trait]
impl LegacyDomainRegistry for NoLegacyDomains {
    async fn is_registered(&self, _domain_name: &str) -> CoreResult<bool> {
        Ok(false)
    }
}

/// Fixed set of legacy names, matched case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct StaticLegacyRegistry {
    names: HashSet<String>,
}

impl StaticLegacyRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().trim_end_matches('.').to_ascii_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[async_trait]
impl LegacyDomainRegistry for StaticLegacyRegistry {
    async fn is_registered(&self, domain_name: &str) -> CoreResult<bool> {
        Ok(self.names.contains(&domain_name.to_ascii_lowercase()))
    }
}
