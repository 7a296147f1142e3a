//! Application domain binding

use serde::{Deserialize, Serialize};

/// The custom-domain fields of a hosted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppBinding {
    pub app_id: String,
    pub org_id: String,
    /// Bound custom domain, if any.
    pub domain_name: Option<String>,
    /// Label under `domain_name` the app is served at.
    pub sub_domain: Option<String>,
}

impl AppBinding {
    /// Drop the custom domain binding.
    pub fn clear_domain(&mut self) {
        self.domain_name = None;
        self.sub_domain = None;
    }

    pub fn is_bound(&self) -> bool {
        self.domain_name.is_some()
    }
}
