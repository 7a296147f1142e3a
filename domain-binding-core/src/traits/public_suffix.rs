//! Public-suffix classification
//!
//! Used to reject subdomains and malformed names before any provider call.

use std::path::Path;

use publicsuffix::Psl as _;

use crate::error::{CoreError, CoreResult};

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A host name split around its public suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDomain {
    /// Registrable domain (one label + suffix), `None` if the name is itself a suffix.
    pub domain: Option<String>,
    pub suffix: String,
    /// Labels left of the registrable domain.
    pub subdomain: Option<String>,
    /// Whether the suffix came from an explicit rule rather than the `*` default.
    pub listed: bool,
}

/// Public-suffix classifier
pub trait PublicSuffixClassifier: Send + Sync {
    /// Whether `name` is a bare registrable domain under a known suffix.
    fn is_valid_domain(&self, name: &str) -> bool;

    /// Split a syntactically valid host name. `None` for malformed names.
    fn parse(&self, name: &str) -> Option<ParsedDomain>;
}

enum SuffixSource {
    /// Snapshot compiled into the `psl` crate.
    Bundled,
    /// List text loaded at runtime.
    Loaded(publicsuffix::List),
}

/// Classifier over the Public Suffix List.
///
/// The bundled snapshot covers every ICANN and private suffix; a downloaded
/// `public_suffix_list.dat` can replace it via [`from_file`](Self::from_file).
pub struct SuffixListClassifier {
    source: SuffixSource,
}

impl SuffixListClassifier {
    /// Classifier over the list bundled with the `psl` crate.
    pub fn embedded() -> Self {
        Self {
            source: SuffixSource::Bundled,
        }
    }

    /// Parse list text in Public Suffix List format.
    pub fn from_list(text: &str) -> CoreResult<Self> {
        let rules = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("//"))
            .count();
        if rules == 0 {
            return Err(CoreError::ValidationError(
                "public suffix list contains no rules".to_string(),
            ));
        }

        let list: publicsuffix::List = text.parse().map_err(|e| {
            CoreError::ValidationError(format!("invalid public suffix list: {e}"))
        })?;
        log::debug!("Parsed public suffix list with {rules} rules");
        Ok(Self {
            source: SuffixSource::Loaded(list),
        })
    }

    /// Load a list file (e.g. a full `public_suffix_list.dat` download).
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ValidationError(format!(
                "failed to read public suffix list {}: {e}",
                path.display()
            ))
        })?;
        Self::from_list(&text).map_err(|e| match e {
            CoreError::ValidationError(msg) => {
                CoreError::ValidationError(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Byte length of the public suffix of `name`, and whether a listed rule matched.
    fn suffix_of(&self, name: &str) -> Option<(usize, bool)> {
        match &self.source {
            SuffixSource::Bundled => {
                psl::suffix(name.as_bytes()).map(|s| (s.as_bytes().len(), s.is_known()))
            }
            SuffixSource::Loaded(list) => list
                .suffix(name.as_bytes())
                .map(|s| (s.as_bytes().len(), s.is_known())),
        }
    }
}

impl PublicSuffixClassifier for SuffixListClassifier {
    fn is_valid_domain(&self, name: &str) -> bool {
        self.parse(name)
            .is_some_and(|p| p.listed && p.subdomain.is_none() && p.domain.is_some())
    }

    fn parse(&self, name: &str) -> Option<ParsedDomain> {
        let name = name.trim().trim_end_matches('.').to_ascii_lowercase();
        if !is_valid_hostname(&name) {
            return None;
        }

        let (suffix_bytes, listed) = self.suffix_of(&name)?;
        let suffix = name.get(name.len().checked_sub(suffix_bytes)?..)?.to_string();
        let suffix_labels = suffix.split('.').count();

        let labels: Vec<&str> = name.split('.').collect();
        let split = labels.len().checked_sub(suffix_labels)?;

        if split == 0 {
            return Some(ParsedDomain {
                domain: None,
                suffix,
                subdomain: None,
                listed,
            });
        }

        let domain = labels[split - 1..].join(".");
        let subdomain = (split > 1).then(|| labels[..split - 1].join("."));
        Some(ParsedDomain {
            domain: Some(domain),
            suffix,
            subdomain,
            listed,
        })
    }
}

/// Host-name syntax: dot-separated LDH labels.
fn is_valid_hostname(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}
