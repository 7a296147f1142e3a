//! AWS Signature Version 4

use std::fmt::Write;

use crate::providers::common::{hmac_sha256, sha256_hex};
use crate::utils::log_sanitizer::truncate_for_log;

use super::AwsProvider;

/// Credential scope of a signed request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SigningScope<'a> {
    pub service: &'a str,
    pub region: &'a str,
}

/// The parts of a request that enter the canonical request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SignableRequest<'a> {
    pub method: &'a str,
    pub uri: &'a str,
    pub query: &'a str,
    pub headers: &'a [(String, String)],
    pub payload: &'a str,
}

impl AwsProvider {
    /// Headers every signed request carries.
    pub(crate) fn base_headers(&self, host: &str, amz_date: &str) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Host".to_string(), host.to_string()),
            ("X-Amz-Date".to_string(), amz_date.to_string()),
        ];
        if let Some(token) = &self.session_token {
            headers.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }
        headers
    }

    /// Generate the `Authorization` header value.
    /// Reference: <https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html>
    pub(crate) fn sign(
        &self,
        scope: SigningScope<'_>,
        request: SignableRequest<'_>,
        amz_date: &str,
    ) -> String {
        let date = amz_date.get(..8).unwrap_or(amz_date);

        // 1. Canonical URI
        let canonical_uri = if request.uri.is_empty() {
            "/"
        } else {
            request.uri
        };

        // 2. Query String sorting (in ascending order by parameter name)
        let canonical_query = if request.query.is_empty() {
            String::new()
        } else {
            let mut params: Vec<&str> = request.query.split('&').collect();
            params.sort_unstable();
            params.join("&")
        };

        // 3. Canonical headers: lowercase names, trimmed values, sorted
        let mut sorted_headers: Vec<_> = request.headers.iter().collect();
        sorted_headers.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

        let canonical_headers: String =
            sorted_headers
                .iter()
                .fold(String::new(), |mut acc, (k, v)| {
                    let _ = writeln!(acc, "{}:{}", k.to_lowercase(), v.trim());
                    acc
                });

        let signed_headers: String = sorted_headers
            .iter()
            .map(|(k, _)| k.to_lowercase())
            .collect::<Vec<_>>()
            .join(";");

        // 4. Payload hash
        let hashed_payload = sha256_hex(request.payload.as_bytes());

        let canonical_request = format!(
            "{}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{hashed_payload}",
            request.method
        );

        log::debug!("CanonicalRequest:\n{}", truncate_for_log(&canonical_request));

        // 5. String to sign
        let credential_scope = format!(
            "{date}/{}/{}/aws4_request",
            scope.region, scope.service
        );
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{credential_scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        log::debug!("StringToSign:\n{string_to_sign}");

        // 6. Derived signing key
        let k_date = hmac_sha256(
            format!("AWS4{}", self.secret_access_key).as_bytes(),
            date.as_bytes(),
        );
        let k_region = hmac_sha256(&k_date, scope.region.as_bytes());
        let k_service = hmac_sha256(&k_region, scope.service.as_bytes());
        let k_signing = hmac_sha256(&k_service, b"aws4_request");

        let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

        format!(
            "AWS4-HMAC-SHA256 Credential={}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.access_key_id
        )
    }
}
