//! `CloudFront` REST/XML 请求

use chrono::Utc;
use reqwest::Method;

use crate::error::Result;
use crate::http_client::{HttpResponse, HttpUtils};
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::sign::{SignableRequest, SigningScope};
use super::types::extract_tag;
use super::{AwsProvider, CLOUDFRONT_API_VERSION, CLOUDFRONT_HOST, CLOUDFRONT_REGION};

/// A `CloudFront` request beyond method and path.
#[derive(Debug, Default)]
pub(crate) struct CloudFrontCall<'a> {
    pub body: Option<String>,
    pub if_match: Option<&'a str>,
}

impl AwsProvider {
    /// 统一处理 `CloudFront` 响应错误（`<Error><Code>..</Code><Message>..</Message></Error>`）
    fn handle_cloudfront_error(&self, response: &HttpResponse, ctx: ErrorContext) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }

        if let Some(code) = extract_tag(&response.body, "Code") {
            let message = extract_tag(&response.body, "Message").unwrap_or_default();
            return Err(self.map_error(RawApiError::with_code(code, message), ctx));
        }

        Err(self.unknown_error(RawApiError::new(format!(
            "HTTP {}: {}",
            response.status,
            truncate_for_log(&response.body)
        ))))
    }

    /// Send a signed request to `/{version}/distribution{suffix}`.
    pub(crate) async fn cloudfront_request(
        &self,
        method: Method,
        suffix: &str,
        call: CloudFrontCall<'_>,
        ctx: ErrorContext,
    ) -> Result<HttpResponse> {
        let path = format!("/{CLOUDFRONT_API_VERSION}/distribution{suffix}");
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let payload = call.body.unwrap_or_default();

        let mut headers = self.base_headers(CLOUDFRONT_HOST, &amz_date);
        if !payload.is_empty() {
            headers.push(("Content-Type".to_string(), "application/xml".to_string()));
        }
        if let Some(etag) = call.if_match {
            headers.push(("If-Match".to_string(), etag.to_string()));
        }

        let authorization = self.sign(
            SigningScope {
                service: "cloudfront",
                region: CLOUDFRONT_REGION,
            },
            SignableRequest {
                method: method.as_str(),
                uri: &path,
                query: "",
                headers: &headers,
                payload: &payload,
            },
            &amz_date,
        );

        let url = format!("https://{CLOUDFRONT_HOST}{path}");
        let mut request = self.client.request(method.clone(), &url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = request.header("Authorization", authorization);
        if !payload.is_empty() {
            request = request.body(payload);
        }

        let response = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            method.as_str(),
            &path,
            self.max_retries,
        )
        .await?;

        self.handle_cloudfront_error(&response, ctx)?;
        Ok(response)
    }

    /// `ETag` of a response, required for the follow-up conditional request.
    pub(crate) fn require_etag(&self, response: &HttpResponse) -> Result<String> {
        response
            .etag
            .clone()
            .ok_or_else(|| self.parse_error("missing ETag header"))
    }
}
