//! ACM JSON 1.1 请求

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::sanitize_for_log;

use super::AwsProvider;
use super::sign::{SignableRequest, SigningScope};
use super::types::AcmErrorResponse;

const ACM_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

impl AwsProvider {
    /// 统一处理 ACM 响应错误
    fn handle_acm_error(&self, status: u16, response_text: &str, ctx: ErrorContext) -> Result<()> {
        if (200..300).contains(&status) {
            return Ok(());
        }

        if let Ok(error) = serde_json::from_str::<AcmErrorResponse>(response_text)
            && let Some(code) = error.code()
        {
            return Err(self.map_error(
                RawApiError::with_code(code, error.message.clone().unwrap_or_default()),
                ctx,
            ));
        }

        Err(self.unknown_error(RawApiError::new(format!("HTTP {status}: {response_text}"))))
    }

    /// POST an ACM action (`CertificateManager.{action}`).
    pub(crate) async fn acm_request<T, B>(
        &self,
        action: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let payload =
            serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
                provider: self.provider_name().to_string(),
                detail: e.to_string(),
            })?;

        log::debug!("[aws] {action} Request Body: {}", sanitize_for_log(&payload));

        let host = self.acm_host();
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let target = format!("CertificateManager.{action}");

        let mut headers = self.base_headers(&host, &amz_date);
        headers.push(("Content-Type".to_string(), ACM_CONTENT_TYPE.to_string()));
        headers.push(("X-Amz-Target".to_string(), target));

        let authorization = self.sign(
            SigningScope {
                service: "acm",
                region: &self.region,
            },
            SignableRequest {
                method: "POST",
                uri: "/",
                query: "",
                headers: &headers,
                payload: &payload,
            },
            &amz_date,
        );

        let url = format!("https://{host}/");
        let mut request = self.client.post(&url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = request.header("Authorization", authorization).body(payload);

        let response = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "POST",
            action,
            self.max_retries,
        )
        .await?;

        self.handle_acm_error(response.status, &response.body, ctx)?;

        let body = if response.body.trim().is_empty() {
            "{}"
        } else {
            response.body.as_str()
        };
        HttpUtils::parse_json(body, self.provider_name())
    }
}
