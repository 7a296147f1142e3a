//! AWS `EdgeProvider` trait 实现

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;

use crate::error::{ProviderError, Result};
use crate::providers::common::{normalize_domain_name, sha256_hex, wildcard_name};
use crate::traits::{EdgeProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{
    CdnDistribution, CdnStatus, CertificateDetail, CertificateStatus, UploadCertificateRequest,
};

use super::AwsProvider;
use super::cloudfront::CloudFrontCall;
use super::types::{
    AcmTag, CertificateArnRequest, CertificateArnResponse, DescribeCertificateResponse,
    DistributionSpec, DomainValidationOption, EmptyResponse, ImportCertificateRequest,
    RequestCertificateRequest, ResendValidationEmailRequest, disable_config, extract_tag,
    render_distribution_config,
};

impl AwsProvider {
    fn invalid_param(&self, param: &str, detail: &str) -> ProviderError {
        ProviderError::InvalidParameter {
            provider: self.provider_name().to_string(),
            param: param.to_string(),
            detail: detail.to_string(),
        }
    }

    fn checked_domain(&self, domain: &str) -> Result<String> {
        let domain = normalize_domain_name(domain);
        if domain.is_empty() {
            return Err(self.invalid_param("domain", "must not be empty"));
        }
        Ok(domain)
    }
}

/// ACM accepts up to 32 word characters; stable per domain so retries map to one request.
fn idempotency_token(domain: &str) -> String {
    sha256_hex(domain.as_bytes())[..32].to_string()
}

#[async_trait]
impl EdgeProvider for AwsProvider {
    fn id(&self) -> &'static str {
        "aws"
    }

    async fn request_wildcard_certificate(&self, domain: &str) -> Result<String> {
        let domain = self.checked_domain(domain)?;
        let wildcard = wildcard_name(&domain);

        let req = RequestCertificateRequest {
            domain_name: wildcard.clone(),
            subject_alternative_names: vec![domain.clone()],
            validation_method: "EMAIL",
            domain_validation_options: vec![
                DomainValidationOption {
                    domain_name: wildcard,
                    validation_domain: domain.clone(),
                },
                DomainValidationOption {
                    domain_name: domain.clone(),
                    validation_domain: domain.clone(),
                },
            ],
            idempotency_token: idempotency_token(&domain),
        };

        let resp: CertificateArnResponse = self
            .acm_request("RequestCertificate", &req, ErrorContext::domain(&domain))
            .await?;

        log::info!(
            "[aws] Requested wildcard certificate for {domain}: {}",
            resp.certificate_arn
        );
        Ok(resp.certificate_arn)
    }

    async fn describe_certificate(&self, certificate_id: &str) -> Result<CertificateDetail> {
        let req = CertificateArnRequest {
            certificate_arn: certificate_id.to_string(),
        };
        let resp: DescribeCertificateResponse = self
            .acm_request(
                "DescribeCertificate",
                &req,
                ErrorContext::resource(certificate_id),
            )
            .await?;

        let cert = resp.certificate;
        Ok(CertificateDetail {
            certificate_id: cert.certificate_arn,
            domain_name: cert.domain_name,
            subject_alternative_names: cert.subject_alternative_names,
            status: CertificateStatus::from(cert.status),
        })
    }

    async fn upload_certificate(
        &self,
        req: &UploadCertificateRequest,
    ) -> Result<CertificateDetail> {
        if req.certificate_body.trim().is_empty() {
            return Err(self.invalid_param("certificate_body", "must not be empty"));
        }
        if req.private_key.trim().is_empty() {
            return Err(self.invalid_param("private_key", "must not be empty"));
        }

        let import = ImportCertificateRequest {
            certificate: STANDARD.encode(req.certificate_body.trim()),
            private_key: STANDARD.encode(req.private_key.trim()),
            certificate_chain: req
                .certificate_chain
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| STANDARD.encode(c)),
            tags: vec![AcmTag {
                key: "Name".to_string(),
                value: req.name.clone(),
            }],
        };

        let resp: CertificateArnResponse = self
            .acm_request("ImportCertificate", &import, ErrorContext::default())
            .await?;

        log::info!(
            "[aws] Imported certificate '{}': {}",
            req.name,
            resp.certificate_arn
        );

        // Imported certificates carry their names in the PEM; read them back.
        self.describe_certificate(&resp.certificate_arn).await
    }

    async fn delete_certificate(&self, certificate_id: &str) -> Result<()> {
        let req = CertificateArnRequest {
            certificate_arn: certificate_id.to_string(),
        };
        let _: EmptyResponse = self
            .acm_request(
                "DeleteCertificate",
                &req,
                ErrorContext::resource(certificate_id),
            )
            .await?;
        log::info!("[aws] Deleted certificate {certificate_id}");
        Ok(())
    }

    async fn resend_validation_email(&self, domain: &str, certificate_id: &str) -> Result<()> {
        let domain = self.checked_domain(domain)?;
        let req = ResendValidationEmailRequest {
            certificate_arn: certificate_id.to_string(),
            domain: wildcard_name(&domain),
            validation_domain: domain,
        };
        let _: EmptyResponse = self
            .acm_request(
                "ResendValidationEmail",
                &req,
                ErrorContext::resource(certificate_id),
            )
            .await?;
        Ok(())
    }

    async fn create_cdn_distribution(
        &self,
        domain: &str,
        certificate_id: &str,
    ) -> Result<CdnDistribution> {
        let domain = self.checked_domain(domain)?;
        let caller_reference = uuid::Uuid::new_v4().to_string();
        let body = render_distribution_config(&DistributionSpec {
            caller_reference: &caller_reference,
            domain: &domain,
            origin_domain: &self.origin_domain,
            certificate_arn: certificate_id,
            price_class: &self.price_class,
        });

        let response = self
            .cloudfront_request(
                Method::POST,
                "",
                CloudFrontCall {
                    body: Some(body),
                    if_match: None,
                },
                ErrorContext::domain(&domain),
            )
            .await?;

        let distribution_id = extract_tag(&response.body, "Id")
            .ok_or_else(|| self.parse_error("distribution response missing <Id>"))?;
        let domain_name = extract_tag(&response.body, "DomainName")
            .ok_or_else(|| self.parse_error("distribution response missing <DomainName>"))?;
        let status = extract_tag(&response.body, "Status")
            .map_or(CdnStatus::InProgress, CdnStatus::from);

        log::info!("[aws] Created distribution {distribution_id} ({domain_name}) for {domain}");

        Ok(CdnDistribution {
            distribution_id,
            domain_name,
            status,
        })
    }

    async fn get_cdn_distribution_status(&self, distribution_id: &str) -> Result<CdnStatus> {
        let response = self
            .cloudfront_request(
                Method::GET,
                &format!("/{distribution_id}"),
                CloudFrontCall::default(),
                ErrorContext::resource(distribution_id),
            )
            .await?;

        extract_tag(&response.body, "Status")
            .map(CdnStatus::from)
            .ok_or_else(|| self.parse_error("distribution response missing <Status>"))
    }

    async fn delete_cdn_distribution(&self, distribution_id: &str) -> Result<()> {
        let config_path = format!("/{distribution_id}/config");
        let config = self
            .cloudfront_request(
                Method::GET,
                &config_path,
                CloudFrontCall::default(),
                ErrorContext::resource(distribution_id),
            )
            .await?;
        let mut etag = self.require_etag(&config)?;

        if let Some(disabled) = disable_config(&config.body) {
            log::info!("[aws] Disabling distribution {distribution_id} before delete");
            let updated = self
                .cloudfront_request(
                    Method::PUT,
                    &config_path,
                    CloudFrontCall {
                        body: Some(disabled),
                        if_match: Some(&etag),
                    },
                    ErrorContext::resource(distribution_id),
                )
                .await?;
            etag = self.require_etag(&updated)?;
        }

        // Fails with ResourceInUse until the disable has propagated.
        self.cloudfront_request(
            Method::DELETE,
            &format!("/{distribution_id}"),
            CloudFrontCall {
                body: None,
                if_match: Some(&etag),
            },
            ErrorContext::resource(distribution_id),
        )
        .await?;

        log::info!("[aws] Deleted distribution {distribution_id}");
        Ok(())
    }
}
