use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{CACHING_OPTIMIZED_POLICY_ID, CLOUDFRONT_API_VERSION};

// ============ ACM (JSON 1.1) ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestCertificateRequest {
    pub domain_name: String,
    pub subject_alternative_names: Vec<String>,
    pub validation_method: &'static str,
    pub domain_validation_options: Vec<DomainValidationOption>,
    pub idempotency_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainValidationOption {
    pub domain_name: String,
    pub validation_domain: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateArnResponse {
    pub certificate_arn: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateArnRequest {
    pub certificate_arn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeCertificateResponse {
    pub certificate: AcmCertificate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AcmCertificate {
    pub certificate_arn: String,
    pub domain_name: String,
    #[serde(default)]
    pub subject_alternative_names: Vec<String>,
    pub status: String,
}

/// Blob fields are base64 encoded on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportCertificateRequest {
    pub certificate: String,
    pub private_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_chain: Option<String>,
    pub tags: Vec<AcmTag>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AcmTag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResendValidationEmailRequest {
    pub certificate_arn: String,
    pub domain: String,
    pub validation_domain: String,
}

/// Body of successful calls that return nothing.
#[derive(Debug, Deserialize)]
pub struct EmptyResponse {}

/// ACM error body: `{"__type": "...#ResourceNotFoundException", "message": "..."}`.
#[derive(Debug, Deserialize)]
pub struct AcmErrorResponse {
    #[serde(rename = "__type")]
    pub error_type: Option<String>,
    #[serde(alias = "Message")]
    pub message: Option<String>,
}

impl AcmErrorResponse {
    /// Error code without the namespace prefix.
    pub fn code(&self) -> Option<&str> {
        self.error_type
            .as_deref()
            .map(|t| t.rsplit('#').next().unwrap_or(t))
    }
}

// ============ CloudFront (REST / XML) ============

/// Input for a new distribution.
#[derive(Debug, Clone)]
pub struct DistributionSpec<'a> {
    pub caller_reference: &'a str,
    pub domain: &'a str,
    pub origin_domain: &'a str,
    pub certificate_arn: &'a str,
    pub price_class: &'a str,
}

/// Escape text for inclusion in XML element content.
pub fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a `DistributionConfig` document serving `*.{domain}` from the shared origin.
pub fn render_distribution_config(spec: &DistributionSpec<'_>) -> String {
    let alias = xml_escape(&format!("*.{}", spec.domain));
    let origin = xml_escape(spec.origin_domain);
    let comment = xml_escape(&format!("custom domain {}", spec.domain));
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<DistributionConfig xmlns="http://cloudfront.amazonaws.com/doc/{version}/">
  <CallerReference>{caller}</CallerReference>
  <Aliases><Quantity>1</Quantity><Items><CNAME>{alias}</CNAME></Items></Aliases>
  <Origins>
    <Quantity>1</Quantity>
    <Items>
      <Origin>
        <Id>app-origin</Id>
        <DomainName>{origin}</DomainName>
        <CustomOriginConfig>
          <HTTPPort>80</HTTPPort>
          <HTTPSPort>443</HTTPSPort>
          <OriginProtocolPolicy>https-only</OriginProtocolPolicy>
        </CustomOriginConfig>
      </Origin>
    </Items>
  </Origins>
  <DefaultCacheBehavior>
    <TargetOriginId>app-origin</TargetOriginId>
    <ViewerProtocolPolicy>redirect-to-https</ViewerProtocolPolicy>
    <Compress>true</Compress>
    <CachePolicyId>{cache_policy}</CachePolicyId>
  </DefaultCacheBehavior>
  <Comment>{comment}</Comment>
  <PriceClass>{price_class}</PriceClass>
  <Enabled>true</Enabled>
  <ViewerCertificate>
    <ACMCertificateArn>{certificate}</ACMCertificateArn>
    <SSLSupportMethod>sni-only</SSLSupportMethod>
    <MinimumProtocolVersion>TLSv1.2_2021</MinimumProtocolVersion>
  </ViewerCertificate>
  <HttpVersion>http2</HttpVersion>
  <IsIPV6Enabled>true</IsIPV6Enabled>
</DistributionConfig>"#,
        version = CLOUDFRONT_API_VERSION,
        caller = xml_escape(spec.caller_reference),
        cache_policy = CACHING_OPTIMIZED_POLICY_ID,
        price_class = xml_escape(spec.price_class),
        certificate = xml_escape(spec.certificate_arn),
    )
}

/// Text of the first `<tag>` element, unescaped.
pub fn extract_tag(xml: &str, tag: &str) -> Option<String> {
    let re = Regex::new(&format!(r"<{tag}>([^<]*)</{tag}>")).ok()?;
    re.captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| xml_unescape(m.as_str()))
}

fn xml_unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Top-level `<Enabled>` of a `DistributionConfig`; it is the element right after `<PriceClass>`.
const TOP_LEVEL_ENABLED: &str = r"(</PriceClass>\s*<Enabled>)(true|false)(</Enabled>)";

/// Whether the distribution config is enabled. `None` when the element is missing.
pub fn config_enabled(config_xml: &str) -> Option<bool> {
    let re = Regex::new(TOP_LEVEL_ENABLED).ok()?;
    re.captures(config_xml)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str() == "true")
}

/// Same config with the distribution disabled. `None` when already disabled or unparseable.
pub fn disable_config(config_xml: &str) -> Option<String> {
    if config_enabled(config_xml) != Some(true) {
        return None;
    }
    let re = Regex::new(TOP_LEVEL_ENABLED).ok()?;
    Some(re.replace(config_xml, "${1}false${3}").into_owned())
}
