use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;

use crate::error::{Error, ErrorBody};
use crate::mailgun::encode::Body;
use crate::transport::Response;

pub const MAILGUN_BASE_API: &str = "https://api.mailgun.net/v3";
pub const MAILGUN_BASE_API_EU: &str = "https://api.eu.mailgun.net/v3";

/// Mailgun authenticates every API key as the `api` user
pub const MAILGUN_API_USER: &str = "api";

pub const MAILSHOT_USER_AGENT: &str = concat!("mailshot/", env!("CARGO_PKG_VERSION"));

/// Response to a successful `messages` request
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SendResult {
    /// Mailgun message ID, e.g. `<20200101.1@mg.example.com>`
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[inline]
pub fn build_endpoint_url(base_url: Option<&str>, domain: &str) -> String {
    let base_url = base_url.unwrap_or(MAILGUN_BASE_API).trim_end_matches('/');
    format!("{}/{}/messages", base_url, domain)
}

/// `Basic base64("api:<key>")`
pub fn auth_header(api_key: &str) -> String {
    let credentials = format!("{}:{}", MAILGUN_API_USER, api_key);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    )
}

pub fn build_headers(body: &Body, api_key: &str) -> Vec<(String, String)> {
    vec![
        (AUTHORIZATION.to_string(), auth_header(api_key)),
        (USER_AGENT.to_string(), MAILSHOT_USER_AGENT.to_string()),
        (ACCEPT.to_string(), "application/json".to_string()),
        (CONTENT_TYPE.to_string(), body.content_type.clone()),
        (CONTENT_LENGTH.to_string(), body.content_length.to_string()),
    ]
}

/// Map a Mailgun response to a send result.
///
/// Only 200 counts as success. Every other status is an API error whose
/// body is kept as JSON when it decodes and as text otherwise.
pub fn map_response(resp: Response) -> Result<SendResult, Error> {
    if resp.status == 200 {
        let result: SendResult = serde_json::from_slice(&resp.body).map_err(|e| {
            log::error!("Mailgun accepted the message but the response is unusable: {}", e);
            e
        })?;

        Ok(result)
    } else {
        let body = ErrorBody::from_bytes(&resp.body);

        log::error!("Mailgun API error ({}): {}", resp.status, body);

        Err(Error::Api {
            status: resp.status,
            body,
        })
    }
}
