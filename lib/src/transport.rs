use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;

use crate::email::Email;
use crate::Error;

// Request timeout, in seconds
pub(crate) const REQUEST_TIMEOUT: u64 = 30;

/// Whatever went wrong below HTTP, passed through untouched
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

// Definition of future types for async use
pub type TransportFuture<'a> = BoxFuture<'a, Result<Response, TransportError>>;

/// Raw HTTP response as seen by the transport
#[derive(Clone, Debug)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// Performs the actual `POST` to Mailgun.
///
/// The email is passed along untouched so that test and logging transports
/// can see what is being sent.
pub trait Transport: Send + Sync {
    fn post<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(String, String)],
        body: Vec<u8>,
        email: &'a Email,
    ) -> TransportFuture<'a>;
}

/// Default transport backed by `reqwest`
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, Error> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn post<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(String, String)],
        body: Vec<u8>,
        _email: &'a Email,
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            let mut req = self.client.post(url).body(body);

            for (name, value) in headers {
                req = req.header(name.as_str(), value.as_str());
            }

            let resp = req.send().await?;

            let status = resp.status().as_u16();
            let headers = resp
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = resp.bytes().await?;

            Ok::<_, TransportError>(Response {
                status,
                headers,
                body,
            })
        })
    }
}
