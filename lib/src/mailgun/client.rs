use crate::config::Config;
use crate::email::Email;
use crate::mailgun::api::{self, SendResult};
use crate::mailgun::encode;
use crate::mailgun::payload::Payload;
use crate::transport::{ReqwestTransport, Transport};
use crate::Error;

/// Sends emails through the Mailgun `messages` API
pub struct Mailgun<T = ReqwestTransport> {
    config: Config,
    transport: T,
}

impl Mailgun<ReqwestTransport> {
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }
}

impl<T: Transport> Mailgun<T> {
    /// `config` is expected to be valid already
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds and sends a single request; there are no retries
    pub async fn deliver(&self, email: &Email) -> Result<SendResult, Error> {
        let payload = Payload::from_email(email);
        let body = encode::encode(&payload)?;

        let url = api::build_endpoint_url(self.config.base_url.as_deref(), &self.config.domain);
        let headers = api::build_headers(&body, &self.config.api_key);

        log::debug!(
            "POST {} ({}, {} bytes, {} attachments)",
            url,
            if body.is_multipart() { "multipart" } else { "form" },
            body.content_length,
            payload.parts.len()
        );

        let resp = self
            .transport
            .post(&url, &headers, body.bytes, email)
            .await
            .map_err(|e| {
                log::error!("Mailgun request failed: {}", e);
                Error::Transport(e)
            })?;

        let result = api::map_response(resp)?;

        log::info!("Mailgun accepted message {}", result.id);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::email::{Attachment, ProviderOptions};
    use crate::error::ErrorBody;
    use crate::transport::{Response, TransportError, TransportFuture};

    #[derive(Debug)]
    struct Request {
        url: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        subject: String,
    }

    /// Answers every request with a canned response and records it
    struct StubTransport {
        status: u16,
        body: &'static str,
        fail: bool,
        requests: Mutex<Vec<Request>>,
    }

    impl StubTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                fail: false,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(0, "")
            }
        }

        fn header(&self, name: &str) -> Option<String> {
            let requests = self.requests.lock().unwrap();
            requests[0]
                .headers
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    impl Transport for StubTransport {
        fn post<'a>(
            &'a self,
            url: &'a str,
            headers: &'a [(String, String)],
            body: Vec<u8>,
            email: &'a Email,
        ) -> TransportFuture<'a> {
            Box::pin(async move {
                self.requests.lock().unwrap().push(Request {
                    url: url.to_string(),
                    headers: headers.to_vec(),
                    body,
                    subject: email.subject.clone(),
                });

                if self.fail {
                    let err: TransportError = "connection refused".into();
                    return Err(err);
                }

                Ok(Response {
                    status: self.status,
                    headers: Vec::new(),
                    body: bytes::Bytes::from_static(self.body.as_bytes()),
                })
            })
        }
    }

    fn mailer(transport: StubTransport) -> Mailgun<StubTransport> {
        Mailgun::with_transport(Config::new("key-123", "avengers.com"), transport)
    }

    fn basic_email() -> Email {
        Email::new()
            .from(("T Stark", "tony.stark@example.com"))
            .to("steve.rogers@example.com")
            .subject("Hello, Avengers!")
            .html_body("<h1>Hello</h1>")
    }

    #[tokio::test]
    async fn deliver_success_returns_id() {
        let mailgun = mailer(StubTransport::new(200, r#"{"id":"abc"}"#));

        let result = mailgun.deliver(&basic_email()).await.unwrap();

        assert_eq!(result.id, "abc");
        assert_eq!(result.message, None);
    }

    #[tokio::test]
    async fn deliver_sends_form_request() {
        let mailgun = mailer(StubTransport::new(200, r#"{"id":"abc"}"#));

        mailgun.deliver(&basic_email()).await.unwrap();

        let transport = mailgun.transport();
        {
            let requests = transport.requests.lock().unwrap();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].url, "https://api.mailgun.net/v3/avengers.com/messages");
            assert_eq!(requests[0].subject, "Hello, Avengers!");

            let fields: Vec<(String, String)> = url::form_urlencoded::parse(&requests[0].body)
                .into_owned()
                .collect();
            let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
            assert_eq!(keys, vec!["from", "to", "subject", "html"]);
        }

        assert_eq!(
            transport.header("content-type").as_deref(),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            transport.header("authorization").as_deref(),
            Some("Basic YXBpOmtleS0xMjM=")
        );
        assert_eq!(transport.header("accept").as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn deliver_with_attachment_sends_multipart() {
        let mailgun = mailer(StubTransport::new(200, r#"{"id":"abc"}"#));
        let email = basic_email()
            .attachment(Attachment::from_data("a.txt", "text/plain", "one"))
            .attachment(Attachment::from_data("b.txt", "text/plain", "two"));

        mailgun.deliver(&email).await.unwrap();

        let transport = mailgun.transport();
        let content_type = transport.header("content-type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));

        let requests = transport.requests.lock().unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert_eq!(body.matches("name=\"attachment\"; filename=").count(), 2);
        assert_eq!(
            transport_length(&requests[0]),
            Some(requests[0].body.len().to_string())
        );
    }

    fn transport_length(request: &Request) -> Option<String> {
        request
            .headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .map(|(_, v)| v.clone())
    }

    #[tokio::test]
    async fn deliver_uses_base_url_override() {
        let config = Config::new("key-123", "avengers.com").with_base_url("https://api.eu.mailgun.net/v3");
        let mailgun = Mailgun::with_transport(config, StubTransport::new(200, r#"{"id":"abc"}"#));

        mailgun.deliver(&basic_email()).await.unwrap();

        let requests = mailgun.transport().requests.lock().unwrap();
        assert_eq!(requests[0].url, "https://api.eu.mailgun.net/v3/avengers.com/messages");
    }

    #[tokio::test]
    async fn deliver_api_error_keeps_json_body() {
        let mailgun = mailer(StubTransport::new(401, r#"{"message":"bad key"}"#));

        match mailgun.deliver(&basic_email()).await {
            Err(Error::Api { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, ErrorBody::Json(serde_json::json!({"message": "bad key"})));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn deliver_api_error_keeps_raw_body() {
        let mailgun = mailer(StubTransport::new(500, "Internal Server Error"));

        match mailgun.deliver(&basic_email()).await {
            Err(Error::Api { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, ErrorBody::Raw("Internal Server Error".to_string()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn deliver_transport_error_is_passed_through() {
        let mailgun = mailer(StubTransport::failing());

        match mailgun.deliver(&basic_email()).await {
            Err(Error::Transport(e)) => assert_eq!(e.to_string(), "connection refused"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn deliver_bad_attachment_never_reaches_transport() {
        let mailgun = mailer(StubTransport::new(200, r#"{"id":"abc"}"#));
        let email = basic_email().attachment(Attachment::from_path("/definitely/not/here.pdf", "application/pdf"));

        assert!(matches!(mailgun.deliver(&email).await, Err(Error::Attachment(_))));
        assert!(mailgun.transport().requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn deliver_keeps_tags_and_sending_options_apart() {
        let mailgun = mailer(StubTransport::new(200, r#"{"id":"abc"}"#));
        let mut sending_options = serde_json::Map::new();
        sending_options.insert("dkim".to_string(), "yes".into());

        let email = basic_email().provider_options(ProviderOptions {
            tags: Some(vec!["a".to_string(), "b".to_string()]),
            sending_options: Some(sending_options),
            ..Default::default()
        });

        mailgun.deliver(&email).await.unwrap();

        let requests = mailgun.transport().requests.lock().unwrap();
        let fields: Vec<(String, String)> = url::form_urlencoded::parse(&requests[0].body)
            .into_owned()
            .collect();

        let tags: Vec<&str> = fields
            .iter()
            .filter(|(k, _)| k == "o:tag")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(tags, vec!["a", "b"]);
        assert!(fields.contains(&("o:dkim".to_string(), "yes".to_string())));
    }

    #[test]
    fn new_rejects_invalid_config() {
        assert!(matches!(Mailgun::new(Config::new("", "avengers.com")), Err(Error::Config(_))));
    }
}
