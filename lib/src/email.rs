//! Provider-agnostic Email and Attachment types.
//! Provider modules read these and build their own wire payloads.
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::address::Address;

#[derive(Clone, Debug, Default)]
pub struct Email {
    pub from: Address,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub reply_to: Option<ReplyTo>,
    pub subject: String,

    /// HTML body, if any
    pub html_body: Option<String>,

    /// Plaintext body, if any
    pub text_body: Option<String>,

    /// AMP for Email body, if any
    pub amp_html_body: Option<String>,

    /// List of attachments, if any
    pub attachments: Vec<Attachment>,

    /// Custom headers, in insertion order
    pub headers: Vec<(String, String)>,

    pub provider_options: ProviderOptions,
}

/// Reply-To is either a single mailbox or a list of them
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyTo {
    One(Address),
    Many(Vec<Address>),
}

/// Options that only make sense for Mailgun
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProviderOptions {
    pub custom_vars: Option<Map<String, Value>>,
    pub recipient_vars: Option<Map<String, Value>>,
    pub sending_options: Option<Map<String, Value>>,
    pub tags: Option<Vec<String>>,
    pub template_name: Option<String>,
    pub template_options: Option<Map<String, Value>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentType {
    Inline,
    Regular,
}

impl Default for AttachmentType {
    fn default() -> Self {
        AttachmentType::Regular
    }
}

/// Attachment can either contain the full content,
/// or a path that points to the content
#[derive(Clone, Debug, PartialEq)]
pub enum AttachmentSource {
    Path(PathBuf),
    Data(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    /// Attachment type (regular or inline)
    pub type_: AttachmentType,

    /// Attachment filename
    pub filename: String,

    /// MIME type of attachment (e.g., text/plain)
    pub content_type: String,

    pub source: AttachmentSource,
}

impl Email {
    pub fn new() -> Email {
        Default::default()
    }

    pub fn from(mut self, from: impl Into<Address>) -> Self {
        self.from = from.into();
        self
    }

    pub fn to(mut self, to: impl Into<Address>) -> Self {
        self.to.push(to.into());
        self
    }

    pub fn cc(mut self, cc: impl Into<Address>) -> Self {
        self.cc.push(cc.into());
        self
    }

    pub fn bcc(mut self, bcc: impl Into<Address>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    /// Sets a single Reply-To mailbox, or adds to the list if one is set
    pub fn reply_to(mut self, reply_to: impl Into<Address>) -> Self {
        let reply_to = reply_to.into();

        self.reply_to = Some(match self.reply_to.take() {
            None => ReplyTo::One(reply_to),
            Some(ReplyTo::One(first)) => ReplyTo::Many(vec![first, reply_to]),
            Some(ReplyTo::Many(mut list)) => {
                list.push(reply_to);
                ReplyTo::Many(list)
            }
        });

        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text_body = Some(text.into());
        self
    }

    pub fn amp_html_body(mut self, amp: impl Into<String>) -> Self {
        self.amp_html_body = Some(amp.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn provider_options(mut self, options: ProviderOptions) -> Self {
        self.provider_options = options;
        self
    }
}

impl Attachment {
    /// In-memory attachment
    pub fn from_data(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Attachment {
        Attachment {
            type_: AttachmentType::Regular,
            filename: filename.into(),
            content_type: content_type.into(),
            source: AttachmentSource::Data(data.into()),
        }
    }

    /// Attachment read from disk when the request body is built.
    /// The filename defaults to the last path component.
    pub fn from_path(path: impl Into<PathBuf>, content_type: impl Into<String>) -> Attachment {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Attachment {
            type_: AttachmentType::Regular,
            filename,
            content_type: content_type.into(),
            source: AttachmentSource::Path(path),
        }
    }

    pub fn inline(mut self) -> Attachment {
        self.type_ = AttachmentType::Inline;
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Attachment {
        self.filename = filename.into();
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_accumulates_recipients_in_order() {
        let email = Email::new()
            .from(("Tony Stark", "tony@x.com"))
            .to("steve@x.com")
            .to(("Janet van Dyne", "wasp@x.com"))
            .cc("bruce@x.com")
            .subject("Avengers assemble");

        assert_eq!(email.from, Address::with_name("Tony Stark", "tony@x.com"));
        assert_eq!(email.to.len(), 2);
        assert_eq!(email.to[1].email, "wasp@x.com");
        assert_eq!(email.cc, vec![Address::new("bruce@x.com")]);
        assert!(email.bcc.is_empty());
    }

    #[test]
    fn reply_to_grows_from_one_to_many() {
        let email = Email::new().reply_to("a@x.com");
        assert_eq!(email.reply_to, Some(ReplyTo::One(Address::new("a@x.com"))));

        let email = email.reply_to("b@x.com");
        assert_eq!(
            email.reply_to,
            Some(ReplyTo::Many(vec![
                Address::new("a@x.com"),
                Address::new("b@x.com")
            ]))
        );
    }

    #[test]
    fn attachment_from_path_uses_file_name() {
        let attachment = Attachment::from_path("/tmp/reports/q3.pdf", "application/pdf").inline();

        assert_eq!(attachment.filename, "q3.pdf");
        assert_eq!(attachment.type_, AttachmentType::Inline);
        assert_eq!(
            attachment.source,
            AttachmentSource::Path(PathBuf::from("/tmp/reports/q3.pdf"))
        );
    }
}
