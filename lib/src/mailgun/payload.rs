use serde_json::{Map, Value};

use crate::address::{render, render_addresses, render_list};
use crate::email::{AttachmentSource, AttachmentType, Email, ReplyTo};

pub const AMP_HTML_KEY: &str = "amp-html";
pub const REPLY_TO_KEY: &str = "h:Reply-To";
pub const CUSTOM_VARS_KEY: &str = "h:X-Mailgun-Variables";
pub const RECIPIENT_VARS_KEY: &str = "recipient-variables";
pub const TAG_KEY: &str = "o:tag";
pub const TEMPLATE_KEY: &str = "template";

pub const HEADER_PREFIX: &str = "h:";
pub const OPTION_PREFIX: &str = "o:";
pub const TEMPLATE_OPTION_PREFIX: &str = "t:";

/// A file part of a multipart request
#[derive(Debug, PartialEq)]
pub struct Part<'a> {
    /// Form field name, `attachment` or `inline`
    pub name: &'static str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub source: &'a AttachmentSource,
}

/// Form fields for a single Mailgun `messages` request.
///
/// Well-known fields get their own slot; header-, option- and
/// template-derived fields go to `extra` in the order they were written.
/// Attachment parts are kept apart since they decide how the payload is
/// encoded.
#[derive(Debug, Default, PartialEq)]
pub struct Payload<'a> {
    pub from: String,
    pub to: String,
    pub subject: &'a str,
    pub html: Option<&'a str>,
    pub text: Option<&'a str>,
    pub amp_html: Option<&'a str>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub reply_to: Option<String>,
    pub custom_vars: Option<String>,
    pub recipient_vars: Option<String>,
    pub tags: Vec<&'a str>,
    pub template: Option<&'a str>,
    pub extra: Vec<(String, String)>,
    pub parts: Vec<Part<'a>>,
}

impl<'a> Payload<'a> {
    /// Runs every field step in a fixed order; each one only reads the
    /// email and fills in its own fields.
    pub fn from_email(email: &'a Email) -> Payload<'a> {
        let mut payload = Payload::default();

        prepare_from(&mut payload, email);
        prepare_to(&mut payload, email);
        prepare_subject(&mut payload, email);
        prepare_html(&mut payload, email);
        prepare_text(&mut payload, email);
        prepare_amp_html(&mut payload, email);
        prepare_cc(&mut payload, email);
        prepare_bcc(&mut payload, email);
        prepare_reply_to(&mut payload, email);
        prepare_attachments(&mut payload, email);
        prepare_custom_headers(&mut payload, email);
        prepare_custom_vars(&mut payload, email);
        prepare_sending_options(&mut payload, email);
        prepare_recipient_vars(&mut payload, email);
        prepare_tags(&mut payload, email);
        prepare_template_name(&mut payload, email);
        prepare_template_options(&mut payload, email);

        payload
    }

    pub fn has_attachments(&self) -> bool {
        !self.parts.is_empty()
    }

    /// All text fields as `(key, value)` pairs.
    /// Tags show up once per tag under the same key.
    pub fn fields(&self) -> Vec<(&str, &str)> {
        let mut fields = vec![
            ("from", self.from.as_str()),
            ("to", self.to.as_str()),
            ("subject", self.subject),
        ];

        let optional = [
            ("html", self.html),
            ("text", self.text),
            (AMP_HTML_KEY, self.amp_html),
            ("cc", self.cc.as_deref()),
            ("bcc", self.bcc.as_deref()),
            (REPLY_TO_KEY, self.reply_to.as_deref()),
            (CUSTOM_VARS_KEY, self.custom_vars.as_deref()),
            (RECIPIENT_VARS_KEY, self.recipient_vars.as_deref()),
        ];

        for &(key, value) in optional.iter() {
            if let Some(value) = value {
                fields.push((key, value));
            }
        }

        for tag in &self.tags {
            fields.push((TAG_KEY, *tag));
        }

        if let Some(template) = self.template {
            fields.push((TEMPLATE_KEY, template));
        }

        for (key, value) in &self.extra {
            fields.push((key.as_str(), value.as_str()));
        }

        fields
    }
}

/// Flattens an option value into a form field value.
///
/// Maps and lists become JSON, strings go through untouched and other
/// scalars use their JSON spelling (`true`, `42`). Null has no form
/// representation and yields `None`.
pub fn encode_variable(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn prepare_from<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.from = render(&email.from);
}

fn prepare_to<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.to = render_list(&email.to);
}

fn prepare_subject<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.subject = email.subject.as_str();
}

fn prepare_html<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.html = email.html_body.as_deref();
}

fn prepare_text<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.text = email.text_body.as_deref();
}

fn prepare_amp_html<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.amp_html = email.amp_html_body.as_deref();
}

fn prepare_cc<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    if !email.cc.is_empty() {
        payload.cc = Some(render_list(&email.cc));
    }
}

fn prepare_bcc<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    if !email.bcc.is_empty() {
        payload.bcc = Some(render_list(&email.bcc));
    }
}

// Mailgun takes Reply-To as a raw header, so display names are dropped
fn prepare_reply_to<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.reply_to = match &email.reply_to {
        None => None,
        Some(ReplyTo::One(address)) => Some(address.email.clone()),
        Some(ReplyTo::Many(list)) if list.is_empty() => None,
        Some(ReplyTo::Many(list)) => Some(render_addresses(list)),
    };
}

fn prepare_attachments<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.parts = email
        .attachments
        .iter()
        .map(|a| Part {
            name: field_name(a.type_),
            filename: &a.filename,
            content_type: &a.content_type,
            source: &a.source,
        })
        .collect();
}

fn prepare_custom_headers<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    for (name, value) in &email.headers {
        payload
            .extra
            .push((format!("{}{}", HEADER_PREFIX, name), value.clone()));
    }
}

fn prepare_custom_vars<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.custom_vars = email.provider_options.custom_vars.as_ref().map(to_json);
}

fn prepare_sending_options<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    if let Some(options) = &email.provider_options.sending_options {
        push_prefixed(payload, OPTION_PREFIX, options);
    }
}

fn prepare_recipient_vars<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.recipient_vars = email
        .provider_options
        .recipient_vars
        .as_ref()
        .map(to_json);
}

// Tags are not JSON encoded: Mailgun wants one `o:tag` field per tag
fn prepare_tags<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    if let Some(tags) = &email.provider_options.tags {
        payload.tags = tags.iter().map(String::as_str).collect();
    }
}

fn prepare_template_name<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    payload.template = email.provider_options.template_name.as_deref();
}

fn prepare_template_options<'a>(payload: &mut Payload<'a>, email: &'a Email) {
    if let Some(options) = &email.provider_options.template_options {
        push_prefixed(payload, TEMPLATE_OPTION_PREFIX, options);
    }
}

fn push_prefixed(payload: &mut Payload, prefix: &str, options: &Map<String, Value>) {
    for (key, value) in options {
        if let Some(value) = encode_variable(value) {
            payload.extra.push((format!("{}{}", prefix, key), value));
        }
    }
}

fn to_json(map: &Map<String, Value>) -> String {
    Value::Object(map.clone()).to_string()
}

fn field_name(type_: AttachmentType) -> &'static str {
    match type_ {
        AttachmentType::Inline => "inline",
        AttachmentType::Regular => "attachment",
    }
}
