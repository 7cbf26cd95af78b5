use std::borrow::Cow;
use std::fs;

use crate::email::AttachmentSource;
use crate::mailgun::payload::{Part, Payload};
use crate::Error;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Serialized request body along with its content headers
#[derive(Debug)]
pub struct Body {
    pub content_type: String,
    pub content_length: usize,
    pub bytes: Vec<u8>,
}

impl Body {
    fn new(content_type: String, bytes: Vec<u8>) -> Self {
        Self {
            content_type,
            content_length: bytes.len(),
            bytes,
        }
    }

    pub fn is_multipart(&self) -> bool {
        self.content_type.starts_with(MULTIPART_CONTENT_TYPE)
    }
}

/// Any attachment forces `multipart/form-data` for the whole request,
/// otherwise the fields are sent form-encoded.
pub fn encode(payload: &Payload) -> Result<Body, Error> {
    if payload.has_attachments() {
        encode_multipart(payload, &boundary())
    } else {
        Ok(encode_form(payload))
    }
}

pub fn encode_form(payload: &Payload) -> Body {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());

    for (key, value) in payload.fields() {
        serializer.append_pair(key, value);
    }

    Body::new(
        FORM_CONTENT_TYPE.to_string(),
        serializer.finish().into_bytes(),
    )
}

/// Builds a `multipart/form-data` body with one text part per field
/// followed by one file part per attachment.
///
/// Path-referenced attachments are read from disk here.
pub fn encode_multipart(payload: &Payload, boundary: &str) -> Result<Body, Error> {
    let mut buf: Vec<u8> = Vec::new();

    for (key, value) in payload.fields() {
        write_boundary(&mut buf, boundary);
        buf.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                escape_quoted(key)
            )
            .as_bytes(),
        );
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    for part in &payload.parts {
        check_content_type(part)?;
        let data = read_part(part)?;

        write_boundary(&mut buf, boundary);
        buf.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                part.name,
                escape_quoted(part.filename),
                part.content_type
            )
            .as_bytes(),
        );
        buf.extend_from_slice(&data);
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Ok(Body::new(
        format!("{}; boundary={}", MULTIPART_CONTENT_TYPE, boundary),
        buf,
    ))
}

fn read_part<'a>(part: &Part<'a>) -> Result<Cow<'a, [u8]>, Error> {
    match part.source {
        AttachmentSource::Data(data) => Ok(Cow::Borrowed(data.as_slice())),
        AttachmentSource::Path(path) => fs::read(path).map(Cow::Owned).map_err(|e| {
            log::error!("Failed to read attachment {}: {}", path.display(), e);
            Error::Attachment(format!("{}: {}", path.display(), e))
        }),
    }
}

// A line break would end the part header early
fn check_content_type(part: &Part) -> Result<(), Error> {
    if part.content_type.contains(|c: char| c == '\r' || c == '\n') {
        log::error!("Attachment {} has a multi-line content type", part.filename);
        return Err(Error::Attachment(format!(
            "{}: content type must be a single line",
            part.filename
        )));
    }

    Ok(())
}

fn write_boundary(buf: &mut Vec<u8>, boundary: &str) {
    buf.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
}

fn boundary() -> String {
    format!("------------------------{}", uuid::Uuid::new_v4().simple())
}

// Same escaping browsers apply to form-data names
fn escape_quoted(s: &str) -> Cow<str> {
    if s.contains(|c: char| c == '"' || c == '\r' || c == '\n') {
        Cow::Owned(
            s.replace('"', "%22")
                .replace('\r', "%0D")
                .replace('\n', "%0A"),
        )
    } else {
        Cow::Borrowed(s)
    }
}
