use std::fmt;

/// A single mailbox, optionally with a display name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub name: Option<String>,
    pub email: String,
}

impl Address {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }

    /// Parses either `Display Name <addr>` or a bare `addr`
    pub fn parse(s: &str) -> Self {
        let s = s.trim();

        if let (Some(start), true) = (s.rfind('<'), s.ends_with('>')) {
            let name = s[..start].trim().trim_matches('"').trim();
            let email = s[start + 1..s.len() - 1].trim();

            if name.is_empty() {
                Self::new(email)
            } else {
                Self::with_name(name, email)
            }
        } else {
            Self::new(s)
        }
    }
}

impl From<&str> for Address {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

impl From<String> for Address {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

/// `(name, email)`
impl From<(&str, &str)> for Address {
    fn from((name, email): (&str, &str)) -> Self {
        Self::with_name(name, email)
    }
}

impl From<(String, String)> for Address {
    fn from((name, email): (String, String)) -> Self {
        Self::with_name(name, email)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&render(self))
    }
}

/// Renders a mailbox the way Mailgun expects it in `from`, `to`, etc.
///
/// An empty display name counts as no name at all.
pub fn render(address: &Address) -> String {
    match address.name.as_deref() {
        Some(name) if !name.is_empty() => format!("{} <{}>", name, address.email),
        _ => address.email.clone(),
    }
}

/// Renders every entry, in order, joined by `", "`.
///
/// An empty slice renders as an empty string; callers treat that as
/// "field absent".
pub fn render_list(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(render)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Like `render_list`, but drops display names
pub fn render_addresses(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(|a| a.email.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
