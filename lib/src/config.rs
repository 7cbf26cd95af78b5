use serde::Deserialize;

use crate::Error;

pub const DEFAULT_PATH: &str = "/etc/mailshot/mailshot.toml";
const ENV_PREFIX: &str = "MAILSHOT";

/// Mailgun account settings
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Private API key
    pub api_key: String,

    /// Sending domain, e.g. `mg.example.com`
    pub domain: String,

    /// Overrides the default US API host, e.g. for the EU region
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Config {
    pub fn new(api_key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            domain: domain.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Loads config from filesystem and merges it with any
    /// environment variables prefixed with `MAILSHOT_`.
    ///
    /// The default path may be missing; an explicit one may not.
    pub fn load(path: Option<&str>) -> Result<Self, Error> {
        let file = match path {
            Some(path) => config::File::with_name(path),
            None => config::File::with_name(DEFAULT_PATH).required(false),
        };

        let config: Config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("api_key is required".to_string()));
        }

        if self.domain.trim().is_empty() {
            return Err(Error::Config("domain is required".to_string()));
        }

        if let Some(base_url) = &self.base_url {
            let url = url::Url::parse(base_url)?;

            if url.scheme() != "https" && url.scheme() != "http" {
                return Err(Error::Config(format!(
                    "base_url must be http(s): {}",
                    base_url
                )));
            }
        }

        Ok(())
    }
}
