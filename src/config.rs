//! Template syntax configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("template tags must not be empty")]
    EmptyTag,

    #[error("open and close tags must differ, both are `{0}`")]
    SameTags(String),

    #[error("directive prefix must not be empty")]
    EmptyPrefix,

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// The syntax a [`Compiler`](crate::Compiler) scans templates with.
///
/// The delimiters are only consulted while compiling; a step list compiled
/// under one configuration keeps working after another one is adopted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Opens an embedded expression.
    pub open_tag: String,
    /// Closes an embedded expression.
    pub close_tag: String,
    /// Attribute names starting with this are directives or dynamic attributes.
    pub directive_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            open_tag: "{".to_string(),
            close_tag: "}".to_string(),
            directive_prefix: "u-".to_string(),
        }
    }
}

impl Config {
    pub fn with_tags(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open_tag: open.into(),
            close_tag: close.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.open_tag.is_empty() || self.close_tag.is_empty() {
            return Err(ConfigError::EmptyTag);
        }
        if self.open_tag == self.close_tag {
            return Err(ConfigError::SameTags(self.open_tag.clone()));
        }
        if self.directive_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        Ok(())
    }

    /// The directive name of `attribute`, if it carries the prefix.
    pub(crate) fn directive<'a>(&self, attribute: &'a str) -> Option<&'a str> {
        attribute.strip_prefix(self.directive_prefix.as_str())
    }
}
