use thiserror::Error;

use crate::{config::ConfigError, expression::ParseError, markup::MarkupError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error("invalid expression `{source_text}`: {error}")]
    Expression {
        source_text: String,
        #[source]
        error: ParseError,
    },

    #[error("cannot build the delimiter pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("template has no root element")]
    EmptyTemplate,

    #[error("malformed loop directive `{directive}`: expected `<list> as <item>[, <index>]`")]
    MalformedLoop { directive: String },
}
