use std::path::PathBuf;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type FormatResult<T> = Result<T, FormatError>;
pub type ExtractResult<T> = Result<T, ExtractError>;
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Failures of the relaxed configuration notation.
#[derive(Debug, Error, Diagnostic)]
pub enum FormatError {
    /// The text is not relaxed notation. `position` is a byte offset into it.
    #[error("relaxed config parse failure at byte {position}: {reason}")]
    #[diagnostic(code("ser.format.parse"))]
    ParseFailure {
        position: usize,
        reason: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },
    #[error("encoded payload would contain the reserved delimiter '{delimiter}' at {path}")]
    #[diagnostic(
        code("ser.format.collision"),
        help("remove the character or switch the delimiter policy to `escape`")
    )]
    EncodingCollision { delimiter: char, path: String },
    /// The non-positional failure. On encode, a value that cannot be
    /// represented; on decode, text that parsed but whose tree does not fit
    /// the target type (`port: "abc"`). The serde message names the expected
    /// type but carries no byte offset.
    #[error("serialization error: {0}")]
    #[diagnostic(
        code("ser.format.serialization"),
        help("the payload is well formed; check the value types of its members")
    )]
    Serialization(String),
}

impl FormatError {
    pub(crate) fn parse_failure(src: &str, position: usize, reason: impl Into<String>) -> Self {
        let position = position.min(src.len());
        let length = if position < src.len() { 1 } else { 0 };
        FormatError::ParseFailure {
            position,
            reason: reason.into(),
            src: src.to_string(),
            span: (position, length).into(),
        }
    }
}

/// Failures while locating or decoding an embedded task inside a script.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    #[error("script does not invoke the task start primitive")]
    #[diagnostic(
        code("ser.extract.no_invocation"),
        help("a managed script calls SER.START(<variable>)")
    )]
    NoTaskInvocation,
    #[error("no `SET {variable} = ...` assignment carrying a delimited payload")]
    #[diagnostic(code("ser.extract.no_assignment"))]
    NoAssignment { variable: String },
    #[error("payload opened at byte {offset} is not closed before the statement terminator")]
    #[diagnostic(code("ser.extract.unterminated"))]
    UnterminatedPayload { offset: usize },
    #[error("embedded payload could not be decoded")]
    #[diagnostic(code("ser.extract.decode"))]
    PayloadDecode(
        #[source]
        #[diagnostic_source]
        FormatError,
    ),
}

/// Failures while producing a managed script.
#[derive(Debug, Error, Diagnostic)]
pub enum ComposeError {
    #[error("report could not be encoded")]
    #[diagnostic(code("ser.compose.encode"))]
    EncodingFailed(
        #[source]
        #[diagnostic_source]
        FormatError,
    ),
    #[error("existing managed block is malformed and cannot be replaced")]
    #[diagnostic(
        code("ser.compose.existing_block"),
        help("repair the block by hand or compose with the `append_new` policy")
    )]
    ExistingBlock(
        #[source]
        #[diagnostic_source]
        ExtractError,
    ),
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("codec config file not found at {0}")]
    #[diagnostic(code("ser.config.not_found"))]
    NotFound(PathBuf),
    #[error("failed to parse codec config: {0}")]
    #[diagnostic(code("ser.config.parse"))]
    Parse(#[from] toml::de::Error),
    #[error("failed to write codec config: {0}")]
    #[diagnostic(code("ser.config.serialize"))]
    Serialize(#[from] toml::ser::Error),
    #[error("io error: {0}")]
    #[diagnostic(code("ser.config.io"))]
    Io(#[from] std::io::Error),
    #[error("invalid script protocol: {0}")]
    #[diagnostic(code("ser.config.protocol"))]
    InvalidProtocol(String),
}
