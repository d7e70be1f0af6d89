//! Codec for report tasks embedded in host load scripts.
//!
//! A [`ReportModel`] is written into a script as a delimited relaxed-config
//! literal followed by a launcher that starts and polls the task, and read
//! back from scripts that may have been edited by hand since.

mod codec;
mod compose;
mod config;
mod error;
mod extract;
mod model;
mod protocol;
mod relaxed;
mod schema;

pub use codec::ReportCodec;
pub use compose::{compose, ComposePolicy, ScriptComposer};
pub use config::CodecConfig;
pub use error::{
    ComposeError, ComposeResult, ConfigError, ExtractError, ExtractResult, FormatError,
    FormatResult,
};
pub use extract::{extract, extract_all, ConfigExtractor, EmbeddedConfigBlock};
pub use model::{
    Connection, Distribute, DistributeTarget, DistributionChannel, FileTarget, GeneralSettings,
    HubTarget, MailServer, MailTarget, ParseChannelError, ReportModel, Selection, SelectionKind,
    TemplateRef, UserSelectionMode, UserSelectionModeError, WriteMode,
};
pub use protocol::{
    is_managed_script, is_terminal_status, ScriptProtocol, AUTOGENERATED_MARKER,
    DEFAULT_DELIMITER, DEFAULT_POLL_INTERVAL_MS, DEFAULT_START_PRIMITIVE,
    DEFAULT_STATUS_PRIMITIVE, DEFAULT_TAB_NAME, DEFAULT_TASK_VARIABLE, SCRIPT_NEWLINE, SENTINEL,
    STATEMENT_TERMINATOR, TAB_MARKER,
};
pub use relaxed::{normalize_newlines, parse_relaxed, DelimiterPolicy, RelaxedFormat};
pub use schema::{report_json_schema, report_json_schema_string};
