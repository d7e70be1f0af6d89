//! Markers that embed a report task inside a host load script.
//!
//! A managed section looks like this (lines end with CRLF):
//!
//! ```text
//! ///$tab Reporting Task
//! ///$autogenerated
//! SET task = ´<payload>´;
//! Let resultWithTaskId = SER.START(task);
//! ...
//! ```
//!
//! The payload sits between two copies of a single reserved character and the
//! statement is closed by the host terminator `;`. The launcher that follows
//! starts the task and polls its status until a terminal code is seen.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// U+00B4 ACUTE ACCENT. Not a quote in the host language, so it needs no escaping there.
pub const DEFAULT_DELIMITER: char = '\u{00B4}';
pub const DEFAULT_TASK_VARIABLE: &str = "task";
pub const DEFAULT_START_PRIMITIVE: &str = "SER.START";
pub const DEFAULT_STATUS_PRIMITIVE: &str = "SER.STATUS";
/// Substring every managed script contains; used to discover managed documents.
pub const SENTINEL: &str = DEFAULT_START_PRIMITIVE;
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 1000;
pub const DEFAULT_TAB_NAME: &str = "Reporting Task";

pub const SCRIPT_NEWLINE: &str = "\r\n";
pub const STATEMENT_TERMINATOR: char = ';';
pub const TAB_MARKER: &str = "///$tab ";
pub const AUTOGENERATED_MARKER: &str = "///$autogenerated";

/// Status codes in `[TERMINAL_LOW + 1, TERMINAL_HIGH)` mean the task is still running.
pub const TERMINAL_LOW: i32 = -1;
pub const TERMINAL_HIGH: i32 = 3;

/// Vocabulary shared by the extractor and the composer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptProtocol {
    pub task_variable: String,
    pub delimiter: char,
    pub sentinel: String,
    pub start_primitive: String,
    pub status_primitive: String,
    pub poll_interval_ms: u32,
    pub tab_name: String,
}

impl Default for ScriptProtocol {
    fn default() -> Self {
        Self {
            task_variable: DEFAULT_TASK_VARIABLE.to_string(),
            delimiter: DEFAULT_DELIMITER,
            sentinel: SENTINEL.to_string(),
            start_primitive: DEFAULT_START_PRIMITIVE.to_string(),
            status_primitive: DEFAULT_STATUS_PRIMITIVE.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            tab_name: DEFAULT_TAB_NAME.to_string(),
        }
    }
}

impl ScriptProtocol {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiter.is_ascii() {
            return Err(ConfigError::InvalidProtocol(format!(
                "delimiter {:?} is ASCII and collides with host script syntax",
                self.delimiter
            )));
        }
        if self.delimiter.is_whitespace() || self.delimiter.is_control() {
            return Err(ConfigError::InvalidProtocol(
                "delimiter must be a visible character".to_string(),
            ));
        }
        if !is_identifier(&self.task_variable) {
            return Err(ConfigError::InvalidProtocol(format!(
                "task variable '{}' is not an identifier",
                self.task_variable
            )));
        }
        for (label, primitive) in [
            ("start primitive", &self.start_primitive),
            ("status primitive", &self.status_primitive),
            ("sentinel", &self.sentinel),
        ] {
            if primitive.trim().is_empty() {
                return Err(ConfigError::InvalidProtocol(format!("{label} is empty")));
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidProtocol(
                "poll interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_managed_script(&self, script: &str) -> bool {
        script.contains(&self.sentinel)
    }

    /// Tab and autogenerated markers, preceded by a line break.
    pub fn section_header(&self) -> String {
        format!(
            "{nl}{TAB_MARKER}{tab}{nl}{AUTOGENERATED_MARKER}{nl}",
            nl = SCRIPT_NEWLINE,
            tab = self.tab_name
        )
    }

    /// `SET <variable> = ´<payload>´;`
    pub fn assignment(&self, variable: &str, payload: &str) -> String {
        format!(
            "SET {variable} = {delim}{payload}{delim}{STATEMENT_TERMINATOR}",
            delim = self.delimiter
        )
    }

    /// Statements that start the task held by `variable` and wait for it.
    pub fn launcher(&self, variable: &str) -> String {
        let start = &self.start_primitive;
        let status = &self.status_primitive;
        let lines = [
            String::new(),
            format!("Let resultWithTaskId = {start}({variable});"),
            "TRACE TaskId: $(resultWithTaskId);".to_string(),
            String::new(),
            format!("Let version = {status}('');"),
            "TRACE Version: $(version);".to_string(),
            "TRACE Result: $(resultWithTaskId);".to_string(),
            String::new(),
            "Set Status = 0;".to_string(),
            format!("Do while Status < {TERMINAL_HIGH} and Status > {TERMINAL_LOW}"),
            format!("  Let result = {status}(resultWithTaskId);"),
            "  Let Status = num#(TextBetween(result,'status\":','}'))+0;".to_string(),
            "  TRACE Status: $(Status);".to_string(),
            format!("  Sleep {};", self.poll_interval_ms),
            "Loop".to_string(),
            String::new(),
            "TRACE $(result);".to_string(),
        ];
        let mut launcher = lines.join(SCRIPT_NEWLINE);
        launcher.push_str(SCRIPT_NEWLINE);
        launcher
    }
}

/// Whether the script carries a managed report task under the default protocol.
pub fn is_managed_script(script: &str) -> bool {
    script.contains(SENTINEL)
}

/// Whether a status code returned by the status primitive ends the poll loop.
pub fn is_terminal_status(status: i32) -> bool {
    !(status > TERMINAL_LOW && status < TERMINAL_HIGH)
}

pub(crate) fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
