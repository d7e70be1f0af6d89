//! Locating and decoding report tasks embedded in a host script.
//!
//! The host language is never parsed. Two literal patterns are scanned for:
//! the start invocation `SER.START(<var>)`, which names the task variable,
//! and the assignment `SET <var> = ´...´;` carrying the payload. Their order
//! in the script does not matter and unrelated text around them is ignored.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ConfigError, ExtractError, ExtractResult};
use crate::model::ReportModel;
use crate::protocol::{is_identifier, ScriptProtocol, STATEMENT_TERMINATOR};
use crate::relaxed::RelaxedFormat;

const ASSIGNMENT_PATTERN: &str = r"(?i)\bSET\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*";

/// One embedded configuration statement inside a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedConfigBlock<'a> {
    pub variable: &'a str,
    /// Byte range from `SET` through the terminating `;`.
    pub statement: Range<usize>,
    /// Byte range between the two delimiters.
    pub payload: Range<usize>,
    pub text: &'a str,
}

#[derive(Clone, Debug)]
pub struct ConfigExtractor {
    delimiter: char,
    format: RelaxedFormat,
    invocation: Regex,
    assignment: Regex,
}

impl Default for ConfigExtractor {
    fn default() -> Self {
        // both patterns are built from constants and always compile
        Self::new(&ScriptProtocol::default(), RelaxedFormat::default())
            .expect("default extractor patterns are valid")
    }
}

impl ConfigExtractor {
    pub fn new(protocol: &ScriptProtocol, format: RelaxedFormat) -> Result<Self, ConfigError> {
        let invocation = Regex::new(&format!(
            r"{}\(([^)]+)\)",
            regex::escape(&protocol.start_primitive)
        ))
        .map_err(|err| ConfigError::InvalidProtocol(err.to_string()))?;
        let assignment = Regex::new(ASSIGNMENT_PATTERN)
            .map_err(|err| ConfigError::InvalidProtocol(err.to_string()))?;
        Ok(Self {
            delimiter: protocol.delimiter,
            format,
            invocation,
            assignment,
        })
    }

    /// Variables passed to the start primitive, in order of first use.
    pub fn task_variables<'a>(&self, script: &'a str) -> Vec<&'a str> {
        let mut variables: Vec<&'a str> = Vec::new();
        for captures in self.invocation.captures_iter(script) {
            let Some(argument) = captures.get(1) else {
                continue;
            };
            let variable = argument.as_str().trim();
            if is_identifier(variable) && !variables.contains(&variable) {
                variables.push(variable);
            }
        }
        variables
    }

    /// The first embedded block in source order.
    pub fn locate<'a>(&self, script: &'a str) -> ExtractResult<EmbeddedConfigBlock<'a>> {
        let mut blocks = self.scan(script, true)?;
        Ok(blocks.remove(0))
    }

    /// Every embedded block in source order.
    pub fn locate_all<'a>(&self, script: &'a str) -> ExtractResult<Vec<EmbeddedConfigBlock<'a>>> {
        self.scan(script, false)
    }

    /// Decodes the first embedded task.
    pub fn extract(&self, script: &str) -> ExtractResult<ReportModel> {
        let block = self.locate(script)?;
        self.decode_block(&block)
    }

    /// Decodes every embedded task. Fails on the first block that does not decode.
    pub fn extract_all(&self, script: &str) -> ExtractResult<Vec<ReportModel>> {
        self.locate_all(script)?
            .iter()
            .map(|block| self.decode_block(block))
            .collect()
    }

    pub fn decode_block(&self, block: &EmbeddedConfigBlock<'_>) -> ExtractResult<ReportModel> {
        self.format
            .decode(block.text)
            .map_err(ExtractError::PayloadDecode)
    }

    fn scan<'a>(
        &self,
        script: &'a str,
        first_only: bool,
    ) -> ExtractResult<Vec<EmbeddedConfigBlock<'a>>> {
        let variables = self.task_variables(script);
        let Some(primary) = variables.first() else {
            return Err(ExtractError::NoTaskInvocation);
        };

        let mut blocks = Vec::new();
        let mut resume_at = 0usize;
        for captures in self.assignment.captures_iter(script) {
            let (Some(statement), Some(variable)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if statement.start() < resume_at || !variables.contains(&variable.as_str()) {
                continue;
            }
            if !script[statement.end()..].starts_with(self.delimiter) {
                tracing::trace!(
                    variable = variable.as_str(),
                    offset = statement.start(),
                    "assignment without delimited payload skipped"
                );
                continue;
            }
            let block = self.isolate(script, statement.start(), variable.as_str(), statement.end())?;
            resume_at = block.statement.end;
            blocks.push(block);
            if first_only {
                break;
            }
        }

        if blocks.is_empty() {
            return Err(ExtractError::NoAssignment {
                variable: (*primary).to_string(),
            });
        }
        tracing::debug!(
            blocks = blocks.len(),
            variables = variables.len(),
            "located embedded report tasks"
        );
        Ok(blocks)
    }

    /// Cuts the payload out of `SET <var> = ´...´;` starting at the opening delimiter.
    fn isolate<'a>(
        &self,
        script: &'a str,
        start: usize,
        variable: &'a str,
        open: usize,
    ) -> ExtractResult<EmbeddedConfigBlock<'a>> {
        let body_start = open + self.delimiter.len_utf8();
        let Some(length) = script[body_start..].find(self.delimiter) else {
            return Err(ExtractError::UnterminatedPayload { offset: open });
        };
        let close = body_start + length;
        let after_close = close + self.delimiter.len_utf8();
        let tail = &script[after_close..];
        let terminator = tail.trim_start();
        if !terminator.starts_with(STATEMENT_TERMINATOR) {
            return Err(ExtractError::UnterminatedPayload { offset: open });
        }
        let end = after_close + (tail.len() - terminator.len()) + STATEMENT_TERMINATOR.len_utf8();
        Ok(EmbeddedConfigBlock {
            variable,
            statement: start..end,
            payload: body_start..close,
            text: &script[body_start..close],
        })
    }
}

fn default_extractor() -> &'static ConfigExtractor {
    static DEFAULT: OnceLock<ConfigExtractor> = OnceLock::new();
    DEFAULT.get_or_init(ConfigExtractor::default)
}

/// Decodes the first embedded task using the default protocol.
pub fn extract(script: &str) -> ExtractResult<ReportModel> {
    default_extractor().extract(script)
}

/// Decodes every embedded task, in source order, using the default protocol.
pub fn extract_all(script: &str) -> ExtractResult<Vec<ReportModel>> {
    default_extractor().extract_all(script)
}

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod tests;
