//! Writing report tasks into a host script.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, ComposeResult, ConfigError, ExtractError};
use crate::extract::ConfigExtractor;
use crate::model::ReportModel;
use crate::protocol::ScriptProtocol;
use crate::relaxed::RelaxedFormat;

/// What to do with a managed block already present in the script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposePolicy {
    /// Append a fresh managed section; earlier blocks stay behind as dead text.
    #[default]
    AppendNew,
    /// Rewrite the first existing assignment in place, appending only when
    /// the script has none.
    ReplaceExisting,
}

#[derive(Clone, Debug)]
pub struct ScriptComposer {
    protocol: ScriptProtocol,
    format: RelaxedFormat,
    policy: ComposePolicy,
    extractor: ConfigExtractor,
}

impl Default for ScriptComposer {
    fn default() -> Self {
        Self {
            protocol: ScriptProtocol::default(),
            format: RelaxedFormat::default(),
            policy: ComposePolicy::default(),
            extractor: ConfigExtractor::default(),
        }
    }
}

impl ScriptComposer {
    pub fn new(
        protocol: ScriptProtocol,
        format: RelaxedFormat,
        policy: ComposePolicy,
    ) -> Result<Self, ConfigError> {
        let extractor = ConfigExtractor::new(&protocol, format)?;
        Ok(Self {
            protocol,
            format,
            policy,
            extractor,
        })
    }

    pub fn policy(&self) -> ComposePolicy {
        self.policy
    }

    pub fn with_policy(mut self, policy: ComposePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns `existing` with `report` embedded according to the policy.
    pub fn compose(&self, existing: &str, report: &ReportModel) -> ComposeResult<String> {
        let payload = self.encode_payload(report)?;
        match self.policy {
            ComposePolicy::AppendNew => Ok(self.append(existing, &payload)),
            ComposePolicy::ReplaceExisting => match self.extractor.locate(existing) {
                Ok(block) => {
                    let statement = self.protocol.assignment(block.variable, &payload);
                    tracing::debug!(
                        variable = block.variable,
                        offset = block.statement.start,
                        payload_bytes = payload.len(),
                        "replacing embedded report task"
                    );
                    let mut script = String::with_capacity(existing.len() + payload.len());
                    script.push_str(&existing[..block.statement.start]);
                    script.push_str(&statement);
                    script.push_str(&existing[block.statement.end..]);
                    Ok(script)
                }
                Err(ExtractError::NoTaskInvocation | ExtractError::NoAssignment { .. }) => {
                    Ok(self.append(existing, &payload))
                }
                Err(err) => Err(ComposeError::ExistingBlock(err)),
            },
        }
    }

    /// Appends a managed section holding a default report, as done for new documents.
    pub fn compose_default(&self, existing: &str) -> ComposeResult<String> {
        self.compose(existing, &ReportModel::default())
    }

    /// Encoded report without the outer braces; the delimiters take their place.
    pub fn encode_payload(&self, report: &ReportModel) -> ComposeResult<String> {
        let encoded = self
            .format
            .encode(report)
            .map_err(ComposeError::EncodingFailed)?;
        Ok(strip_outer_braces(&encoded).to_string())
    }

    fn append(&self, existing: &str, payload: &str) -> String {
        let variable = &self.protocol.task_variable;
        let mut script = String::with_capacity(existing.len() + payload.len() + 512);
        script.push_str(existing);
        script.push_str(&self.protocol.section_header());
        script.push_str(&self.protocol.assignment(variable, payload));
        script.push_str(&self.protocol.launcher(variable));
        tracing::debug!(
            existing_bytes = existing.len(),
            payload_bytes = payload.len(),
            "appended managed report section"
        );
        script
    }
}

fn strip_outer_braces(encoded: &str) -> &str {
    encoded
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(encoded)
}

fn default_composer() -> &'static ScriptComposer {
    static DEFAULT: OnceLock<ScriptComposer> = OnceLock::new();
    DEFAULT.get_or_init(ScriptComposer::default)
}

/// Appends a managed section for `report` using the default protocol.
pub fn compose(existing: &str, report: &ReportModel) -> ComposeResult<String> {
    default_composer().compose(existing, report)
}

#[cfg(test)]
#[path = "tests/compose_tests.rs"]
mod tests;
