//! Report task model carried inside managed scripts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod distribute;
pub mod selection;

pub use distribute::{
    Distribute, DistributeTarget, DistributionChannel, FileTarget, HubTarget, MailServer,
    MailTarget, ParseChannelError, WriteMode,
};
pub use selection::{Selection, SelectionKind, UserSelectionMode, UserSelectionModeError};

/// Structured representation of one report task.
///
/// Setters may be called in any order. Nothing is validated until the model
/// is encoded, and even then only representability is checked: whether a mail
/// target has a server host is up to the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(default, rename_all = "camelCase")]
pub struct ReportModel {
    pub connections: Vec<Connection>,
    pub template: TemplateRef,
    pub distribute: Distribute,
    pub selections: Vec<Selection>,
    pub general: GeneralSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(default, rename_all = "camelCase")]
pub struct Connection {
    pub name: String,
    pub connection_string: String,
}

impl Connection {
    pub fn new(name: impl Into<String>, connection_string: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connection_string: connection_string.into(),
        }
    }
}

/// Template document the report is rendered from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateRef {
    /// Document identifier, usually a content library path.
    pub input: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_password: Option<String>,
    pub keep_formula: bool,
}

impl TemplateRef {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralSettings {
    /// Seconds before temporary report files are removed.
    #[serde(rename = "cleanupTimeOut")]
    pub cleanup_timeout: u32,
    /// Execution timeout in seconds.
    pub timeout: u32,
    pub error_repeat_count: u32,
    pub use_sandbox: bool,
    pub task_count: u32,
    #[schemars(with = "u8")]
    pub use_user_selections: UserSelectionMode,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            cleanup_timeout: 10,
            timeout: 900,
            error_repeat_count: 0,
            use_sandbox: true,
            task_count: 1,
            use_user_selections: UserSelectionMode::Normal,
        }
    }
}

impl ReportModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all connections with a single one.
    pub fn set_connection(&mut self, connection: Connection) {
        self.connections = vec![connection];
    }

    pub fn set_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    pub fn set_template(&mut self, template: TemplateRef) {
        self.template = template;
    }

    pub fn set_distribute(&mut self, distribute: Distribute) {
        self.distribute = distribute;
    }

    /// Fills the slot of the target's channel; other channels are untouched.
    pub fn add_distribute_section(&mut self, target: DistributeTarget) {
        self.distribute.set(target);
    }

    pub fn clear_distribute(&mut self, channel: DistributionChannel) {
        self.distribute.clear(channel);
    }

    pub fn add_selection(&mut self, selection: Selection) {
        self.selections.push(selection);
    }

    pub fn set_selections(&mut self, selections: Vec<Selection>) {
        self.selections = selections;
    }

    pub fn set_general(&mut self, general: GeneralSettings) {
        self.general = general;
    }

    /// Copy without the placeholder rows an edit form leaves behind:
    /// connections with no name and selections with no field.
    pub fn cleaned(&self) -> Self {
        let mut report = self.clone();
        report
            .connections
            .retain(|connection| !connection.name.trim().is_empty());
        report
            .selections
            .retain(|selection| !selection.name.trim().is_empty());
        report
    }
}

#[cfg(test)]
#[path = "../tests/model_tests.rs"]
mod tests;
