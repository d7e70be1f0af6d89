use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delivery slots of a report task.
///
/// Each channel is an independent optional slot; a task may write a file,
/// send a mail and publish to the hub at the same time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Distribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<MailTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub: Option<HubTarget>,
}

impl Distribute {
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.mail.is_none() && self.hub.is_none()
    }

    /// Channels with a populated slot, in file, mail, hub order.
    pub fn channels(&self) -> Vec<DistributionChannel> {
        let mut channels = Vec::new();
        if self.file.is_some() {
            channels.push(DistributionChannel::File);
        }
        if self.mail.is_some() {
            channels.push(DistributionChannel::Mail);
        }
        if self.hub.is_some() {
            channels.push(DistributionChannel::Hub);
        }
        channels
    }

    /// Stores the target in its channel slot, replacing what was there.
    pub fn set(&mut self, target: DistributeTarget) {
        match target {
            DistributeTarget::File(file) => self.file = Some(file),
            DistributeTarget::Mail(mail) => self.mail = Some(mail),
            DistributeTarget::Hub(hub) => self.hub = Some(hub),
        }
    }

    pub fn clear(&mut self, channel: DistributionChannel) {
        match channel {
            DistributionChannel::File => self.file = None,
            DistributionChannel::Mail => self.mail = None,
            DistributionChannel::Hub => self.hub = None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DistributionChannel {
    File,
    Mail,
    Hub,
}

impl DistributionChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            DistributionChannel::File => "file",
            DistributionChannel::Mail => "mail",
            DistributionChannel::Hub => "hub",
        }
    }
}

impl fmt::Display for DistributionChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown distribution channel '{0}' (expected file, mail or hub)")]
pub struct ParseChannelError(pub String);

impl FromStr for DistributionChannel {
    type Err = ParseChannelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(DistributionChannel::File),
            // the edit form labels the mail channel "email"
            "mail" | "email" => Ok(DistributionChannel::Mail),
            "hub" => Ok(DistributionChannel::Hub),
            _ => Err(ParseChannelError(value.to_string())),
        }
    }
}

/// A single channel configuration, as handed over by a distribution form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DistributeTarget {
    File(FileTarget),
    Mail(MailTarget),
    Hub(HubTarget),
}

impl DistributeTarget {
    pub fn channel(&self) -> DistributionChannel {
        match self {
            DistributeTarget::File(_) => DistributionChannel::File,
            DistributeTarget::Mail(_) => DistributionChannel::Mail,
            DistributeTarget::Hub(_) => DistributionChannel::Hub,
        }
    }
}

/// What to do when the output already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub enum WriteMode {
    #[default]
    Override,
    Unique,
    Abort,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(default, rename_all = "camelCase")]
pub struct FileTarget {
    /// Output path pattern, e.g. `lib://Reports/{name}_{date}.xlsx`.
    pub target: String,
    pub mode: WriteMode,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(default, rename_all = "camelCase")]
pub struct MailTarget {
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    pub subject: String,
    pub message: String,
    pub mail_server: MailServer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(default, rename_all = "camelCase")]
pub struct MailServer {
    pub host: String,
    pub port: u16,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub use_ssl: bool,
}

impl Default for MailServer {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 25,
            from: String::new(),
            username: None,
            password: None,
            use_ssl: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(default, rename_all = "camelCase")]
pub struct HubTarget {
    /// Publish target name on the hub.
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub mode: WriteMode,
}
