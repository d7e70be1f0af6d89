use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub enum SelectionKind {
    /// Values are applied as listed.
    #[default]
    Static,
    /// The report is generated once per value.
    Dynamic,
}

/// A field/value selection applied before the report is generated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(default, rename_all = "camelCase")]
pub struct Selection {
    pub name: String,
    pub values: Vec<String>,
    #[serde(rename = "type")]
    pub kind: SelectionKind,
}

impl Selection {
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            kind: SelectionKind::Static,
        }
    }

    pub fn dynamic(mut self) -> Self {
        self.kind = SelectionKind::Dynamic;
        self
    }
}

/// How selections made by the requesting user are applied.
///
/// Stored as its numeric code. Payloads written before the code existed
/// carry a boolean, read as `Normal` for `false` and `OnDemandOn` for `true`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(into = "u8")]
pub enum UserSelectionMode {
    /// User selections are ignored.
    #[default]
    Normal = 0,
    OnDemandOff = 1,
    OnDemandOn = 2,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserSelectionRepr {
    Code(u8),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown user selection mode {0} (expected 0, 1 or 2)")]
pub struct UserSelectionModeError(pub u8);

impl TryFrom<u8> for UserSelectionMode {
    type Error = UserSelectionModeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(UserSelectionMode::Normal),
            1 => Ok(UserSelectionMode::OnDemandOff),
            2 => Ok(UserSelectionMode::OnDemandOn),
            other => Err(UserSelectionModeError(other)),
        }
    }
}

impl<'de> Deserialize<'de> for UserSelectionMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match UserSelectionRepr::deserialize(deserializer)? {
            UserSelectionRepr::Code(code) => Self::try_from(code).map_err(de::Error::custom),
            UserSelectionRepr::Flag(false) => Ok(UserSelectionMode::Normal),
            UserSelectionRepr::Flag(true) => Ok(UserSelectionMode::OnDemandOn),
        }
    }
}

impl From<UserSelectionMode> for u8 {
    fn from(mode: UserSelectionMode) -> Self {
        mode as u8
    }
}
