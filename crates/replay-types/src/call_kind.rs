//! The closed set of provider endpoints a transcript may reference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Service prefix used by recorded method paths.
pub const SERVICE_PATH: &str = "/provider.ResourceProvider/";

/// One resource provider RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallKind {
    GetSchema,
    CheckConfig,
    DiffConfig,
    Configure,
    Invoke,
    Call,
    /// Validate and normalize resource inputs.
    Check,
    /// Compute the difference between old state and proposed inputs.
    Diff,
    Create,
    Read,
    Update,
    Delete,
    Construct,
    Cancel,
    GetPluginInfo,
    Attach,
    GetMapping,
    GetMappings,
}

impl CallKind {
    /// Every supported kind, in declaration order.
    pub const ALL: [CallKind; 18] = [
        CallKind::GetSchema,
        CallKind::CheckConfig,
        CallKind::DiffConfig,
        CallKind::Configure,
        CallKind::Invoke,
        CallKind::Call,
        CallKind::Check,
        CallKind::Diff,
        CallKind::Create,
        CallKind::Read,
        CallKind::Update,
        CallKind::Delete,
        CallKind::Construct,
        CallKind::Cancel,
        CallKind::GetPluginInfo,
        CallKind::Attach,
        CallKind::GetMapping,
        CallKind::GetMappings,
    ];

    /// Short endpoint name, e.g. `Check`.
    pub fn name(self) -> &'static str {
        match self {
            CallKind::GetSchema => "GetSchema",
            CallKind::CheckConfig => "CheckConfig",
            CallKind::DiffConfig => "DiffConfig",
            CallKind::Configure => "Configure",
            CallKind::Invoke => "Invoke",
            CallKind::Call => "Call",
            CallKind::Check => "Check",
            CallKind::Diff => "Diff",
            CallKind::Create => "Create",
            CallKind::Read => "Read",
            CallKind::Update => "Update",
            CallKind::Delete => "Delete",
            CallKind::Construct => "Construct",
            CallKind::Cancel => "Cancel",
            CallKind::GetPluginInfo => "GetPluginInfo",
            CallKind::Attach => "Attach",
            CallKind::GetMapping => "GetMapping",
            CallKind::GetMappings => "GetMappings",
        }
    }

    /// Namespaced method path as it appears in transcripts.
    pub fn method_path(self) -> String {
        format!("{}{}", SERVICE_PATH, self.name())
    }

    /// Resolve a recorded method string.
    ///
    /// Accepts the namespaced path form (`/provider.ResourceProvider/Check`)
    /// and the bare name (`Check`).
    pub fn from_method(method: &str) -> Option<CallKind> {
        let name = method.strip_prefix(SERVICE_PATH).unwrap_or(method);
        CallKind::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CallKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CallKind::from_method(s.trim()).ok_or_else(|| format!("unknown method: {}", s))
    }
}

impl Serialize for CallKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.method_path())
    }
}

impl<'de> Deserialize<'de> for CallKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let method = String::deserialize(deserializer)?;
        CallKind::from_method(&method)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown method: {}", method)))
    }
}
