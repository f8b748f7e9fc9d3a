//! Concrete request/response shapes for every [`CallKind`].
//!
//! Shapes follow proto3 JSON conventions: camelCase field names, and fields
//! holding their default value are omitted on output. Re-encoding a live
//! response therefore produces the same shape a recorder would have written.

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::call_kind::CallKind;

/// A loosely-typed property bag (`google.protobuf.Struct`).
pub type PropertyMap = serde_json::Map<String, Value>;

/// Binds a [`CallKind`] to its concrete request and response types.
pub trait CallSchema {
    const KIND: CallKind;
    type Request: Serialize + DeserializeOwned + Clone + Debug + Send;
    type Response: Serialize + DeserializeOwned + Clone + Debug + Send;
}

/// Requests that target a single resource, identified by its URN.
pub trait ResourceKeyed {
    fn urn(&self) -> &str;
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero_i32(value: &i32) -> bool {
    *value == 0
}

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

/// Request/response of endpoints that carry no payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}

// ============================================================================
// Schema / plugin metadata
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetSchemaRequest {
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub version: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subpackage_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subpackage_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetSchemaResponse {
    /// The package schema, itself a JSON document encoded as a string.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub schema: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginInfo {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginAttach {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address: String,
}

// ============================================================================
// Check / Diff
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub urn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub olds: Option<PropertyMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<PropertyMap>,
    #[serde(
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty",
        default
    )]
    pub random_seed: Vec<u8>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autonaming: Option<Autonaming>,
}

/// How the engine wants a resource's physical name chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutonamingMode {
    #[default]
    Propose,
    Enforce,
    Disable,
}

impl AutonamingMode {
    fn is_propose(&self) -> bool {
        matches!(self, AutonamingMode::Propose)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Autonaming {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub proposed_name: String,
    #[serde(skip_serializing_if = "AutonamingMode::is_propose")]
    pub mode: AutonamingMode,
}

/// One validation failure reported by `Check`, `CheckConfig` or `Invoke`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckFailure {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub property: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckResponse {
    /// The validated and normalized inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<PropertyMap>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CheckFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiffRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub urn: String,
    /// Prior resource state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub olds: Option<PropertyMap>,
    /// Proposed new inputs, as returned by `Check`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<PropertyMap>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_changes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_inputs: Option<PropertyMap>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_token: String,
}

/// Overall diff verdict. `DIFF_UNKNOWN` is the proto3 default and is never
/// written out, so a recording that spells it explicitly must use `"*"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffChanges {
    #[default]
    #[serde(rename = "DIFF_UNKNOWN")]
    Unknown,
    #[serde(rename = "DIFF_NONE")]
    None,
    #[serde(rename = "DIFF_SOME")]
    Some,
}

impl DiffChanges {
    fn is_unknown(&self) -> bool {
        matches!(self, DiffChanges::Unknown)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyDiffKind {
    #[default]
    Add,
    AddReplace,
    Delete,
    DeleteReplace,
    Update,
    UpdateReplace,
}

impl PropertyDiffKind {
    fn is_add(&self) -> bool {
        matches!(self, PropertyDiffKind::Add)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyDiff {
    #[serde(skip_serializing_if = "PropertyDiffKind::is_add")]
    pub kind: PropertyDiffKind,
    #[serde(skip_serializing_if = "is_false")]
    pub input_diff: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiffResponse {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replaces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stables: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub delete_before_replace: bool,
    #[serde(skip_serializing_if = "DiffChanges::is_unknown")]
    pub changes: DiffChanges,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diffs: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub detailed_diff: BTreeMap<String, PropertyDiff>,
    #[serde(skip_serializing_if = "is_false")]
    pub has_detailed_diff: bool,
}

// ============================================================================
// Configure / Invoke / Call
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigureRequest {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<PropertyMap>,
    #[serde(skip_serializing_if = "is_false")]
    pub accept_secrets: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub accept_resources: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub sends_old_inputs: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub sends_old_inputs_to_delete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigureResponse {
    #[serde(skip_serializing_if = "is_false")]
    pub accept_secrets: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub supports_preview: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub accept_resources: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub accept_outputs: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub supports_autonaming_configuration: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvokeRequest {
    /// Function token, e.g. `pkg:index:getThing`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tok: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<PropertyMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvokeResponse {
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_value: Option<PropertyMap>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CheckFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UrnList {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub urns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tok: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<PropertyMap>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub arg_dependencies: BTreeMap<String, UrnList>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stack: String,
    #[serde(skip_serializing_if = "is_false")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallResponse {
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_value: Option<PropertyMap>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub return_dependencies: BTreeMap<String, UrnList>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CheckFailure>,
}

// ============================================================================
// Resource lifecycle
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub urn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(skip_serializing_if = "is_zero_f64")]
    pub timeout: f64,
    #[serde(skip_serializing_if = "is_false")]
    pub preview: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateResponse {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(skip_serializing_if = "is_false")]
    pub refresh_before_update: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub urn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<PropertyMap>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadResponse {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<PropertyMap>,
    #[serde(skip_serializing_if = "is_false")]
    pub refresh_before_update: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub urn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub olds: Option<PropertyMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<PropertyMap>,
    #[serde(skip_serializing_if = "is_zero_f64")]
    pub timeout: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_changes: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_inputs: Option<PropertyMap>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(skip_serializing_if = "is_false")]
    pub refresh_before_update: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub urn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(skip_serializing_if = "is_zero_f64")]
    pub timeout: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_inputs: Option<PropertyMap>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstructRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stack: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "is_false")]
    pub dry_run: bool,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_token: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<PropertyMap>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub input_dependencies: BTreeMap<String, UrnList>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstructResponse {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub urn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PropertyMap>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub state_dependencies: BTreeMap<String, UrnList>,
}

// ============================================================================
// Mappings
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetMappingRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub provider: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetMappingResponse {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub provider: String,
    #[serde(
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty",
        default
    )]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetMappingsRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetMappingsResponse {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<String>,
}

// ============================================================================
// Resource keys
// ============================================================================

macro_rules! resource_keyed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ResourceKeyed for $ty {
                fn urn(&self) -> &str {
                    &self.urn
                }
            }
        )*
    };
}

resource_keyed!(
    CheckRequest,
    DiffRequest,
    CreateRequest,
    ReadRequest,
    UpdateRequest,
    DeleteRequest,
);

// ============================================================================
// Kind markers
// ============================================================================

/// Zero-sized markers tying each [`CallKind`] to its schema.
pub mod kinds {
    use super::*;

    macro_rules! call_schema {
        ($($marker:ident => $req:ty, $resp:ty;)*) => {
            $(
                #[derive(Debug, Clone, Copy, Default)]
                pub struct $marker;

                impl CallSchema for $marker {
                    const KIND: CallKind = CallKind::$marker;
                    type Request = $req;
                    type Response = $resp;
                }
            )*
        };
    }

    call_schema! {
        GetSchema => GetSchemaRequest, GetSchemaResponse;
        CheckConfig => CheckRequest, CheckResponse;
        DiffConfig => DiffRequest, DiffResponse;
        Configure => ConfigureRequest, ConfigureResponse;
        Invoke => InvokeRequest, InvokeResponse;
        Call => CallRequest, CallResponse;
        Check => CheckRequest, CheckResponse;
        Diff => DiffRequest, DiffResponse;
        Create => CreateRequest, CreateResponse;
        Read => ReadRequest, ReadResponse;
        Update => UpdateRequest, UpdateResponse;
        Delete => DeleteRequest, Empty;
        Construct => ConstructRequest, ConstructResponse;
        Cancel => Empty, Empty;
        GetPluginInfo => Empty, PluginInfo;
        Attach => PluginAttach, Empty;
        GetMapping => GetMappingRequest, GetMappingResponse;
        GetMappings => GetMappingsRequest, GetMappingsResponse;
    }
}

/// Serde adapter for `bytes` fields, encoded as standard base64 strings.
pub mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_request_decodes_recorded_shape() {
        let req: CheckRequest = serde_json::from_value(json!({
            "urn": "urn:stack::proj::pkg:index:Bucket::b1",
            "olds": {},
            "news": {"name": "b1", "size": 3},
            "randomSeed": "AAEC",
            "type": "pkg:index:Bucket"
        }))
        .unwrap();
        assert_eq!(req.urn(), "urn:stack::proj::pkg:index:Bucket::b1");
        assert_eq!(req.random_seed, vec![0, 1, 2]);
        assert_eq!(req.type_token, "pkg:index:Bucket");
        assert_eq!(req.news.unwrap()["size"], json!(3));
    }

    #[test]
    fn test_default_fields_are_omitted_on_output() {
        let resp = DiffResponse {
            changes: DiffChanges::Some,
            diffs: vec!["size".into()],
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"changes": "DIFF_SOME", "diffs": ["size"]})
        );
        assert_eq!(serde_json::to_value(Empty {}).unwrap(), json!({}));
    }

    #[test]
    fn test_detailed_diff_kinds_use_wire_names() {
        let mut detailed = BTreeMap::new();
        detailed.insert(
            "size".to_string(),
            PropertyDiff {
                kind: PropertyDiffKind::UpdateReplace,
                input_diff: true,
            },
        );
        detailed.insert("tags".to_string(), PropertyDiff::default());
        let resp = DiffResponse {
            detailed_diff: detailed,
            has_detailed_diff: true,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({
                "detailedDiff": {
                    "size": {"kind": "UPDATE_REPLACE", "inputDiff": true},
                    "tags": {}
                },
                "hasDetailedDiff": true
            })
        );
    }

    #[test]
    fn test_invalid_base64_seed_is_a_decode_error() {
        let err = serde_json::from_value::<CheckRequest>(json!({"randomSeed": "!!"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let req: DeleteRequest =
            serde_json::from_value(json!({"id": "i-1", "urn": "u", "someFutureField": 1}))
                .unwrap();
        assert_eq!(req.id, "i-1");
    }

    #[test]
    fn test_lifecycle_fields_survive_a_round_trip() {
        let recorded = json!({"id": "i-1", "properties": {"a": 1}, "refreshBeforeUpdate": true});
        let resp: ReadResponse = serde_json::from_value(recorded.clone()).unwrap();
        assert!(resp.refresh_before_update);
        assert_eq!(serde_json::to_value(&resp).unwrap(), recorded);

        let recorded = json!({"id": "i-1", "urn": "u", "name": "b1", "type": "pkg:index:Bucket"});
        let req: DeleteRequest = serde_json::from_value(recorded.clone()).unwrap();
        assert_eq!(serde_json::to_value(&req).unwrap(), recorded);
    }

    #[test]
    fn test_check_autonaming_uses_wire_names() {
        let recorded = json!({
            "urn": "u",
            "autonaming": {"proposedName": "b1-x7", "mode": "ENFORCE"}
        });
        let req: CheckRequest = serde_json::from_value(recorded.clone()).unwrap();
        let autonaming = req.autonaming.clone().unwrap();
        assert_eq!(autonaming.mode, AutonamingMode::Enforce);
        assert_eq!(serde_json::to_value(&req).unwrap(), recorded);

        let proposed: CheckRequest =
            serde_json::from_value(json!({"autonaming": {"proposedName": "b1", "mode": "PROPOSE"}}))
                .unwrap();
        assert_eq!(
            serde_json::to_value(&proposed).unwrap(),
            json!({"autonaming": {"proposedName": "b1"}})
        );
    }

    #[test]
    fn test_unknown_diff_changes_are_not_written() {
        let resp: DiffResponse =
            serde_json::from_value(json!({"changes": "DIFF_UNKNOWN"})).unwrap();
        assert_eq!(resp.changes, DiffChanges::Unknown);
        assert_eq!(serde_json::to_value(&resp).unwrap(), json!({}));
    }

    #[test]
    fn test_kind_markers_bind_kinds() {
        assert_eq!(<kinds::Check as CallSchema>::KIND, CallKind::Check);
        assert_eq!(<kinds::GetMappings as CallSchema>::KIND, CallKind::GetMappings);
    }
}
