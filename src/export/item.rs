use serde_json::{Map, Number, Value};

use super::registry::ResourceKind;

/// Top-level keys probed for the remote identifier
const ID_KEYS: &[&str] = &[
    "jpro_id",
    "id",
    "Id",
    "ID",
    "profileId",
    "profileID",
    "uuid",
    "uid",
];

/// Keys probed for the identifier inside a nested object
const NESTED_ID_KEYS: &[&str] = &["jpro_id", "id", "uuid", "profileId"];

/// Top-level keys probed for the display name
const NAME_KEYS: &[&str] = &[
    "name",
    "displayName",
    "profileName",
    "computer_group_name",
    "generalName",
];

/// Nested objects some endpoints wrap the record in
const NESTED_KEYS: &[&str] = &[
    "general",
    "profile",
    "configurationProfile",
    "payloadContent",
    "data",
];

/// One object as returned by the tenant
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    /// Identifier used by the provider to import the object
    pub remote_id: String,
    /// Human-readable name, empty when the record carried none
    pub display_name: String,
    /// Full record, untouched
    pub payload: Value,
}

impl RawItem {
    /// Build an item from an API record.
    ///
    /// Hands the record back when no identifier can be found, since such a
    /// record cannot be imported.
    pub fn from_record(record: Value) -> Result<Self, Value> {
        let Some(map) = record.as_object() else {
            return Err(record);
        };
        let Some(remote_id) = extract_id(map) else {
            return Err(record);
        };
        let display_name = extract_name(map).unwrap_or_default();

        Ok(Self {
            remote_id,
            display_name,
            payload: record,
        })
    }
}

/// Display name of a record, whether or not it carries an identifier
pub fn record_name(record: &Value) -> Option<String> {
    record.as_object().and_then(extract_name)
}

/// A raw item bound to its kind and assigned local identifier
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    pub kind: ResourceKind,
    pub item: RawItem,
    pub local_identifier: String,
}

impl NormalizedItem {
    /// Fully-qualified resource address, e.g. `jamfpro_policy.renew_cert`
    pub fn address(&self) -> String {
        format!("{}.{}", self.kind.type_tag(), self.local_identifier)
    }
}

fn extract_id(map: &Map<String, Value>) -> Option<String> {
    ID_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(scalar_to_string))
        .or_else(|| {
            nested_objects(map).find_map(|nested| {
                NESTED_ID_KEYS
                    .iter()
                    .find_map(|key| nested.get(*key).and_then(scalar_to_string))
            })
        })
}

fn extract_name(map: &Map<String, Value>) -> Option<String> {
    NAME_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(non_empty_str))
        .or_else(|| {
            nested_objects(map).find_map(|nested| nested.get("name").and_then(non_empty_str))
        })
}

fn nested_objects(map: &Map<String, Value>) -> impl Iterator<Item = &Map<String, Value>> {
    NESTED_KEYS
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_object))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(number_to_string(n)),
        _ => None,
    }
}

/// Integral numbers render without a fraction, even when sent as `42.0`
fn number_to_string(n: &Number) -> String {
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e18 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
impl RawItem {
    /// Create a raw item with an empty payload
    pub fn new(remote_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            remote_id: remote_id.into(),
            display_name: display_name.into(),
            payload: Value::Object(Map::new()),
        }
    }

    /// Attach the full record
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}
