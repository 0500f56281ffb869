//! Dialect repair for vendor WCON exports.
//!
//! The CeMEE Multi-Worm Tracker export deviates from the canonical WCON shape
//! in a handful of predictable ways:
//!
//! - `metadata.lab` is a bare string instead of a lab object;
//! - `software` and `food` sit under `units` instead of `metadata`;
//! - `data` is an object keyed by stringified record offsets instead of an
//!   array, with gaps;
//! - record ids are integers, and `t`/`x`/`y` plus every `@MWT` field are
//!   wrapped in one extra singleton list.
//!
//! [`normalize`] applies the repairs in that order. Steps whose source field
//! is absent are skipped. The repair is meant to run once over vendor input:
//! the singleton unwrap takes the first element of whatever list it finds.

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};
use wcon_sparse::SparseList;

use crate::document::{TrackData, WconDocument, DATA};
use crate::error::NormalizeError;
use crate::options::{DataLayout, NormalizeOptions};
use crate::pointer::Pointer;

const METADATA: &str = "metadata";
const UNITS: &str = "units";

/// Metadata fields the CeMEE export files under `units`.
pub const MISPLACED_METADATA: [&str; 2] = ["software", "food"];

/// Largest `data` key accepted as a record index. The sparse layout pads
/// every index below the highest one, so larger keys are rejected.
pub const MAX_RECORD_INDEX: usize = (1 << 24) - 1;

/// Repairs a deserialized WCON document. The input is left untouched.
///
/// # Errors
///
/// Fails when `data` is missing, when `metadata` or `units` is present but
/// not an object, or when a record cannot be repaired; see
/// [`NormalizeError`]. Absent optional fields are never an error.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use wcon_dialect::{normalize, NormalizeOptions};
///
/// let raw = json!({
///     "metadata": {"lab": "EEV"},
///     "units": {"t": "s", "food": "OP50"},
///     "data": {"2": {"id": 6, "t": [[0.1]], "x": [[1]], "y": [[2]]}},
/// });
/// let doc = normalize(&raw, &NormalizeOptions::default()).unwrap();
/// assert_eq!(
///     doc.into_value(),
///     json!({
///         "metadata": {"lab": {"name": "EEV"}, "food": "OP50"},
///         "units": {"t": "s"},
///         "data": [null, null, {"id": "6", "t": [0.1], "x": [1], "y": [2]}],
///     })
/// );
/// ```
pub fn normalize(doc: &Value, options: &NormalizeOptions) -> Result<WconDocument, NormalizeError> {
    let mut fields = doc
        .as_object()
        .cloned()
        .ok_or_else(|| NormalizeError::NotAnObject { at: Pointer::root() })?;

    coerce_lab(&mut fields)?;
    for name in MISPLACED_METADATA {
        relocate_unit_field(&mut fields, name)?;
    }

    let data = fields.get(DATA).ok_or(NormalizeError::MissingData)?;
    let data = repair_data(data, options)?;
    Ok(WconDocument::new(fields, data))
}

/// Looks up a top-level section. Absence is fine; any other shape than an
/// object is not.
fn section_mut<'a>(
    fields: &'a mut Map<String, Value>,
    name: &str,
) -> Result<Option<&'a mut Map<String, Value>>, NormalizeError> {
    match fields.get_mut(name) {
        None => Ok(None),
        Some(Value::Object(section)) => Ok(Some(section)),
        Some(_) => Err(NormalizeError::NotAnObject {
            at: Pointer::root().key(name),
        }),
    }
}

/// Rewraps a bare-string `metadata.lab` as `{"name": <lab>}`.
fn coerce_lab(fields: &mut Map<String, Value>) -> Result<(), NormalizeError> {
    let Some(metadata) = section_mut(fields, METADATA)? else {
        return Ok(());
    };
    let name = match metadata.get("lab") {
        Some(Value::String(name)) => name.clone(),
        _ => return Ok(()),
    };
    debug!(lab = %name, "wrapping bare lab name");
    let mut lab = Map::new();
    lab.insert("name".to_string(), Value::String(name));
    metadata.insert("lab".to_string(), Value::Object(lab));
    Ok(())
}

/// Moves `units.<name>` to `metadata.<name>`, creating `metadata` if needed.
fn relocate_unit_field(fields: &mut Map<String, Value>, name: &str) -> Result<(), NormalizeError> {
    let units = section_mut(fields, UNITS)?;
    let Some(value) = units.and_then(|units| units.shift_remove(name)) else {
        return Ok(());
    };
    debug!(field = name, "moving field from units to metadata");
    let metadata = fields
        .entry(METADATA)
        .or_insert_with(|| Value::Object(Map::new()));
    let metadata = metadata.as_object_mut().ok_or_else(|| NormalizeError::NotAnObject {
        at: Pointer::root().key(METADATA),
    })?;
    metadata.insert(name.to_string(), value);
    Ok(())
}

fn repair_data(data: &Value, options: &NormalizeOptions) -> Result<TrackData, NormalizeError> {
    let entries = match data {
        // `x` is required in a record, so an object without it is the
        // index-keyed form rather than a lone record.
        Value::Object(entries) if !entries.contains_key("x") => entries,
        _ => return Ok(TrackData::Verbatim(data.clone())),
    };
    debug!(
        records = entries.len(),
        layout = ?options.data_layout,
        "repairing index-keyed data section"
    );

    match options.data_layout {
        DataLayout::Sparse => {
            let mut list = SparseList::new();
            for (key, record) in entries {
                let index = parse_index(key)?;
                let repaired = repair_record(record, index, options)?;
                if list.set(index, repaired).is_some() {
                    warn!(key = %key, index, "data keys collide; keeping the later record");
                }
            }
            Ok(TrackData::Sparse(list))
        }
        DataLayout::Dense => {
            let mut records = Vec::with_capacity(entries.len());
            for (key, record) in entries {
                let index = parse_index(key)?;
                records.push(repair_record(record, index, options)?);
            }
            Ok(TrackData::Dense(records))
        }
    }
}

/// Parses a `data` key such as `"12"` into a record index no larger than
/// [`MAX_RECORD_INDEX`].
pub fn parse_index(key: &str) -> Result<usize, NormalizeError> {
    key.trim()
        .parse::<usize>()
        .ok()
        .filter(|&index| index <= MAX_RECORD_INDEX)
        .ok_or_else(|| NormalizeError::InvalidIndex { key: key.to_string() })
}

/// Repairs one track record found under `data/<index>`.
pub fn repair_record(
    record: &Value,
    index: usize,
    options: &NormalizeOptions,
) -> Result<Value, NormalizeError> {
    let at = Pointer::root().key(DATA).index(index);
    let mut record = record
        .as_object()
        .cloned()
        .ok_or_else(|| NormalizeError::NotAnObject { at: at.clone() })?;
    trace!(index, "repairing record");

    let id = record
        .get("id")
        .ok_or_else(|| NormalizeError::MissingField { at: at.key("id") })?;
    let id = coerce_id(id, &at.key("id"))?;
    record.insert("id".to_string(), Value::String(id));

    for field in &options.unwrap_fields {
        let field_at = at.key(field.as_str());
        let value = record
            .get(field.as_str())
            .ok_or_else(|| NormalizeError::MissingField { at: field_at.clone() })?;
        let value = unwrap_singleton(value, &field_at)?;
        record.insert(field.clone(), value);
    }

    let ext_key = options.extension_key.as_str();
    if let Some(extension) = record.get_mut(ext_key) {
        let ext_at = at.key(ext_key);
        let extension = extension
            .as_object_mut()
            .ok_or_else(|| NormalizeError::NotAnObject { at: ext_at.clone() })?;
        for (name, value) in extension.iter_mut() {
            *value = unwrap_singleton(value, &ext_at.key(name.as_str()))?;
        }
    }

    Ok(Value::Object(record))
}

/// Canonical string form of a record id. Integers render without a fraction,
/// floats the way `serde_json` prints them.
///
/// Only strings and numbers are ids. Booleans, `null` and containers fail with
/// [`NormalizeError::InvalidId`] rather than being stringified.
pub fn coerce_id(id: &Value, at: &Pointer) -> Result<String, NormalizeError> {
    match id {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(NormalizeError::InvalidId { at: at.clone() }),
    }
}

/// Takes the first element of a list. Anything else, including an empty
/// list, is a data-quality failure.
pub fn unwrap_singleton(value: &Value, at: &Pointer) -> Result<Value, NormalizeError> {
    match value {
        Value::Array(items) => items
            .first()
            .cloned()
            .ok_or_else(|| NormalizeError::NotWrapped { at: at.clone() }),
        _ => Err(NormalizeError::NotWrapped { at: at.clone() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(doc: Value) -> Value {
        normalize(&doc, &NormalizeOptions::default()).unwrap().into_value()
    }

    #[test]
    fn test_lab_string_becomes_object() {
        let out = run(json!({"metadata": {"lab": "EEV"}, "data": []}));
        assert_eq!(out["metadata"]["lab"], json!({"name": "EEV"}));
    }

    #[test]
    fn test_lab_object_is_kept() {
        let out = run(json!({"metadata": {"lab": {"name": "EEV", "location": "Paris"}}, "data": []}));
        assert_eq!(out["metadata"]["lab"], json!({"name": "EEV", "location": "Paris"}));
    }

    #[test]
    fn test_food_moves_to_metadata() {
        let out = run(json!({"units": {"t": "s", "food": "OP50"}, "data": []}));
        assert_eq!(out["metadata"], json!({"food": "OP50"}));
        assert_eq!(out["units"], json!({"t": "s"}));
    }

    #[test]
    fn test_software_overwrites_metadata_software() {
        let out = run(json!({
            "metadata": {"software": "old"},
            "units": {"software": {"name": "MWT"}},
            "data": [],
        }));
        assert_eq!(out["metadata"]["software"], json!({"name": "MWT"}));
        assert_eq!(out["units"], json!({}));
    }

    #[test]
    fn test_relocation_into_non_object_metadata_fails() {
        let doc = json!({"metadata": "nope", "units": {"food": "OP50"}, "data": []});
        let err = normalize(&doc, &NormalizeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::NotAnObject { at: Pointer::root().key("metadata") }
        );
    }

    #[test]
    fn test_non_object_sections_fail() {
        let options = NormalizeOptions::default();
        let err = normalize(&json!({"metadata": "EEV", "data": []}), &options).unwrap_err();
        assert_eq!(err, NormalizeError::NotAnObject { at: Pointer::root().key("metadata") });

        let err = normalize(&json!({"units": "mm", "data": []}), &options).unwrap_err();
        assert_eq!(err, NormalizeError::NotAnObject { at: Pointer::root().key("units") });

        let err = normalize(&json!({"metadata": null, "data": []}), &options).unwrap_err();
        assert_eq!(err, NormalizeError::NotAnObject { at: Pointer::root().key("metadata") });
    }

    #[test]
    fn test_absent_sections_are_fine() {
        let out = run(json!({"data": []}));
        assert_eq!(out, json!({"data": []}));
    }

    #[test]
    fn test_missing_data() {
        let err = normalize(&json!({"metadata": {}}), &NormalizeOptions::default()).unwrap_err();
        assert_eq!(err, NormalizeError::MissingData);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let doc = json!({"units": {"food": "OP50"}, "data": {"0": {"id": 1, "t": [[0]], "x": [[0]], "y": [[0]]}}});
        let before = doc.clone();
        let _ = normalize(&doc, &NormalizeOptions::default()).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn test_single_record_object_is_left_alone() {
        let out = run(json!({"data": {"id": 3, "t": 0.5, "x": [1], "y": [2]}}));
        assert_eq!(out["data"], json!({"id": 3, "t": 0.5, "x": [1], "y": [2]}));
    }

    #[test]
    fn test_array_data_is_left_alone() {
        let out = run(json!({"data": [{"id": "1", "t": [0], "x": [[1]], "y": [[2]]}]}));
        assert_eq!(out["data"], json!([{"id": "1", "t": [0], "x": [[1]], "y": [[2]]}]));
    }

    #[test]
    fn test_coerce_id() {
        let at = Pointer::root();
        assert_eq!(coerce_id(&json!(6), &at).unwrap(), "6");
        assert_eq!(coerce_id(&json!(6.5), &at).unwrap(), "6.5");
        assert_eq!(coerce_id(&json!("w1"), &at).unwrap(), "w1");
        assert!(coerce_id(&json!(null), &at).is_err());
        assert!(coerce_id(&json!(true), &at).is_err());
    }

    #[test]
    fn test_unwrap_singleton() {
        let at = Pointer::root();
        assert_eq!(unwrap_singleton(&json!([[1, 2]]), &at).unwrap(), json!([1, 2]));
        assert_eq!(unwrap_singleton(&json!([7]), &at).unwrap(), json!(7));
        assert!(unwrap_singleton(&json!([]), &at).is_err());
        assert!(unwrap_singleton(&json!(7), &at).is_err());
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0").unwrap(), 0);
        assert_eq!(parse_index("12").unwrap(), 12);
        assert_eq!(
            parse_index("x1").unwrap_err(),
            NormalizeError::InvalidIndex { key: "x1".to_string() }
        );
        assert!(parse_index("-1").is_err());
        assert_eq!(parse_index(&MAX_RECORD_INDEX.to_string()).unwrap(), MAX_RECORD_INDEX);
        assert!(parse_index(&(MAX_RECORD_INDEX + 1).to_string()).is_err());
        assert!(parse_index(&usize::MAX.to_string()).is_err());
    }

    #[test]
    fn test_record_without_extension_is_repaired() {
        let out = run(json!({"data": {"0": {"id": 1, "t": [[0.0]], "x": [[1]], "y": [[2]]}}}));
        assert_eq!(out["data"][0], json!({"id": "1", "t": [0.0], "x": [1], "y": [2]}));
    }

    #[test]
    fn test_custom_unwrap_fields() {
        let options = NormalizeOptions {
            unwrap_fields: vec!["t".to_string(), "x".to_string()],
            ..NormalizeOptions::default()
        };
        let doc = json!({"data": {"0": {"id": 1, "t": [[0]], "x": [[1]]}}});
        let out = normalize(&doc, &options).unwrap().into_value();
        assert_eq!(out["data"], json!([{"id": "1", "t": [0], "x": [1]}]));
    }
}
