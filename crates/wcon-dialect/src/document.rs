//! Normalized WCON documents.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use wcon_sparse::SparseList;

pub(crate) const DATA: &str = "data";

/// The `data` section of a normalized document.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackData {
    /// Already an array, or a single record object; carried over unchanged.
    Verbatim(Value),
    /// Repaired records at their source indices.
    Sparse(SparseList<Value>),
    /// Repaired records packed in source order.
    Dense(Vec<Value>),
}

impl TrackData {
    /// Number of slots a consumer walks, gaps included.
    pub fn span(&self) -> usize {
        match self {
            TrackData::Verbatim(Value::Array(items)) => items.len(),
            TrackData::Verbatim(_) => 1,
            TrackData::Sparse(list) => list.span(),
            TrackData::Dense(records) => records.len(),
        }
    }

    /// Walks the section as a sequence of slots. Gaps and `null` elements
    /// come out as `None`; a single verbatim record is a one-slot sequence.
    pub fn slots(&self) -> Box<dyn Iterator<Item = Option<&Value>> + '_> {
        match self {
            TrackData::Verbatim(Value::Array(items)) => {
                Box::new(items.iter().map(|v| (!v.is_null()).then_some(v)))
            }
            TrackData::Verbatim(record) => Box::new(std::iter::once(Some(record))),
            TrackData::Sparse(list) => Box::new(list.iter()),
            TrackData::Dense(records) => Box::new(records.iter().map(Some)),
        }
    }

    pub fn as_sparse(&self) -> Option<&SparseList<Value>> {
        match self {
            TrackData::Sparse(list) => Some(list),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            TrackData::Verbatim(value) => value,
            TrackData::Sparse(list) => Value::Array(
                list.into_iter()
                    .map(|slot| slot.unwrap_or(Value::Null))
                    .collect(),
            ),
            TrackData::Dense(records) => Value::Array(records),
        }
    }
}

impl Serialize for TrackData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TrackData::Verbatim(value) => value.serialize(serializer),
            TrackData::Sparse(list) => list.serialize(serializer),
            TrackData::Dense(records) => records.serialize(serializer),
        }
    }
}

/// A WCON document after dialect repair.
///
/// Top-level fields keep their source order; `data` is serialized at the
/// position it occupied in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct WconDocument {
    // Holds a `null` placeholder under `data` to remember its position.
    fields: Map<String, Value>,
    data: TrackData,
}

impl WconDocument {
    pub(crate) fn new(mut fields: Map<String, Value>, data: TrackData) -> Self {
        fields.insert(DATA.to_string(), Value::Null);
        Self { fields, data }
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.fields.get("metadata").and_then(Value::as_object)
    }

    pub fn units(&self) -> Option<&Map<String, Value>> {
        self.fields.get("units").and_then(Value::as_object)
    }

    pub fn data(&self) -> &TrackData {
        &self.data
    }

    /// Any top-level field other than `data`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        if key == DATA {
            return None;
        }
        self.fields.get(key)
    }

    pub fn into_value(self) -> Value {
        let WconDocument { fields, data } = self;
        let mut data = Some(data);
        let out = fields
            .into_iter()
            .map(|(key, value)| {
                if key == DATA {
                    let data = data.take().map_or(Value::Null, TrackData::into_value);
                    (key, data)
                } else {
                    (key, value)
                }
            })
            .collect();
        Value::Object(out)
    }
}

impl Serialize for WconDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            if key == DATA {
                map.serialize_entry(key, &self.data)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}
