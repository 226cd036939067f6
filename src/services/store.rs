use crate::models::VenueRecord;
use crate::services::error::ServiceError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Server-side predicate of a venue query
///
/// Only predicates the store can serve from single-field indexes are
/// expressible: one capacity band plus equality and array-contains checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `capacity_min <= guests AND capacity_max >= guests`
    CapacityBand { guests: u32 },
    Equals { field: &'static str, value: String },
    ArrayContains { field: &'static str, value: String },
}

impl Predicate {
    pub fn is_range(&self) -> bool {
        matches!(self, Predicate::CapacityBand { .. })
    }

    /// Evaluate the predicate against a document the way the store would
    pub fn matches(&self, record: &VenueRecord) -> bool {
        match self {
            Predicate::CapacityBand { guests } => {
                matches!(record.capacity_min, Some(min) if min <= *guests)
                    && matches!(record.capacity_max, Some(max) if max >= *guests)
            }
            Predicate::Equals { field, value } => {
                string_field(record, field).map_or(false, |v| v == value)
            }
            Predicate::ArrayContains { field, value } => {
                array_field(record, field).map_or(false, |values| values.iter().any(|v| v == value))
            }
        }
    }
}

fn string_field<'a>(record: &'a VenueRecord, field: &str) -> Option<&'a str> {
    match field {
        "district" => record.district.as_deref(),
        "name" => record.name.as_deref(),
        "id" => record.id.as_deref(),
        _ => None,
    }
}

fn array_field<'a>(record: &'a VenueRecord, field: &str) -> Option<&'a [String]> {
    match field {
        "cuisine" => Some(&record.cuisine),
        "facilities" => Some(&record.facilities),
        "services" => Some(&record.services),
        "tags" => Some(&record.tags),
        _ => None,
    }
}

/// Venue collection query: predicates plus a read cap
#[derive(Debug, Clone, PartialEq)]
pub struct VenueQuery {
    predicates: Vec<Predicate>,
    limit: usize,
}

impl VenueQuery {
    /// Base query with no predicates
    pub fn unfiltered(limit: usize) -> Self {
        Self {
            predicates: Vec::new(),
            limit,
        }
    }

    /// Add a predicate; a second capacity band replaces the first
    pub fn with(mut self, predicate: Predicate) -> Self {
        if predicate.is_range() {
            self.predicates.retain(|p| !p.is_range());
        }
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, record: &VenueRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}

/// Read access to the venue collection
#[async_trait]
pub trait VenueStore: Send + Sync {
    /// Fetch at most `query.limit()` documents matching every predicate
    async fn query(&self, query: &VenueQuery) -> Result<Vec<VenueRecord>, ServiceError>;

    /// Cheap reachability probe
    async fn ping(&self) -> Result<(), ServiceError>;
}

/// Flatten a typed-value wire document into a plain JSON object
///
/// Documents shaped `{"fields": {"name": {"stringValue": "..."}}}` become
/// `{"name": "..."}`. Anything else is returned unchanged.
pub fn flatten_typed_document(doc: Value) -> Value {
    match doc {
        Value::Object(mut obj) => match obj.remove("fields") {
            Some(Value::Object(fields)) => Value::Object(flatten_fields(fields)),
            Some(other) => {
                obj.insert("fields".to_string(), other);
                Value::Object(obj)
            }
            None => Value::Object(obj),
        },
        other => other,
    }
}

fn flatten_fields(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, node)| (key, flatten_typed_value(node)))
        .collect()
}

fn flatten_typed_value(node: Value) -> Value {
    let Value::Object(mut obj) = node else {
        return node;
    };

    if let Some(v) = obj.remove("stringValue") {
        return v;
    }
    if let Some(v) = obj.remove("integerValue") {
        // Integers travel as strings on the wire
        return match &v {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(v),
            _ => v,
        };
    }
    if let Some(v) = obj.remove("doubleValue") {
        return v;
    }
    if let Some(v) = obj.remove("booleanValue") {
        return v;
    }
    if let Some(v) = obj.remove("timestampValue") {
        return v;
    }
    if obj.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(array) = obj.remove("arrayValue") {
        let values = match array {
            Value::Object(mut a) => match a.remove("values") {
                Some(Value::Array(values)) => values,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        return Value::Array(values.into_iter().map(flatten_typed_value).collect());
    }
    if let Some(map) = obj.remove("mapValue") {
        let fields = match map {
            Value::Object(mut m) => match m.remove("fields") {
                Some(Value::Object(fields)) => fields,
                _ => Map::new(),
            },
            _ => Map::new(),
        };
        return Value::Object(flatten_fields(fields));
    }

    Value::Object(obj)
}

/// Decode one store document, skipping documents that do not fit the schema
pub fn decode_record(doc: Value) -> Option<VenueRecord> {
    let flat = flatten_typed_document(doc);
    let data = match flat.get("data") {
        Some(data @ Value::Object(_)) => data.clone(),
        _ => flat,
    };

    match serde_json::from_value(data) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!("Skipping undecodable venue document: {}", e);
            None
        }
    }
}
