use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

/// A keyword: optional namespace plus required local name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Keyword {
    pub ns: Option<String>,
    pub name: String,
}

impl Keyword {
    /// A bare keyword with no namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            ns: None,
            name: name.into(),
        }
    }

    /// A namespaced keyword.
    pub fn namespaced(ns: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ns: Some(ns.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns {
            Some(ns) => write!(f, ":{ns}/{}", self.name),
            None => write!(f, ":{}", self.name),
        }
    }
}

/// Every value AtomDB can persist, as a closed sum type.
///
/// Persistence dispatches on the variant; reification dispatches on the
/// corresponding chunk tag. Adding a kind means adding a variant plus a
/// persister arm and a loader arm, and the exhaustive matches make the
/// compiler point at every site that needs one.
///
/// `Value` carries its own canonical total order ([`Ord`]): rank by kind,
/// then by contents, with floats compared via `f64::total_cmp` and
/// timestamps by instant. Map and set iteration follow this order, which is
/// what makes serialized forms (and therefore chunk hashes) independent of
/// insertion order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Bigdec(String),
    /// Textual ratio in `"n/d"` form.
    Ratio(String),
    Str(String),
    Symbol(String),
    Keyword(Keyword),
    Uuid(Uuid),
    /// An instant; always rendered as ISO-8601/RFC 3339 in UTC.
    Timestamp(#[serde(with = "rfc3339_utc")] OffsetDateTime),
    Map(#[serde(with = "map_pairs")] BTreeMap<Value, Value>),
    Vector(Vec<Value>),
    List(VecDeque<Value>),
    Set(BTreeSet<Value>),
}

impl Value {
    /// Kind name for diagnostics and error paths.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bigdec(_) => "bigdec",
            Value::Ratio(_) => "ratio",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::Uuid(_) => "uuid",
            Value::Timestamp(_) => "timestamp",
            Value::Map(_) => "map",
            Value::Vector(_) => "vector",
            Value::List(_) => "list",
            Value::Set(_) => "set",
        }
    }

    /// Returns `true` for map, vector, list, and set values.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Value::Map(_) | Value::Vector(_) | Value::List(_) | Value::Set(_)
        )
    }

    /// A timestamp value, normalized to UTC.
    pub fn timestamp(instant: OffsetDateTime) -> Self {
        Value::Timestamp(instant.to_offset(UtcOffset::UTC))
    }

    /// A string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// A bare keyword value.
    pub fn keyword(name: impl Into<String>) -> Self {
        Value::Keyword(Keyword::new(name))
    }

    /// A symbol value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// A map value from key/value pairs.
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(entries.into_iter().collect())
    }

    /// A vector value.
    pub fn vector(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Vector(items.into_iter().collect())
    }

    /// A list value.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    /// A set value.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(items.into_iter().collect())
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Bigdec(_) => 4,
            Value::Ratio(_) => 5,
            Value::Str(_) => 6,
            Value::Symbol(_) => 7,
            Value::Keyword(_) => 8,
            Value::Uuid(_) => 9,
            Value::Timestamp(_) => 10,
            Value::Map(_) => 11,
            Value::Vector(_) => 12,
            Value::List(_) => 13,
            Value::Set(_) => 14,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Bigdec(a), Value::Bigdec(b)) => a.cmp(b),
            (Value::Ratio(a), Value::Ratio(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Symbol(a), Value::Symbol(b)) => a.cmp(b),
            (Value::Keyword(a), Value::Keyword(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            // OffsetDateTime compares by instant, so two offsets denoting
            // the same moment are the same key.
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.iter().cmp(b.iter()),
            (Value::Vector(a), Value::Vector(b)) => a.iter().cmp(b.iter()),
            (Value::List(a), Value::List(b)) => a.iter().cmp(b.iter()),
            (Value::Set(a), Value::Set(b)) => a.iter().cmp(b.iter()),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind_rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            // Bit pattern, consistent with total_cmp-based equality.
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bigdec(s) | Value::Ratio(s) | Value::Str(s) | Value::Symbol(s) => {
                s.hash(state)
            }
            Value::Keyword(k) => k.hash(state),
            Value::Uuid(u) => u.hash(state),
            Value::Timestamp(t) => t.unix_timestamp_nanos().hash(state),
            Value::Map(m) => {
                m.len().hash(state);
                for (k, v) in m {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Vector(xs) => {
                xs.len().hash(state);
                for x in xs {
                    x.hash(state);
                }
            }
            Value::List(xs) => {
                xs.len().hash(state);
                for x in xs {
                    x.hash(state);
                }
            }
            Value::Set(xs) => {
                xs.len().hash(state);
                for x in xs {
                    x.hash(state);
                }
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<Keyword> for Value {
    fn from(k: Keyword) -> Self {
        Value::Keyword(k)
    }
}

/// Timestamps serialize as RFC 3339 in UTC regardless of the stored offset,
/// so equal instants always produce equal bytes.
mod rfc3339_utc {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::Rfc3339;
    use time::{OffsetDateTime, UtcOffset};

    pub fn serialize<S: Serializer>(
        instant: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let text = instant
            .to_offset(UtcOffset::UTC)
            .format(&Rfc3339)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&text, &Rfc3339).map_err(serde::de::Error::custom)
    }
}

/// Maps serialize as sequences of `[key, value]` pairs in canonical key
/// order, because composite keys have no direct representation as JSON
/// object keys.
mod map_pairs {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::Value;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<Value, Value>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Value, Value>, D::Error> {
        let pairs: Vec<(Value, Value)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
