//! Values accepted by [`Block::assign`](crate::Block::assign)

use std::collections::{BTreeMap, HashMap};

/// A value bound to a template variable.
///
/// Scalars are substituted as-is. Lists and maps are flattened into dotted
/// keys at assignment time, so `user = { name = "Ann" }` binds `user.name`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(String),
    /// Elements are keyed by their index (`items.0`, `items.1`, ...)
    List(Vec<Value>),
    /// Entries keep their insertion order
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Build a map value from key/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The scalar text, if this is a scalar
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Flatten into `(dotted key, scalar)` pairs rooted at `key`
    pub fn flatten(&self, key: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into(key, &mut out);
        out
    }

    fn flatten_into(&self, key: &str, out: &mut Vec<(String, String)>) {
        match self {
            Value::Scalar(s) => out.push((key.to_string(), s.clone())),
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    item.flatten_into(&format!("{}.{}", key, index), out);
                }
            }
            Value::Map(entries) => {
                for (sub_key, item) in entries {
                    item.flatten_into(&format!("{}.{}", key, sub_key), out);
                }
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Scalar(s.clone())
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Scalar(c.to_string())
    }
}

macro_rules! scalar_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Scalar(v.to_string())
                }
            }
        )*
    };
}

scalar_from_display!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(entries: BTreeMap<K, V>) -> Self {
        Value::map(entries)
    }
}

/// Iteration order of a `HashMap` is unspecified; entries are sorted by key
/// so that assignment order is deterministic.
impl<K: Into<String>, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(entries: HashMap<K, V>) -> Self {
        let mut pairs: Vec<(String, Value)> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Map(pairs)
    }
}

impl From<toml::Value> for Value {
    fn from(v: toml::Value) -> Self {
        match v {
            toml::Value::String(s) => Value::Scalar(s),
            toml::Value::Integer(i) => Value::Scalar(i.to_string()),
            toml::Value::Float(f) => Value::Scalar(f.to_string()),
            toml::Value::Boolean(b) => Value::Scalar(b.to_string()),
            toml::Value::Datetime(d) => Value::Scalar(d.to_string()),
            toml::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            toml::Value::Table(table) => Value::from(table),
        }
    }
}

impl From<toml::Table> for Value {
    fn from(table: toml::Table) -> Self {
        Value::Map(table.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
    }
}
