use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

/// Parameters extracted by [`PathTemplate::parse`](crate::PathTemplate::parse).
///
/// Every parameter of the template has an entry. Optional parameters that
/// matched nothing map to `None`.
pub type Params = BTreeMap<String, Option<Value>>;

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(i64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// `""`, `0` and `false` are falsy; lists never are.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0,
            Self::String(s) => !s.is_empty(),
            Self::List(_) => true,
        }
    }

    /// Appends the path fragments this value contributes.
    ///
    /// A falsy scalar contributes nothing. List elements are stringified
    /// unconditionally and nested lists are flattened.
    pub(crate) fn push_fragments(&self, out: &mut Vec<String>) {
        match self {
            Self::List(items) => {
                for item in items {
                    item.push_element(out);
                }
            }
            scalar => {
                if scalar.is_truthy() {
                    out.push(scalar.to_string());
                }
            }
        }
    }
    fn push_element(&self, out: &mut Vec<String>) {
        match self {
            Self::List(items) => {
                for item in items {
                    item.push_element(out);
                }
            }
            scalar => out.push(scalar.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "/")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}
impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

/// A JSON object was supplied where a path parameter was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedValue;

impl fmt::Display for UnsupportedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Paths doesn't support object parameters")
    }
}
impl std::error::Error for UnsupportedValue {}

impl TryFrom<&serde_json::Value> for Value {
    type Error = UnsupportedValue;

    /// `null` cannot be represented and is rejected too; use
    /// [`BuildParams`] on a JSON map to treat it as absent.
    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        from_json(value)?.ok_or(UnsupportedValue)
    }
}

fn from_json(value: &serde_json::Value) -> Result<Option<Value>, UnsupportedValue> {
    use serde_json::Value as Json;
    Ok(Some(match value {
        Json::Null => return Ok(None),
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(n) => Value::Number(n),
            None => Value::String(n.to_string()),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                if let Some(item) = from_json(item)? {
                    list.push(item);
                }
            }
            Value::List(list)
        }
        Json::Object(_) => return Err(UnsupportedValue),
    }))
}

/// Source of parameter values for [`PathTemplate::build`](crate::PathTemplate::build).
///
/// `Ok(None)` means the parameter is absent.
pub trait BuildParams {
    fn param(&mut self, name: &str) -> Result<Option<Cow<Value>>, UnsupportedValue>;
}

/// A map value usable as a build parameter.
pub trait ToParam {
    fn to_param(&self) -> Option<Cow<Value>>;
}
impl ToParam for Value {
    fn to_param(&self) -> Option<Cow<Value>> {
        Some(Cow::Borrowed(self))
    }
}
impl ToParam for Option<Value> {
    fn to_param(&self) -> Option<Cow<Value>> {
        self.as_ref().map(Cow::Borrowed)
    }
}
impl ToParam for &str {
    fn to_param(&self) -> Option<Cow<Value>> {
        Some(Cow::Owned(Value::from(*self)))
    }
}
impl ToParam for String {
    fn to_param(&self) -> Option<Cow<Value>> {
        Some(Cow::Owned(Value::from(self.as_str())))
    }
}
impl ToParam for i64 {
    fn to_param(&self) -> Option<Cow<Value>> {
        Some(Cow::Owned(Value::Number(*self)))
    }
}

impl BuildParams for () {
    fn param(&mut self, _name: &str) -> Result<Option<Cow<Value>>, UnsupportedValue> {
        Ok(None)
    }
}
impl<K, V> BuildParams for &HashMap<K, V>
where
    K: Borrow<str> + Hash + Eq,
    V: ToParam,
{
    fn param(&mut self, name: &str) -> Result<Option<Cow<Value>>, UnsupportedValue> {
        Ok(self.get(name).and_then(ToParam::to_param))
    }
}
impl<K, V> BuildParams for &BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: ToParam,
{
    fn param(&mut self, name: &str) -> Result<Option<Cow<Value>>, UnsupportedValue> {
        Ok(self.get(name).and_then(ToParam::to_param))
    }
}
impl<V: ToParam> BuildParams for &[(&str, V)] {
    fn param(&mut self, name: &str) -> Result<Option<Cow<Value>>, UnsupportedValue> {
        Ok(self
            .iter()
            .find(|(k, _)| *k == name)
            .and_then(|(_, v)| v.to_param()))
    }
}
impl BuildParams for &serde_json::Map<String, serde_json::Value> {
    fn param(&mut self, name: &str) -> Result<Option<Cow<Value>>, UnsupportedValue> {
        json_param(self, name)
    }
}
/// Anything but a JSON object supplies no parameters.
impl BuildParams for &serde_json::Value {
    fn param(&mut self, name: &str) -> Result<Option<Cow<Value>>, UnsupportedValue> {
        match self {
            serde_json::Value::Object(map) => json_param(map, name),
            _ => Ok(None),
        }
    }
}

fn json_param(
    map: &serde_json::Map<String, serde_json::Value>,
    name: &str,
) -> Result<Option<Cow<'static, Value>>, UnsupportedValue> {
    match map.get(name) {
        Some(value) => Ok(from_json(value)?.map(Cow::Owned)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragments(value: &Value) -> Vec<String> {
        let mut out = Vec::new();
        value.push_fragments(&mut out);
        out
    }

    #[test]
    fn falsy_scalars_contribute_nothing() {
        assert!(fragments(&Value::from("")).is_empty());
        assert!(fragments(&Value::from(0)).is_empty());
        assert!(fragments(&Value::from(false)).is_empty());
        assert_eq!(fragments(&Value::from(true)), ["true"]);
        assert_eq!(fragments(&Value::from(-1)), ["-1"]);
    }

    #[test]
    fn lists_flatten() {
        let v = Value::List(vec![
            Value::from("a"),
            Value::from(vec![1, 0]),
            Value::from(false),
        ]);
        assert_eq!(fragments(&v), ["a", "1", "0", "false"]);
        assert!(fragments(&Value::List(vec![])).is_empty());
    }

    #[test]
    fn json_conversion() {
        assert_eq!(Value::try_from(&json!("x")), Ok(Value::from("x")));
        assert_eq!(Value::try_from(&json!(12)), Ok(Value::Number(12)));
        assert_eq!(Value::try_from(&json!(1.5)), Ok(Value::from("1.5")));
        assert_eq!(
            Value::try_from(&json!(["a", null, 2])),
            Ok(Value::from(vec![Value::from("a"), Value::from(2)]))
        );
        assert_eq!(Value::try_from(&json!({"a": 1})), Err(UnsupportedValue));
        assert_eq!(Value::try_from(&json!([{"a": 1}])), Err(UnsupportedValue));
        assert_eq!(Value::try_from(&json!(null)), Err(UnsupportedValue));
    }

    #[test]
    fn serde_untagged() {
        let v: Value = serde_json::from_value(json!(["a", 1, true])).unwrap();
        assert_eq!(
            v,
            Value::List(vec![Value::from("a"), Value::from(1), Value::from(true)])
        );
        assert_eq!(serde_json::to_value(&v).unwrap(), json!(["a", 1, true]));
    }

    #[test]
    fn json_map_lookup() {
        let params = json!({"a": "x", "b": null, "c": {"d": 1}});
        let mut p = &params;
        assert_eq!(p.param("a").unwrap().as_deref(), Some(&Value::from("x")));
        assert_eq!(p.param("b").unwrap(), None);
        assert_eq!(p.param("z").unwrap(), None);
        assert_eq!(p.param("c"), Err(UnsupportedValue));
    }
}
