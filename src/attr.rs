//! Typed attribute values.
//!
//! Every node kind declares its attributes as ordinary struct fields. This
//! module provides the dynamic view used by name-based access
//! (`get_attr("gram/negation")`), by the data loaders, and by the
//! reference backindex: [`AttrValue`] for values, [`AttrType`] for the
//! declared type of a field, and [`AttrField`] for coercion between the two.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};

/// Nested string-keyed attribute map (e.g. `gram`, `morphcat`, `wild`).
pub type AttrMap = BTreeMap<String, AttrValue>;

/// A dynamically typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<AttrValue>),
    Map(AttrMap),
}

impl AttrValue {
    /// Short name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Str(_) => "str",
            AttrValue::List(_) => "list",
            AttrValue::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttrMap> {
        match self {
            AttrValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Node ids held by a reference attribute value.
    ///
    /// A single string is one id, a list contributes every string it holds.
    pub fn referenced_ids(&self) -> Vec<String> {
        match self {
            AttrValue::Str(id) => vec![id.clone()],
            AttrValue::List(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the value would be dropped when serializing a node
    /// (false, empty list or empty map).
    pub fn is_blank(&self) -> bool {
        match self {
            AttrValue::Bool(b) => !b,
            AttrValue::List(items) => items.is_empty(),
            AttrValue::Map(map) => map.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            AttrValue::Int(n) => write!(f, "{}", n),
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            AttrValue::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::List(value.into_iter().map(AttrValue::Str).collect())
    }
}

impl From<AttrMap> for AttrValue {
    fn from(value: AttrMap) -> Self {
        AttrValue::Map(value)
    }
}

/// Declared type of a node attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrType {
    Str,
    Bool,
    Int,
    Map,
    List,
}

impl AttrType {
    pub fn name(self) -> &'static str {
        match self {
            AttrType::Str => "str",
            AttrType::Bool => "bool",
            AttrType::Int => "int",
            AttrType::Map => "map",
            AttrType::List => "list",
        }
    }
}

/// Conversion between a typed struct field and its [`AttrValue`] form.
///
/// `from_attr` performs the loader's type coercion: a missing value becomes
/// an empty container for list and map fields, `false` for flags and `None`
/// for everything else; `"1"`/`"0"` are accepted as booleans and numeric
/// strings as integers.
pub trait AttrField: Sized {
    const TYPE: AttrType;

    /// Current value, `None` when unset.
    fn to_attr(&self) -> Option<AttrValue>;

    /// Coerce a (possibly missing) value into the field type.
    fn from_attr(attr: &str, value: Option<AttrValue>) -> TreeResult<Self>;
}

fn type_mismatch(attr: &str, expected: AttrType, found: &AttrValue) -> TreeError {
    TreeError::AttrType {
        attr: attr.to_string(),
        expected: expected.name(),
        found: found.to_string(),
    }
}

impl AttrField for Option<String> {
    const TYPE: AttrType = AttrType::Str;

    fn to_attr(&self) -> Option<AttrValue> {
        self.clone().map(AttrValue::Str)
    }

    fn from_attr(attr: &str, value: Option<AttrValue>) -> TreeResult<Self> {
        match value {
            None => Ok(None),
            Some(AttrValue::Str(s)) => Ok(Some(s)),
            Some(AttrValue::Int(n)) => Ok(Some(n.to_string())),
            Some(AttrValue::Bool(b)) => Ok(Some(if b { "1" } else { "0" }.to_string())),
            Some(other) => Err(type_mismatch(attr, AttrType::Str, &other)),
        }
    }
}

impl AttrField for bool {
    const TYPE: AttrType = AttrType::Bool;

    fn to_attr(&self) -> Option<AttrValue> {
        Some(AttrValue::Bool(*self))
    }

    fn from_attr(attr: &str, value: Option<AttrValue>) -> TreeResult<Self> {
        match value {
            None => Ok(false),
            Some(AttrValue::Bool(b)) => Ok(b),
            Some(AttrValue::Int(n)) => Ok(n != 0),
            Some(AttrValue::Str(ref s)) => match s.trim() {
                "" | "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                other => other
                    .parse::<i64>()
                    .map(|n| n != 0)
                    .map_err(|_| type_mismatch(attr, AttrType::Bool, &AttrValue::Str(s.clone()))),
            },
            Some(other) => Err(type_mismatch(attr, AttrType::Bool, &other)),
        }
    }
}

impl AttrField for Option<i64> {
    const TYPE: AttrType = AttrType::Int;

    fn to_attr(&self) -> Option<AttrValue> {
        self.map(AttrValue::Int)
    }

    fn from_attr(attr: &str, value: Option<AttrValue>) -> TreeResult<Self> {
        match value {
            None => Ok(None),
            Some(AttrValue::Int(n)) => Ok(Some(n)),
            Some(AttrValue::Bool(b)) => Ok(Some(b as i64)),
            Some(AttrValue::Str(ref s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| type_mismatch(attr, AttrType::Int, &AttrValue::Str(s.clone()))),
            Some(other) => Err(type_mismatch(attr, AttrType::Int, &other)),
        }
    }
}

impl AttrField for AttrMap {
    const TYPE: AttrType = AttrType::Map;

    fn to_attr(&self) -> Option<AttrValue> {
        Some(AttrValue::Map(self.clone()))
    }

    fn from_attr(attr: &str, value: Option<AttrValue>) -> TreeResult<Self> {
        match value {
            None => Ok(AttrMap::new()),
            Some(AttrValue::Map(map)) => Ok(map),
            Some(other) => Err(type_mismatch(attr, AttrType::Map, &other)),
        }
    }
}

impl AttrField for Vec<String> {
    const TYPE: AttrType = AttrType::List;

    fn to_attr(&self) -> Option<AttrValue> {
        Some(AttrValue::from(self.clone()))
    }

    fn from_attr(attr: &str, value: Option<AttrValue>) -> TreeResult<Self> {
        match value {
            None => Ok(Vec::new()),
            Some(AttrValue::Str(s)) => Ok(vec![s]),
            Some(AttrValue::List(items)) => items
                .into_iter()
                .map(|item| match item {
                    AttrValue::Str(s) => Ok(s),
                    AttrValue::Int(n) => Ok(n.to_string()),
                    other => Err(type_mismatch(attr, AttrType::Str, &other)),
                })
                .collect(),
            Some(other) => Err(type_mismatch(attr, AttrType::List, &other)),
        }
    }
}

/// One alignment link: the id of the counterpart node plus optional link type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(rename = "counterpart.rf")]
    pub counterpart: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Alignment {
    pub fn new(counterpart: impl Into<String>) -> Self {
        Self {
            counterpart: counterpart.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

impl AttrField for Vec<Alignment> {
    const TYPE: AttrType = AttrType::List;

    fn to_attr(&self) -> Option<AttrValue> {
        let items = self
            .iter()
            .map(|link| {
                let mut map = AttrMap::new();
                map.insert(
                    "counterpart.rf".to_string(),
                    AttrValue::Str(link.counterpart.clone()),
                );
                if let Some(kind) = &link.kind {
                    map.insert("type".to_string(), AttrValue::Str(kind.clone()));
                }
                AttrValue::Map(map)
            })
            .collect();
        Some(AttrValue::List(items))
    }

    fn from_attr(attr: &str, value: Option<AttrValue>) -> TreeResult<Self> {
        let items = match value {
            None => return Ok(Vec::new()),
            Some(AttrValue::List(items)) => items,
            Some(other) => return Err(type_mismatch(attr, AttrType::List, &other)),
        };
        items
            .into_iter()
            .map(|item| {
                let map = match item {
                    AttrValue::Map(map) => map,
                    other => return Err(type_mismatch(attr, AttrType::Map, &other)),
                };
                let Some(counterpart) = map
                    .get("counterpart.rf")
                    .and_then(AttrValue::as_str)
                    .map(str::to_string)
                else {
                    return Err(type_mismatch(attr, AttrType::Map, &AttrValue::Map(map)));
                };
                let kind = map.get("type").and_then(AttrValue::as_str).map(str::to_string);
                Ok(Alignment { counterpart, kind })
            })
            .collect()
    }
}

/// Splits `"gram/negation"` into `("gram", ["negation"])`.
pub(crate) fn split_path(name: &str) -> (&str, Vec<&str>) {
    match name.split_once('/') {
        Some((head, rest)) => (head, rest.split('/').collect()),
        None => (name, Vec::new()),
    }
}

/// Follows a nested path into a map value.
///
/// Returns `None` as soon as a step hits a value that is not a map.
pub(crate) fn lookup_path<'a>(value: &'a AttrValue, path: &[&str]) -> Option<&'a AttrValue> {
    let mut current = value;
    for step in path {
        current = current.as_map()?.get(*step)?;
    }
    Some(current)
}

/// Writes `value` at a nested path, creating intermediate maps as needed.
///
/// Intermediate values that are not maps are replaced. `None` removes the key.
pub(crate) fn insert_path(map: &mut AttrMap, path: &[&str], value: Option<AttrValue>) {
    let Some((last, prefix)) = path.split_last() else {
        return;
    };
    let mut current = map;
    for step in prefix {
        let entry = current
            .entry(step.to_string())
            .or_insert_with(|| AttrValue::Map(AttrMap::new()));
        if !matches!(entry, AttrValue::Map(_)) {
            *entry = AttrValue::Map(AttrMap::new());
        }
        current = match entry {
            AttrValue::Map(inner) => inner,
            _ => return,
        };
    }
    match value {
        Some(value) => {
            current.insert(last.to_string(), value);
        }
        None => {
            current.remove(*last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_coercion_accepts_numeric_strings() {
        assert!(bool::from_attr("is_member", Some("1".into())).unwrap());
        assert!(!bool::from_attr("is_member", Some("0".into())).unwrap());
        assert!(!bool::from_attr("is_member", None).unwrap());
        assert!(bool::from_attr("is_member", Some("maybe".into())).is_err());
    }

    #[test]
    fn missing_containers_become_empty() {
        assert!(Vec::<String>::from_attr("compl.rf", None).unwrap().is_empty());
        assert!(AttrMap::from_attr("gram", None).unwrap().is_empty());
        assert_eq!(Option::<i64>::from_attr("ord", None).unwrap(), None);
    }

    #[test]
    fn single_string_becomes_one_element_list() {
        let ids = Vec::<String>::from_attr("coref.rf", Some("t-1".into())).unwrap();
        assert_eq!(ids, vec!["t-1".to_string()]);
    }

    #[test]
    fn nested_path_lookup_stops_at_non_map() {
        let mut map = AttrMap::new();
        insert_path(&mut map, &["negation"], Some("neg1".into()));
        let value = AttrValue::Map(map);

        assert_eq!(
            lookup_path(&value, &["negation"]),
            Some(&AttrValue::Str("neg1".into()))
        );
        assert_eq!(lookup_path(&value, &["negation", "deeper"]), None);
        assert_eq!(lookup_path(&value, &["tense"]), None);
    }

    #[test]
    fn insert_path_replaces_scalar_on_the_way() {
        let mut map = AttrMap::new();
        map.insert("a".into(), "scalar".into());
        insert_path(&mut map, &["a", "lex.rf"], Some("a-node-1".into()));

        let nested = map.get("a").and_then(AttrValue::as_map).unwrap();
        assert_eq!(nested.get("lex.rf"), Some(&AttrValue::Str("a-node-1".into())));
    }

    #[test]
    fn alignment_round_trips_through_attr_value() {
        let links = vec![Alignment::new("en-1").with_kind("int")];
        let value = links.to_attr();
        let back = Vec::<Alignment>::from_attr("alignment", value).unwrap();
        assert_eq!(back, links);
    }
}
