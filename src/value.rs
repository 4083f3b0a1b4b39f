use std::{collections::BTreeMap, fmt};

/// A value produced by front matter or by solving an expression.
///
/// Integers and floats stay distinct so that `2` and `2.0` render differently
/// in table cells, while still comparing equal.
///
/// # Examples
///
/// ```
/// use dataview::Value;
/// use std::collections::BTreeMap;
///
/// let mut metadata = BTreeMap::new();
/// metadata.insert("status".to_string(), Value::from("draft"));
/// metadata.insert("tags".to_string(), Value::Array(vec![Value::from("howto")]));
///
/// let record = Value::Object(metadata);
/// assert!(record.is_truthy());
/// assert_eq!(Value::Float(2.0).to_cell(), "2.0");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,

    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Ordered sequence
    Array(Vec<Value>),

    /// Map with string keys, iterated in key order
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Truthiness used by `AND`, `OR`, `choice` and `WHERE`.
    ///
    /// Falsy values: `null`, `false`, `0`, `0.0`, `""`, `[]` and `{}`.
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n != 0.0,
            Integer(n) => *n != 0,
            String(s) => !s.is_empty(),
            Array(arr) => !arr.is_empty(),
            Object(obj) => !obj.is_empty(),
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Human-readable kind, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Text written into a table cell or list item.
    ///
    /// Same as the `Display` output: `null` is empty, strings are raw, floats
    /// keep a fractional part and containers render as `[a, b]` / `{k: v}`.
    pub fn to_cell(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(obj) => {
                f.write_str("{")?;
                for (i, (key, value)) in obj.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(obj: BTreeMap<String, Value>) -> Self {
        Value::Object(obj)
    }
}

#[test]
fn test_truthiness() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Integer(0).is_truthy());
    assert!(!Value::Float(0.0).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(!Value::Array(vec![]).is_truthy());
    assert!(!Value::Object(BTreeMap::new()).is_truthy());
    assert!(Value::Integer(-1).is_truthy());
    assert!(Value::from("x").is_truthy());
}

#[test]
fn test_cells() {
    assert_eq!(Value::Null.to_cell(), "");
    assert_eq!(Value::Float(2.0).to_cell(), "2.0");
    assert_eq!(Value::Float(0.5).to_cell(), "0.5");
    assert_eq!(Value::Boolean(true).to_cell(), "true");
    assert_eq!(
        Value::Array(vec![Value::from("a"), Value::Integer(1)]).to_cell(),
        "[a, 1]"
    );

    let mut obj = BTreeMap::new();
    obj.insert("k".to_string(), Value::Integer(1));
    assert_eq!(Value::Object(obj).to_cell(), "{k: 1}");
}
