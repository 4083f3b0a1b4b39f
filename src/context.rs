use std::collections::BTreeMap;

use crate::value::Value;

/// Result of resolving a dotted path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// Every segment exists; the value may still be `null`
    Found(&'a Value),
    /// Some segment is missing, or an intermediate value is not an object
    Absent,
}

/// Read-only mapping from root names (`this`, `file`, `metadata`) to values.
///
/// Built fresh for each document an expression is evaluated against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    roots: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root, builder style.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.roots.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.roots.get(name)
    }

    /// Walks `path` segment by segment from the roots.
    pub fn lookup(&self, path: &[String]) -> Lookup<'_> {
        let Some((first, rest)) = path.split_first() else {
            return Lookup::Absent;
        };
        let Some(mut current) = self.roots.get(first) else {
            return Lookup::Absent;
        };

        for segment in rest {
            match current {
                Value::Object(obj) => match obj.get(segment) {
                    Some(next) => current = next,
                    None => return Lookup::Absent,
                },
                _ => return Lookup::Absent,
            }
        }
        Lookup::Found(current)
    }
}

impl From<BTreeMap<String, Value>> for Context {
    fn from(roots: BTreeMap<String, Value>) -> Self {
        Context { roots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(dotted: &str) -> Vec<String> {
        dotted.split('.').map(str::to_string).collect()
    }

    #[test]
    fn lookup_distinguishes_null_from_absent() {
        let mut metadata = BTreeMap::new();
        metadata.insert("empty".to_string(), Value::Null);
        metadata.insert("name".to_string(), Value::from("x"));
        let context = Context::new().with("metadata", Value::Object(metadata));

        assert_eq!(context.lookup(&path("metadata.empty")), Lookup::Found(&Value::Null));
        assert_eq!(context.lookup(&path("metadata.name")), Lookup::Found(&Value::from("x")));
        assert_eq!(context.lookup(&path("metadata.missing")), Lookup::Absent);
        assert_eq!(context.lookup(&path("metadata.name.deeper")), Lookup::Absent);
        assert_eq!(context.lookup(&path("nothing")), Lookup::Absent);
    }
}
