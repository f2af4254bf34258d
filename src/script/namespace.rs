use std::collections::BTreeMap;
use std::rc::Rc;

use rhai::Dynamic;

use crate::error::{Result, RuntimeError};

/// Collects capabilities before they are frozen into a namespace.
///
/// Inserting a name twice keeps the later value.
#[derive(Debug, Clone, Default)]
pub struct NamespaceBuilder {
    entries: BTreeMap<String, Dynamic>,
}

impl NamespaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Clone + 'static>(self, name: &str, value: T) -> Self {
        self.with_dynamic(name, Dynamic::from(value))
    }

    pub fn with_dynamic(mut self, name: &str, value: Dynamic) -> Self {
        self.entries.insert(name.to_string(), value);
        self
    }

    /// Freeze the entries. Every name must be usable as a script identifier.
    pub fn build(self) -> Result<CapabilityNamespace> {
        if let Some(bad) = self.entries.keys().find(|name| !is_identifier(name)) {
            return Err(RuntimeError::config(format!(
                "capability name '{bad}' is not a valid identifier"
            )));
        }
        Ok(CapabilityNamespace {
            entries: Rc::new(self.entries),
        })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The fixed set of values a project script can name.
///
/// Immutable once built; clones share the same entries.
#[derive(Debug, Clone)]
pub struct CapabilityNamespace {
    entries: Rc<BTreeMap<String, Dynamic>>,
}

impl CapabilityNamespace {
    pub fn get(&self, name: &str) -> Option<&Dynamic> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dynamic)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_entries_replace_earlier_ones() {
        let ns = NamespaceBuilder::new()
            .with("a", 1_i64)
            .with("a", 2_i64)
            .with("b", "two".to_string())
            .build()
            .unwrap();

        assert_eq!(ns.len(), 2);
        assert_eq!(ns.get("a").unwrap().as_int(), Ok(2));
        assert_eq!(ns.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn names_must_be_identifiers() {
        for bad in ["", "1up", "has space", "dash-ed"] {
            let result = NamespaceBuilder::new().with(bad, 0_i64).build();
            assert!(matches!(result, Err(RuntimeError::Configuration(_))), "{bad:?}");
        }
        assert!(NamespaceBuilder::new().with("_ok9", 0_i64).build().is_ok());
    }
}
