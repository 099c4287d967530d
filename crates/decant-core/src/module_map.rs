//! Matcher module maps.

use std::collections::BTreeMap;

use derive_more::From;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The value a matcher token resolves to: module name mapped to that
/// module's raw configuration.
///
/// An empty map is a valid matcher (match everything).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, From)]
pub struct ModuleMap(pub BTreeMap<String, Value>);

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: impl Into<String>, config: Value) -> Option<Value> {
        self.0.insert(module.into(), config)
    }

    pub fn get(&self, module: &str) -> Option<&Value> {
        self.0.get(module)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, Value)> for ModuleMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_get() {
        let mut map = ModuleMap::new();
        assert!(map.is_empty());
        map.insert("path", json!(["/api/*"]));
        assert_eq!(map.get("path"), Some(&json!(["/api/*"])));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_serde_round_trip() {
        let map: ModuleMap = [("host".to_string(), json!(["example.com"]))]
            .into_iter()
            .collect();
        let text = serde_json::to_string(&map).unwrap();
        assert_eq!(serde_json::from_str::<ModuleMap>(&text).unwrap(), map);
    }
}
