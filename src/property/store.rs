//! Per-element storage of local values and property masks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Mask state of a single property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaskState {
    /// Freely editable.
    Change,
    /// Rejects mutation, here and on every element extending this one.
    Lock,
    /// Hidden from property editors; still editable through the model.
    Hide,
}

/// Local property values and masks of one element. Ordered for stable dumps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStore {
    values: BTreeMap<String, Value>,
    masks: BTreeMap<String, MaskState>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Store `value` (or clear with `None`), returning the previous value.
    pub fn set(&mut self, name: &str, value: Option<Value>) -> Option<Value> {
        match value {
            Some(value) => self.values.insert(name.to_owned(), value),
            None => self.values.remove(name),
        }
    }

    pub fn mask(&self, name: &str) -> Option<MaskState> {
        self.masks.get(name).copied()
    }

    /// Store a mask (or clear with `None`), returning the previous mask.
    pub fn set_mask(&mut self, name: &str, mask: Option<MaskState>) -> Option<MaskState> {
        match mask {
            Some(mask) => self.masks.insert(name.to_owned(), mask),
            None => self.masks.remove(name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.masks.is_empty()
    }

    /// Local values in name order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Masks in name order.
    pub fn masks(&self) -> impl Iterator<Item = (&str, MaskState)> {
        self.masks.iter().map(|(k, m)| (k.as_str(), *m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_returns_previous() {
        let mut store = PropertyStore::new();
        assert_eq!(store.set("text", Some("a".into())), None);
        assert_eq!(store.set("text", Some("b".into())), Some(Value::from("a")));
        assert_eq!(store.get("text"), Some(&Value::from("b")));
        assert_eq!(store.set("text", None), Some(Value::from("b")));
        assert!(store.is_empty());
    }

    #[test]
    fn masks_are_separate_from_values() {
        let mut store = PropertyStore::new();
        store.set_mask("color", Some(MaskState::Lock));
        assert_eq!(store.mask("color"), Some(MaskState::Lock));
        assert_eq!(store.get("color"), None);
        assert!(!store.is_empty());
        assert_eq!(store.set_mask("color", None), Some(MaskState::Lock));
    }

    #[test]
    fn values_iterate_in_name_order() {
        let mut store = PropertyStore::new();
        store.set("width", Some("1in".into()));
        store.set("color", Some("red".into()));
        let names: Vec<_> = store.values().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["color", "width"]);
    }
}
