//! Caller-held snapshot of every effective value.
//!
//! [`Module::cache_values`] computes effective styles and ACLs once and
//! hands back a guard that mutably borrows the module. No edit can happen
//! while the guard lives, so the snapshot cannot go stale.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::Module;
use crate::design::ElementId;
use crate::error::{DesignError, Result};
use crate::property::Value;

/// Effective values of one attached element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub element_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub style: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
}

/// Effective values of the whole tree, in depth-first order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueSnapshot {
    pub elements: Vec<ElementSnapshot>,
}

/// Exclusive access to a module together with its value snapshot.
#[derive(Debug)]
pub struct ValueCache<'m> {
    module: &'m mut Module,
    snapshot: ValueSnapshot,
    index: HashMap<ElementId, usize>,
}

impl ValueCache<'_> {
    pub fn module(&self) -> &Module {
        self.module
    }

    pub fn snapshot(&self) -> &ValueSnapshot {
        &self.snapshot
    }

    pub fn get(&self, element: ElementId) -> Option<&ElementSnapshot> {
        self.index
            .get(&element)
            .and_then(|&i| self.snapshot.elements.get(i))
    }

    pub fn style(&self, element: ElementId) -> Option<&BTreeMap<String, Value>> {
        self.get(element).map(|s| &s.style)
    }

    pub fn acl(&self, element: ElementId) -> Option<&str> {
        self.get(element)?.acl.as_deref()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot)
    }
}

impl Module {
    /// Snapshot effective values of every attached element.
    ///
    /// Fails while a transaction is open, since its changes may still be
    /// rolled back.
    pub fn cache_values(&mut self) -> Result<ValueCache<'_>> {
        self.ensure_mutable()?;
        if self.transaction_depth() > 0 {
            return Err(DesignError::TransactionOpen("cache values"));
        }

        let mut snapshot = ValueSnapshot::default();
        let mut index = HashMap::new();
        for id in self.tree().walk_depth_first(self.root()) {
            let Some(element) = self.element(id) else {
                continue;
            };
            let style = self
                .effective_style(id)?
                .iter()
                .map(|(name, resolved)| (name.to_owned(), resolved.value.clone()))
                .collect();
            index.insert(id, snapshot.elements.len());
            snapshot.elements.push(ElementSnapshot {
                element_type: element.type_name().to_owned(),
                name: element.name().map(str::to_owned),
                style,
                acl: self.effective_acl(id).map(|acl| acl.expression),
            });
        }
        tracing::debug!(elements = snapshot.elements.len(), "values cached");

        Ok(ValueCache {
            module: self,
            snapshot,
            index,
        })
    }
}
