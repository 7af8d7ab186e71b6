//! Module configuration.

use std::fmt;
use std::rc::Rc;

use crate::property::MetaDataDictionary;
use crate::resource::{MemoryResources, ResourceLocator};

/// Configuration shared by a module and the libraries opened with it.
///
/// ```
/// use folio::config::ModuleConfig;
///
/// let config = ModuleConfig::new()
///     .with_max_undo_levels(20)
///     .with_max_extends_depth(8);
/// assert_eq!(config.max_undo_levels, 20);
/// ```
#[derive(Clone)]
pub struct ModuleConfig {
    /// Committed units kept in the undo history (0 = unlimited).
    pub max_undo_levels: usize,
    /// Longest extends chain followed before giving up.
    pub max_extends_depth: usize,
    /// Where included stylesheets are read from.
    pub resources: Rc<dyn ResourceLocator>,
    /// Element and property definitions.
    pub dictionary: Rc<MetaDataDictionary>,
}

impl ModuleConfig {
    pub fn new() -> Self {
        Self {
            max_undo_levels: 100,
            max_extends_depth: 32,
            resources: Rc::new(MemoryResources::new()),
            dictionary: Rc::new(MetaDataDictionary::builtin()),
        }
    }

    pub fn with_max_undo_levels(mut self, levels: usize) -> Self {
        self.max_undo_levels = levels;
        self
    }

    pub fn with_max_extends_depth(mut self, depth: usize) -> Self {
        self.max_extends_depth = depth;
        self
    }

    pub fn with_resources(mut self, resources: Rc<dyn ResourceLocator>) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_dictionary(mut self, dictionary: Rc<MetaDataDictionary>) -> Self {
        self.dictionary = dictionary;
        self
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleConfig")
            .field("max_undo_levels", &self.max_undo_levels)
            .field("max_extends_depth", &self.max_extends_depth)
            .field("resources", &self.resources)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ModuleConfig::default();
        assert_eq!(config.max_undo_levels, 100);
        assert_eq!(config.max_extends_depth, 32);
        assert!(config.dictionary.element("ReportDesign").is_some());
    }

    #[test]
    fn builder_overrides() {
        let resources = Rc::new(MemoryResources::new().with_file("a.css", ""));
        let config = ModuleConfig::new()
            .with_max_undo_levels(3)
            .with_resources(resources);
        assert_eq!(config.max_undo_levels, 3);
        assert!(config.resources.read_to_string("a.css").is_ok());
    }
}
