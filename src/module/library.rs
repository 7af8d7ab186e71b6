//! Library linkage: included libraries, extends references and virtual
//! property lookup.
//!
//! Extends and theme references are names, never stored links. They are
//! resolved through the name index of the owning module on every query, so
//! dropping or reloading a library takes effect immediately.

use std::rc::Rc;

use super::{IncludedLibrary, Module};
use crate::activity::record::Record;
use crate::design::{DesignElement, ElementId, ExtendsRef};
use crate::error::{DesignError, Result};
use crate::property::builtin::{name_spaces, props, types};
use crate::property::{MaskState, Value};

/// An element together with the module that owns it.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    pub module: &'a Module,
    pub id: ElementId,
}

impl<'a> ElementRef<'a> {
    pub fn element(&self) -> Option<&'a DesignElement> {
        self.module.tree().get(self.id)
    }

    /// The base element this one extends, resolved in its own module.
    pub fn base(&self) -> Option<ElementRef<'a>> {
        self.module.resolve_base(self.id)
    }

    fn is(&self, module: &Module, id: ElementId) -> bool {
        std::ptr::eq(self.module, module) && self.id == id
    }
}

impl Module {
    // ── Included libraries ──────────────────────────────────────────

    pub fn libraries(&self) -> &[IncludedLibrary] {
        &self.state.libraries
    }

    pub fn library(&self, namespace: &str) -> Option<&Rc<Module>> {
        self.state
            .libraries
            .iter()
            .find(|l| l.namespace == namespace)
            .map(|l| &l.module)
    }

    fn library_index(&self, namespace: &str) -> Result<usize> {
        self.state
            .libraries
            .iter()
            .position(|l| l.namespace == namespace)
            .ok_or_else(|| DesignError::LibraryNotFound(namespace.to_owned()))
    }

    fn check_library(namespace: &str, library: &Module) -> Result<()> {
        let root_type = library
            .element(library.root())
            .map(DesignElement::type_name)
            .unwrap_or_default();
        if library.dictionary().is_kind_of(root_type, types::LIBRARY) {
            Ok(())
        } else {
            Err(DesignError::NotALibrary(namespace.to_owned()))
        }
    }

    /// Include `library` under `namespace`.
    pub fn include_library(&mut self, namespace: &str, library: Rc<Module>) -> Result<()> {
        self.ensure_mutable()?;
        Self::check_library(namespace, &library)?;
        if self.library(namespace).is_some() {
            return Err(DesignError::LibraryAlreadyIncluded(namespace.to_owned()));
        }
        let index = self.state.libraries.len();

        self.transact("include library", |m| {
            m.execute(Record::LibraryInserted {
                index,
                library: IncludedLibrary {
                    namespace: namespace.to_owned(),
                    module: library,
                },
            })?;
            tracing::debug!(namespace, "library included");
            Ok(())
        })
    }

    /// Remove the library. Elements extending its elements keep their
    /// references but no longer resolve.
    pub fn drop_library(&mut self, namespace: &str) -> Result<()> {
        self.ensure_mutable()?;
        let index = self.library_index(namespace)?;
        let library = self.state.libraries[index].clone();

        self.transact("drop library", |m| {
            m.execute(Record::LibraryRemoved { index, library })?;
            tracing::debug!(namespace, "library dropped");
            Ok(())
        })
    }

    /// Swap in a new version of an included library.
    pub fn reload_library(&mut self, namespace: &str, library: Rc<Module>) -> Result<()> {
        self.ensure_mutable()?;
        Self::check_library(namespace, &library)?;
        let index = self.library_index(namespace)?;
        let old = self.state.libraries[index].clone();

        self.transact("reload library", |m| {
            m.execute(Record::LibraryReplaced {
                index,
                old,
                new: IncludedLibrary {
                    namespace: namespace.to_owned(),
                    module: library,
                },
            })?;
            tracing::debug!(namespace, "library reloaded");
            Ok(())
        })
    }

    // ── Extends ─────────────────────────────────────────────────────

    /// Look up `reference` for an element of type `type_name`.
    fn lookup(&self, type_name: &str, reference: &ExtendsRef) -> Option<ElementRef<'_>> {
        let module = match &reference.namespace {
            None => self,
            Some(ns) => self.library(ns)?.as_ref(),
        };
        let name_space = self.dictionary().name_space(type_name)?;
        let id = module.tree().find(name_space, &reference.name)?;
        Some(ElementRef { module, id })
    }

    /// The element `element` extends, if its reference currently resolves
    /// to an element of the same type.
    pub fn resolve_base(&self, element: ElementId) -> Option<ElementRef<'_>> {
        let derived = self.state.tree.get(element)?;
        let reference = derived.extends()?;
        let base = self.lookup(derived.type_name(), reference)?;
        (base.element()?.type_name() == derived.type_name()).then_some(base)
    }

    /// `element` followed by its resolved base chain, bounded by the
    /// configured depth.
    pub fn extends_chain(&self, element: ElementId) -> Vec<ElementRef<'_>> {
        let mut chain = vec![ElementRef {
            module: self,
            id: element,
        }];
        while chain.len() <= self.config.max_extends_depth {
            let Some(base) = chain.last().and_then(ElementRef::base) else {
                break;
            };
            if chain.iter().any(|r| r.is(base.module, base.id)) {
                break;
            }
            chain.push(base);
        }
        chain
    }

    /// Local value, else the nearest value along the extends chain, else
    /// the definition default.
    pub fn virtual_property(&self, element: ElementId, name: &str) -> Option<&Value> {
        let chain = self.extends_chain(element);
        chain
            .iter()
            .find_map(|r| r.element()?.property(name))
            .or_else(|| self.default_value(element, name))
    }

    pub(crate) fn default_value(&self, element: ElementId, name: &str) -> Option<&Value> {
        let type_name = self.state.tree.get(element)?.type_name();
        self.dictionary().property(type_name, name)?.default.as_ref()
    }

    /// Whether a `Lock` mask on the element or its extends chain covers `name`.
    pub(crate) fn is_lock_masked(&self, element: ElementId, name: &str) -> bool {
        self.extends_chain(element).iter().any(|r| {
            r.element()
                .is_some_and(|e| e.properties().mask(name) == Some(MaskState::Lock))
        })
    }

    /// Make `element` extend the element named by `reference`.
    pub fn set_extends(&mut self, element: ElementId, reference: ExtendsRef) -> Result<()> {
        self.ensure_mutable()?;
        let derived = self.existing(element)?;
        let base = self
            .lookup(derived.type_name(), &reference)
            .ok_or_else(|| DesignError::UnresolvedExtends {
                name: reference.to_string(),
            })?;
        let base_type = base.element().map_or("", |e| e.type_name());
        if base_type != derived.type_name() {
            return Err(DesignError::ExtendsTypeMismatch {
                element_type: derived.type_name().to_owned(),
                base_type: base_type.to_owned(),
            });
        }

        let cyclic = {
            let mut current = Some(base);
            let mut steps = 0;
            loop {
                match current {
                    None => break false,
                    Some(r) if r.is(self, element) => break true,
                    Some(_) if steps >= self.config.max_extends_depth => break true,
                    Some(r) => {
                        current = r.base();
                        steps += 1;
                    }
                }
            }
        };
        if cyclic {
            return Err(DesignError::CyclicExtends {
                name: reference.to_string(),
            });
        }

        let old = derived.extends().cloned();
        self.transact("set extends", |m| {
            m.execute(Record::ExtendsSet {
                element,
                old,
                new: Some(reference),
            })?;
            tracing::debug!(?element, "extends set");
            Ok(())
        })
    }

    /// Fail with `CyclicExtends` if any attached element's extends chain
    /// revisits an element. References resolve by name, so a rename or an
    /// attach can close a loop that `set_extends` never saw.
    pub(crate) fn check_extends_acyclic(&self) -> Result<()> {
        let tree = &self.state.tree;
        for id in tree.walk_depth_first(self.root()) {
            let Some(reference) = tree.get(id).and_then(DesignElement::extends) else {
                continue;
            };
            let mut seen = vec![ElementRef { module: self, id }];
            let mut current = self.resolve_base(id);
            while let Some(base) = current {
                if seen.len() > self.config.max_extends_depth
                    || seen.iter().any(|r| r.is(base.module, base.id))
                {
                    return Err(DesignError::CyclicExtends {
                        name: reference.to_string(),
                    });
                }
                current = base.base();
                seen.push(base);
            }
        }
        Ok(())
    }

    pub fn clear_extends(&mut self, element: ElementId) -> Result<()> {
        self.ensure_mutable()?;
        let Some(old) = self.existing(element)?.extends().cloned() else {
            return Ok(());
        };
        self.transact("clear extends", |m| {
            m.execute(Record::ExtendsSet {
                element,
                old: Some(old),
                new: None,
            })
        })
    }

    // ── Theme ───────────────────────────────────────────────────────

    /// The theme named by the root's `theme` property: `Theme` in this
    /// module or `ns.Theme` in an included library.
    pub fn resolve_theme(&self) -> Option<ElementRef<'_>> {
        let text = self.property(self.root(), props::THEME)?.as_str()?;
        let reference = ExtendsRef::parse(text);
        let module = match &reference.namespace {
            None => self,
            Some(ns) => self.library(ns)?.as_ref(),
        };
        let id = module.tree().find(name_spaces::THEME, &reference.name)?;
        Some(ElementRef { module, id })
    }
}
