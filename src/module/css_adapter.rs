//! Stylesheet inclusion on CSS hosts (the module root and themes), and
//! import of CSS styles as design styles.

use std::collections::BTreeSet;
use std::rc::Rc;

use super::Module;
use crate::activity::record::Record;
use crate::css::sheet::{CssStyleSheet, IncludedCss, IncludedCssStyleSheet};
use crate::design::{DesignElement, ElementId};
use crate::error::{DesignError, Result};
use crate::property::builtin::{props, slots, types};

impl Module {
    fn css_host(&self, host: ElementId) -> Result<&DesignElement> {
        let element = self.existing(host)?;
        if !self.dictionary().is_css_host(element.type_name()) {
            return Err(DesignError::NotACssHost(host));
        }
        Ok(element)
    }

    fn css_index(&self, host: ElementId, file_name: &str) -> Result<usize> {
        self.css_host(host)?
            .csses()
            .iter()
            .position(|c| c.file_name() == file_name)
            .ok_or_else(|| DesignError::CssNotFound(file_name.to_owned()))
    }

    /// Read and compile `file_name` through the configured resource locator.
    pub fn load_css(&self, file_name: &str) -> Result<CssStyleSheet> {
        let text = self.config.resources.read_to_string(file_name)?;
        Ok(CssStyleSheet::parse(file_name, &text, self.dictionary())?)
    }

    /// Include `file_name` on `host`, after every stylesheet already there.
    pub fn add_css(&mut self, host: ElementId, file_name: &str) -> Result<()> {
        self.ensure_mutable()?;
        self.css_host(host)?;
        let sheet = self.load_css(file_name)?;
        self.add_css_sheet(host, IncludedCssStyleSheet::new(file_name), sheet)
    }

    /// Include an already compiled sheet.
    pub fn add_css_sheet(
        &mut self,
        host: ElementId,
        reference: IncludedCssStyleSheet,
        sheet: CssStyleSheet,
    ) -> Result<()> {
        self.ensure_mutable()?;
        let included = self.css_host(host)?.csses();
        if included.iter().any(|c| c.file_name() == reference.file_name) {
            return Err(DesignError::CssAlreadyIncluded(reference.file_name));
        }
        let index = included.len();
        let file_name = reference.file_name.clone();

        self.transact("add css", |m| {
            m.execute(Record::CssInserted {
                host,
                index,
                css: IncludedCss::new(reference, sheet),
            })?;
            tracing::debug!(?host, file = %file_name, "css included");
            Ok(())
        })
    }

    /// A style of the sheet that some element still uses and that no other
    /// source defines.
    fn style_only_in(&self, host: ElementId, index: usize) -> Option<String> {
        let element = self.state.tree.get(host)?;
        let sheet = &element.csses().get(index)?.sheet;
        let defined_elsewhere = |name: &str| {
            self.find_style(name).is_some()
                || self
                    .state
                    .tree
                    .contents(host, slots::STYLES)
                    .iter()
                    .any(|&s| self.state.tree.get(s).and_then(|e| e.name()) == Some(name))
                || element
                    .csses()
                    .iter()
                    .enumerate()
                    .any(|(i, c)| i != index && c.sheet.contains_style(name))
        };

        self.state
            .tree
            .walk_depth_first(self.root())
            .into_iter()
            .filter_map(|id| self.state.tree.get(id)?.property(props::STYLE)?.as_str())
            .find(|&name| sheet.contains_style(name) && !defined_elsewhere(name))
            .map(str::to_owned)
    }

    /// Remove `file_name` from `host`.
    pub fn drop_css(&mut self, host: ElementId, file_name: &str) -> Result<()> {
        self.ensure_mutable()?;
        let index = self.css_index(host, file_name)?;
        if let Some(style) = self.style_only_in(host, index) {
            return Err(DesignError::CssInUse {
                file_name: file_name.to_owned(),
                style,
            });
        }
        let css = self.css_host(host)?.csses()[index].clone();

        self.transact("drop css", |m| {
            m.execute(Record::CssRemoved { host, index, css })?;
            tracing::debug!(?host, file = file_name, "css dropped");
            Ok(())
        })
    }

    /// Point an inclusion at another file, keeping its cascade position.
    pub fn rename_css(&mut self, host: ElementId, file_name: &str, new_file_name: &str) -> Result<()> {
        self.ensure_mutable()?;
        let index = self.css_index(host, file_name)?;
        if new_file_name != file_name && self.css_index(host, new_file_name).is_ok() {
            return Err(DesignError::CssAlreadyIncluded(new_file_name.to_owned()));
        }
        let old = self.css_host(host)?.csses()[index].clone();
        let mut reference = old.reference.clone();
        reference.file_name = new_file_name.to_owned();
        let new = IncludedCss::new(reference, self.load_css(new_file_name)?);

        self.transact("rename css", |m| {
            m.execute(Record::CssReplaced {
                host,
                index,
                old,
                new,
            })
        })
    }

    /// Re-read an included file from the resource locator.
    pub fn reload_css(&mut self, host: ElementId, file_name: &str) -> Result<()> {
        self.ensure_mutable()?;
        let index = self.css_index(host, file_name)?;
        let old = self.css_host(host)?.csses()[index].clone();
        let new = IncludedCss {
            reference: old.reference.clone(),
            sheet: Rc::new(self.load_css(file_name)?),
        };

        self.transact("reload css", |m| {
            m.execute(Record::CssReplaced {
                host,
                index,
                old,
                new,
            })?;
            tracing::debug!(?host, file = file_name, "css reloaded");
            Ok(())
        })
    }

    pub fn can_add_css(&self, host: ElementId, file_name: &str) -> bool {
        self.css_host(host).is_ok() && self.css_index(host, file_name).is_err()
    }

    pub fn can_drop_css(&self, host: ElementId, file_name: &str) -> bool {
        self.css_index(host, file_name)
            .is_ok_and(|index| self.style_only_in(host, index).is_none())
    }

    pub fn can_rename_css(&self, host: ElementId, file_name: &str, new_file_name: &str) -> bool {
        self.css_index(host, file_name).is_ok()
            && (new_file_name == file_name || self.css_index(host, new_file_name).is_err())
    }

    /// Stylesheets included by `host`, in cascade order.
    pub fn included_csses(&self, host: ElementId) -> &[IncludedCss] {
        self.state
            .tree
            .get(host)
            .map(DesignElement::csses)
            .unwrap_or_default()
    }

    pub fn find_included_css(&self, host: ElementId, file_name: &str) -> Option<&IncludedCss> {
        self.included_csses(host)
            .iter()
            .find(|c| c.file_name() == file_name)
    }

    /// Every sheet taking part in this module's cascade: the root's, then the
    /// active theme's.
    pub fn all_css_style_sheets(&self) -> Vec<Rc<CssStyleSheet>> {
        let mut sheets: Vec<Rc<CssStyleSheet>> = self
            .included_csses(self.root())
            .iter()
            .map(|c| Rc::clone(&c.sheet))
            .collect();
        if let Some(theme) = self.resolve_theme() {
            sheets.extend(
                theme
                    .module
                    .included_csses(theme.id)
                    .iter()
                    .map(|c| Rc::clone(&c.sheet)),
            );
        }
        sheets
    }

    /// Inclusions that link to an external URI, across the design, its
    /// theme and the themes of included libraries. Each URI appears once.
    pub fn external_included_csses(&self) -> Vec<IncludedCssStyleSheet> {
        let mut hosts = vec![(self, self.root())];
        if let Some(theme) = self.resolve_theme() {
            hosts.push((theme.module, theme.id));
        }
        for library in self.libraries() {
            let lib = library.module.as_ref();
            hosts.push((lib, lib.root()));
            for &theme in lib.tree().contents(lib.root(), slots::THEMES) {
                hosts.push((lib, theme));
            }
        }

        let mut seen = BTreeSet::new();
        hosts
            .into_iter()
            .flat_map(|(module, host)| module.included_csses(host))
            .filter(|c| {
                c.reference
                    .external_uri
                    .as_ref()
                    .is_some_and(|uri| seen.insert(uri.clone()))
            })
            .map(|c| c.reference.clone())
            .collect()
    }

    /// Copy the named styles of `sheet` into the `styles` slot as `Style`
    /// elements, in one undoable step. Unknown names are skipped; colliding
    /// names are made unique.
    pub fn import_css_styles(
        &mut self,
        sheet: &CssStyleSheet,
        names: &[&str],
    ) -> Result<Vec<ElementId>> {
        self.ensure_mutable()?;
        let root = self.root();

        self.transact("import css styles", |m| {
            let mut imported = Vec::new();
            for &name in names {
                let Some(style) = sheet.style(name) else {
                    tracing::warn!(file = sheet.file_name(), style = name, "style not in sheet, skipped");
                    continue;
                };
                let id = m.create_element(types::STYLE, Some(name))?;
                for (property, value) in &style.properties {
                    m.execute(Record::PropertySet {
                        element: id,
                        name: property.clone(),
                        old: None,
                        new: Some(value.clone()),
                    })?;
                }
                m.add_element(id, root, slots::STYLES, None)?;
                imported.push(id);
            }
            tracing::debug!(count = imported.len(), "css styles imported");
            Ok(imported)
        })
    }
}
