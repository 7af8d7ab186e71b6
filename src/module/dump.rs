//! Deterministic text rendering of a module, for tests and debugging.
//!
//! ```text
//! ReportDesign [title="Sales"]
//!   library lib
//!   css a.css
//!   body:
//!     Label "greeting" [text="Hello"]
//! ```

use std::fmt;

use super::Module;
use crate::design::ElementId;

struct ModuleDump<'a> {
    module: &'a Module,
}

impl ModuleDump<'_> {
    fn element(&self, f: &mut fmt::Formatter<'_>, id: ElementId, depth: usize) -> fmt::Result {
        let Some(element) = self.module.tree().get(id) else {
            return Ok(());
        };
        let indent = "  ".repeat(depth);

        write!(f, "{indent}{}", element.type_name())?;
        if let Some(name) = element.name() {
            write!(f, " {name:?}")?;
        }
        if let Some(base) = element.extends() {
            write!(f, " extends {base}")?;
        }
        let values: Vec<String> = element
            .properties()
            .values()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        if !values.is_empty() {
            write!(f, " [{}]", values.join(", "))?;
        }
        let masks: Vec<String> = element
            .properties()
            .masks()
            .map(|(name, mask)| format!("{name}={mask:?}"))
            .collect();
        if !masks.is_empty() {
            write!(f, " masks[{}]", masks.join(", "))?;
        }
        writeln!(f)?;

        if id == self.module.root() {
            for library in self.module.libraries() {
                writeln!(f, "{indent}  library {}", library.namespace)?;
            }
        }
        for css in element.csses() {
            writeln!(f, "{indent}  css {}", css.file_name())?;
        }
        for slot in element.slots().iter().filter(|s| !s.contents.is_empty()) {
            writeln!(f, "{indent}  {}:", slot.name)?;
            for &child in &slot.contents {
                self.element(f, child, depth + 2)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ModuleDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.element(f, self.module.root(), 0)
    }
}

impl Module {
    /// The attached tree as indented text. Detached elements are not shown.
    pub fn dump(&self) -> String {
        ModuleDump { module: self }.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleConfig;
    use crate::property::builtin::{props, slots, types};

    #[test]
    fn dump_shows_slots_and_values() {
        let mut m = Module::new_design(ModuleConfig::new()).unwrap();
        let root = m.root();
        m.set_property(root, "title", "Sales").unwrap();
        let label = m.create_element(types::LABEL, Some("greeting")).unwrap();
        m.add_element(label, root, slots::BODY, None).unwrap();
        m.set_property(label, props::TEXT, "Hello").unwrap();

        insta::assert_snapshot!(m.dump(), @r###"
        ReportDesign [title="Sales"]
          body:
            Label "greeting" [text="Hello"]
        "###);
    }

    #[test]
    fn dump_skips_detached_elements() {
        let mut m = Module::new_design(ModuleConfig::new()).unwrap();
        m.create_element(types::LABEL, Some("loose")).unwrap();
        assert_eq!(m.dump(), "ReportDesign\n");
    }
}
