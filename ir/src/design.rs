use std::collections::BTreeMap;

use crate::{CellId, Module};

/// A collection of named modules: the unit a pass runs over.
///
/// The pass-manager CLI's `selected_modules()`/`selected_cells()` predicates
/// are implemented here; a pass never filters modules itself.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Design {
    modules: BTreeMap<String, Module>,
}

/// A parsed selection string: empty/`"*"` selects everything, otherwise an
/// exact module or cell name, or a `t:<type>` cell-type match.
///
/// This is intentionally a small subset of Yosys's selection language (the
/// full grammar — wildcards, set algebra, `%...` traversal operators — isn't
/// implemented; only what the CLI entry points for the four passes need).
#[derive(Debug, Clone)]
pub enum Selection {
    All,
    Name(String),
    TypePrefix(String),
}

impl Selection {
    pub fn parse(s: &str) -> Self {
        if s.is_empty() || s == "*" {
            Selection::All
        } else if let Some(t) = s.strip_prefix("t:") {
            Selection::TypePrefix(t.to_string())
        } else {
            Selection::Name(s.to_string())
        }
    }

    fn matches_name(&self, name: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Name(n) => n == name,
            Selection::TypePrefix(_) => false,
        }
    }
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: Module) {
        self.modules.insert(module.name().to_string(), module);
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.get_mut(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn modules_mut(&mut self) -> impl Iterator<Item = &mut Module> {
        self.modules.values_mut()
    }

    /// Names of the modules matched by `selection`, in deterministic
    /// (lexicographic) order.
    pub fn selected_modules(&self, selection: &Selection) -> Vec<&str> {
        self.modules
            .keys()
            .filter(|name| selection.matches_name(name))
            .map(String::as_str)
            .collect()
    }

    /// Cell ids in `module` matched by `selection`, in insertion order.
    pub fn selected_cells(&self, module: &Module, selection: &Selection) -> Vec<CellId> {
        module
            .cells()
            .filter(|c| match selection {
                Selection::All => true,
                Selection::Name(n) => c.name() == n,
                Selection::TypePrefix(t) => format!("{:?}", c.kind()).starts_with(t.as_str()),
            })
            .map(|c| c.id())
            .collect()
    }
}
