//! Import table built from `<<` directives
//!
//! Maps a simple type name to the fully qualified name it was imported as.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    simple_names: HashMap<String, String>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an import. `a.b.C` is reachable as `C`; a name without dots names itself.
    pub fn add(&mut self, fully_qualified_name: &str) {
        let simple_name = simple_name_of(fully_qualified_name);
        log::trace!("import {} as {}", fully_qualified_name, simple_name);
        self.simple_names
            .insert(simple_name.to_string(), fully_qualified_name.to_string());
    }

    /// Fully qualified name imported under `simple_name`
    pub fn resolve(&self, simple_name: &str) -> Option<&str> {
        self.simple_names.get(simple_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.simple_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simple_names.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for ImportTable {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut table = ImportTable::new();
        for name in iter {
            table.add(name);
        }
        table
    }
}

/// Last dotted segment of a qualified name
pub fn simple_name_of(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(pos) => &qualified_name[pos + 1..],
        None => qualified_name,
    }
}
