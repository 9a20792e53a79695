//! Type universe used to decide whether a qualified name names a real type
//!
//! Resolution never loads classes. It asks a [`TypeUniverse`] whether a dotted
//! qualified name exists; the default universe is a catalog of platform types
//! embedded in the crate.

use once_cell::sync::Lazy;
use std::collections::BTreeSet;

/// Oracle answering "does this qualified type exist?"
pub trait TypeUniverse {
    /// `qualified_name` is dotted, e.g. `java.util.List`
    fn contains(&self, qualified_name: &str) -> bool;
}

/// A fixed set of known qualified type names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCatalog {
    names: BTreeSet<String>,
}

static PLATFORM_CATALOG: Lazy<TypeCatalog> = Lazy::new(|| {
    let catalog = TypeCatalog::from_listing(include_str!("platform_types.txt"));
    log::debug!("platform type catalog loaded: {} types", catalog.len());
    catalog
});

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The embedded platform catalog
    pub fn platform() -> &'static TypeCatalog {
        &PLATFORM_CATALOG
    }

    /// Platform catalog extended with caller-supplied names
    pub fn platform_with<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::platform().clone();
        catalog.extend(extra);
        catalog
    }

    /// Parse a listing with one qualified name per line; `#` starts a comment line
    pub fn from_listing(listing: &str) -> Self {
        listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    pub fn insert(&mut self, qualified_name: impl Into<String>) {
        self.names.insert(qualified_name.into());
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.insert(name);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TypeUniverse for TypeCatalog {
    fn contains(&self, qualified_name: &str) -> bool {
        self.names.contains(qualified_name)
    }
}

impl<'a> FromIterator<&'a str> for TypeCatalog {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut catalog = TypeCatalog::new();
        catalog.extend(iter);
        catalog
    }
}
