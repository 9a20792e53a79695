//! Common utilities and definitions shared across modules
//!
//! This module contains configuration, error definitions, the source line
//! supplier, import tables and the type resolver used by the getset compiler.

pub mod classpath;
pub mod config;
pub mod error;
pub mod import;
pub mod names;
pub mod source;
pub mod type_resolver;

// Re-export commonly used items for convenience
pub use classpath::{TypeCatalog, TypeUniverse};
pub use config::Config;
pub use error::{Error, Result};
pub use import::ImportTable;
pub use source::{SourceLine, SourceLines};
pub use type_resolver::{ResolvedType, TypeResolver};
