//! Syntax tree for declaration sources
//!
//! A source is a package directive, imports, a class header and attribute
//! lines. Every node remembers the source line it came from.

mod nodes;
mod printer;

pub use nodes::*;
pub use printer::*;

use std::fmt;

impl fmt::Display for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.package)?;
        for import in &self.imports {
            writeln!(f, "{}", import)?;
        }
        writeln!(f, "{}", self.class)?;
        for attribute in &self.attributes {
            writeln!(f, "{}", attribute)?;
        }
        Ok(())
    }
}
