//! Parser for the attribute-declaration language
//!
//! Sources are line oriented: a `>>` package directive, `<<` imports, a class
//! header and one attribute per line. Blank lines and `#` comments are skipped.

pub mod parser;

pub use parser::{parse_attribute, parse_class_header, parse_imports, parse_package, Parser};

use crate::ast::CompilationUnit;
use crate::common::error::Result;

/// Parse a declaration source into a compilation unit
pub fn parse_source(source: &str) -> Result<CompilationUnit> {
    Parser::new(source).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_class() {
        let source = r#"
# a small holder
>> com.example
<< java.util.Date

Event
when : Date
count : long
"#;

        let unit = parse_source(source).expect("Failed to parse");
        assert_eq!(unit.class.name, "Event");
        assert_eq!(unit.attributes.len(), 2);
        assert_eq!(unit.attributes[0].type_expr, "Date");
    }
}
