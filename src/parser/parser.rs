use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{AttributeDecl, ClassHeader, CompilationUnit, Constraint, ImportDecl, PackageDecl};
use crate::common::error::{Error, Result};
use crate::common::names::{is_identifier, is_qualified_name};
use crate::common::source::{SourceLine, SourceLines};
use crate::consts::{IMPORT, PACKAGE};

/// `name (: | ! | !!) type`
static ATTRIBUTE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^:!]+?)\s*(:|!{1,2})\s*([^:!]+?)\s*$").expect("attribute pattern compiles")
});

/// Line-oriented parser over a declaration source
pub struct Parser<'a> {
    lines: SourceLines<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { lines: SourceLines::new(source) }
    }

    /// Parse the whole source into a compilation unit
    pub fn parse(mut self) -> Result<CompilationUnit> {
        let first = self
            .lines
            .next()
            .ok_or(Error::UnexpectedEndOfInput { line: self.lines.last_line() })?;
        let package = parse_package(&first)?;
        log::trace!("package '{}'", package.name);

        let (imports, header_line) = parse_imports(&mut self.lines)?;
        let class = parse_class_header(&header_line)?;
        log::trace!("class header '{}' with {} import(s)", class, imports.len());

        let attributes = self.lines.by_ref().map(|line| parse_attribute(&line)).collect::<Result<Vec<_>>>()?;

        Ok(CompilationUnit { package, imports, class, attributes })
    }
}

/// Parse the `>> package` directive
pub fn parse_package(line: &SourceLine) -> Result<PackageDecl> {
    let name = line
        .text
        .strip_prefix(PACKAGE)
        .ok_or_else(|| Error::syntax_error(line.number, "expected package declaration"))?
        .trim();
    if !name.is_empty() && !is_qualified_name(name) {
        return Err(Error::syntax_error(line.number, format!("invalid package name '{}'", name)));
    }
    Ok(PackageDecl { name: name.to_string(), line: line.number })
}

/// Consume `<<` import lines, handing back the first line that is not an import
pub fn parse_imports<'a>(lines: &mut SourceLines<'a>) -> Result<(Vec<ImportDecl>, SourceLine<'a>)> {
    let mut imports = Vec::new();
    for line in lines.by_ref() {
        let Some(rest) = line.text.strip_prefix(IMPORT) else {
            return Ok((imports, line));
        };
        let name = rest.trim();
        if !is_qualified_name(name) {
            return Err(Error::syntax_error(line.number, format!("invalid import '{}'", name)));
        }
        imports.push(ImportDecl { name: name.to_string(), line: line.number });
    }
    Err(Error::UnexpectedEndOfInput { line: lines.last_line() })
}

/// Parse `Name` or `Name<P1,P2,...>`
pub fn parse_class_header(line: &SourceLine) -> Result<ClassHeader> {
    let text = line.text;
    let (name, type_params) = match text.find('<') {
        Some(open) => {
            let params = text[open + 1..]
                .strip_suffix('>')
                .ok_or_else(|| Error::syntax_error(line.number, "unterminated type parameter list"))?;
            let mut type_params: Vec<String> = Vec::new();
            for param in params.split(',').map(str::trim) {
                if !is_identifier(param) {
                    return Err(Error::syntax_error(
                        line.number,
                        format!("invalid type parameter '{}'", param),
                    ));
                }
                if type_params.iter().any(|p| p == param) {
                    return Err(Error::syntax_error(
                        line.number,
                        format!("duplicate type parameter '{}'", param),
                    ));
                }
                type_params.push(param.to_string());
            }
            (text[..open].trim(), type_params)
        }
        None => (text, Vec::new()),
    };

    if !is_identifier(name) {
        return Err(Error::syntax_error(line.number, format!("invalid class name '{}'", name)));
    }

    Ok(ClassHeader { name: name.to_string(), type_params, line: line.number })
}

/// Parse `name (: | ! | !!) type`
pub fn parse_attribute(line: &SourceLine) -> Result<AttributeDecl> {
    let captures = ATTRIBUTE_PATTERN
        .captures(line.text)
        .ok_or_else(|| Error::syntax_error(line.number, format!("malformed attribute '{}'", line.text)))?;

    let name = &captures[1];
    if !is_identifier(name) {
        return Err(Error::syntax_error(line.number, format!("invalid attribute name '{}'", name)));
    }
    let constraint = Constraint::from_operator(&captures[2])
        .ok_or_else(|| Error::syntax_error(line.number, format!("unknown operator '{}'", &captures[2])))?;

    Ok(AttributeDecl {
        name: name.to_string(),
        type_expr: captures[3].to_string(),
        constraint,
        line: line.number,
    })
}
