//! Type resolution
//!
//! Turns a textual type expression (`int`, `Date`, `java.util.List<String>`,
//! `T`, `String[][]`, ...) into a field descriptor and, when the type has a
//! generic shape, a signature.
//!
//! Resolution order for a raw type name:
//! 1. the import table,
//! 2. the name itself as a qualified name known to the type universe,
//! 3. the name prefixed with `java.lang.`,
//! 4. a class-level type parameter, which becomes a type variable.

use std::fmt;

use crate::common::classpath::TypeUniverse;
use crate::common::error::{Error, Result};
use crate::common::import::ImportTable;
use crate::common::names::{is_qualified_name, to_internal_name};
use crate::consts::{primitive_descriptor, JAVA_LANG_OBJECT_DESCRIPTOR, JAVA_LANG_PACKAGE, MAX_ARRAY_DIMENSIONS};

/// Parsed type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub raw_type: String,
    pub generic: Vec<TypeDeclaration>,
    pub is_generic: bool,
    pub array_dims: usize,
}

impl TypeDeclaration {
    /// Parse a type expression. Trailing `[]` groups become array dimensions and
    /// `<...>` arguments are split on top-level commas only.
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();
        let (base, array_dims) = strip_array_dims(expr);
        if array_dims > MAX_ARRAY_DIMENSIONS {
            return Err(Error::unresolved_type(expr));
        }

        let (raw_type, generic) = match base.find('<') {
            Some(open) => {
                if !base.ends_with('>') {
                    return Err(Error::unresolved_type(expr));
                }
                let args = &base[open + 1..base.len() - 1];
                let parts = split_type_arguments(args).ok_or_else(|| Error::unresolved_type(expr))?;
                let generic = parts
                    .into_iter()
                    .map(TypeDeclaration::parse)
                    .collect::<Result<Vec<_>>>()?;
                (base[..open].trim(), generic)
            }
            None => (base, Vec::new()),
        };

        if raw_type.is_empty() || raw_type.contains(|c| matches!(c, '[' | ']' | '<' | '>' | ',')) {
            return Err(Error::unresolved_type(expr));
        }

        Ok(Self {
            raw_type: raw_type.to_string(),
            is_generic: !generic.is_empty(),
            generic,
            array_dims,
        })
    }
}

impl fmt::Display for TypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw_type)?;
        if self.is_generic {
            write!(f, "<")?;
            for (i, arg) in self.generic.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        for _ in 0..self.array_dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

/// Descriptor and optional signature of a resolved type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub descriptor: String,
    pub signature: Option<String>,
}

impl ResolvedType {
    fn primitive(descriptor: char) -> Self {
        Self { descriptor: descriptor.to_string(), signature: None }
    }

    fn type_variable(name: &str) -> Self {
        Self {
            descriptor: JAVA_LANG_OBJECT_DESCRIPTOR.to_string(),
            signature: Some(format!("T{};", name)),
        }
    }

    fn class(internal_name: &str, args: &[ResolvedType]) -> Self {
        let descriptor = format!("L{};", internal_name);
        if args.is_empty() {
            return Self { descriptor, signature: None };
        }
        let mut signature = format!("L{}<", internal_name);
        for arg in args {
            signature.push_str(arg.generic_form());
        }
        signature.push_str(">;");
        Self { descriptor, signature: Some(signature) }
    }

    fn into_array(self, dims: usize) -> Self {
        if dims == 0 {
            return self;
        }
        let prefix = "[".repeat(dims);
        Self {
            descriptor: format!("{}{}", prefix, self.descriptor),
            signature: self.signature.map(|s| format!("{}{}", prefix, s)),
        }
    }

    /// Signature when the type has a generic shape, descriptor otherwise
    pub fn generic_form(&self) -> &str {
        self.signature.as_deref().unwrap_or(&self.descriptor)
    }
}

/// What a raw (argument-free) type name stands for
#[derive(Debug, Clone, PartialEq, Eq)]
enum RawResolution {
    Class(String),
    TypeVariable(String),
}

/// Resolves type expressions against one class's imports and type parameters
pub struct TypeResolver<'a> {
    imports: &'a ImportTable,
    generic_params: &'a [String],
    universe: &'a dyn TypeUniverse,
}

impl<'a> TypeResolver<'a> {
    pub fn new(imports: &'a ImportTable, generic_params: &'a [String], universe: &'a dyn TypeUniverse) -> Self {
        Self { imports, generic_params, universe }
    }

    /// Resolve a type expression. Bare primitives are accepted only when
    /// `allow_primitive` is set; primitive array elements are always accepted.
    pub fn resolve(&self, expr: &str, allow_primitive: bool) -> Result<ResolvedType> {
        let decl = TypeDeclaration::parse(expr)?;
        let resolved = self.resolve_declaration(&decl, allow_primitive)?;
        log::trace!("resolved '{}' -> {} {:?}", expr, resolved.descriptor, resolved.signature);
        Ok(resolved)
    }

    pub fn resolve_declaration(&self, decl: &TypeDeclaration, allow_primitive: bool) -> Result<ResolvedType> {
        let allow_primitive = allow_primitive || decl.array_dims > 0;
        let base = self.resolve_base(decl, allow_primitive)?;
        Ok(base.into_array(decl.array_dims))
    }

    fn resolve_base(&self, decl: &TypeDeclaration, allow_primitive: bool) -> Result<ResolvedType> {
        if !decl.is_generic {
            if let Some(descriptor) = primitive_descriptor(&decl.raw_type) {
                return if allow_primitive {
                    Ok(ResolvedType::primitive(descriptor))
                } else {
                    Err(Error::primitive_type_argument(&decl.raw_type))
                };
            }
        }

        // Type arguments never accept bare primitives
        let args = decl
            .generic
            .iter()
            .map(|arg| self.resolve_declaration(arg, false))
            .collect::<Result<Vec<_>>>()?;

        match self.resolve_raw(&decl.raw_type) {
            Some(RawResolution::Class(internal_name)) => Ok(ResolvedType::class(&internal_name, &args)),
            Some(RawResolution::TypeVariable(name)) if !decl.is_generic => Ok(ResolvedType::type_variable(&name)),
            _ => {
                let base = TypeDeclaration { array_dims: 0, ..decl.clone() };
                Err(Error::unresolved_type(base.to_string()))
            }
        }
    }

    fn resolve_raw(&self, raw_type: &str) -> Option<RawResolution> {
        if let Some(imported) = self.imports.resolve(raw_type) {
            return Some(RawResolution::Class(to_internal_name(imported)));
        }
        if is_qualified_name(raw_type) {
            if self.universe.contains(raw_type) {
                return Some(RawResolution::Class(to_internal_name(raw_type)));
            }
            let platform_name = format!("{}.{}", JAVA_LANG_PACKAGE, raw_type);
            if self.universe.contains(&platform_name) {
                return Some(RawResolution::Class(to_internal_name(&platform_name)));
            }
        }
        if self.generic_params.iter().any(|p| p == raw_type) {
            return Some(RawResolution::TypeVariable(raw_type.to_string()));
        }
        None
    }
}

/// Split trailing `[]` groups off a type expression
fn strip_array_dims(expr: &str) -> (&str, usize) {
    let mut base = expr;
    let mut dims = 0;
    while let Some(rest) = base.strip_suffix("[]") {
        base = rest.trim_end();
        dims += 1;
    }
    (base, dims)
}

/// Split generic arguments on commas that are not nested inside `<...>`
fn split_type_arguments(args: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(args[start..].trim());
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}
