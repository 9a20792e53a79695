use std::fmt;

// Package and Import Declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDecl {
    /// Dotted package name, empty for the default package
    pub name: String,
    pub line: usize,
}

impl fmt::Display for PackageDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">> {}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub name: String,
    pub line: usize,
}

impl fmt::Display for ImportDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<< {}", self.name)
    }
}

// Class header: `Name` or `Name<P1,P2>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub name: String,
    pub type_params: Vec<String>,
    pub line: usize,
}

impl fmt::Display for ClassHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.type_params.is_empty() {
            write!(f, "<{}>", self.type_params.join(","))?;
        }
        Ok(())
    }
}

/// Null constraint carried by an attribute operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// `!`: the setter rejects null
    NotNull,
    /// `!!`: declared never null; the setter rejects null
    NeverNull,
}

impl Constraint {
    /// Map an attribute operator to its constraint. `:` carries none.
    pub fn from_operator(operator: &str) -> Option<Option<Self>> {
        match operator {
            ":" => Some(None),
            "!" => Some(Some(Constraint::NotNull)),
            "!!" => Some(Some(Constraint::NeverNull)),
            _ => None,
        }
    }

    pub fn operator(constraint: Option<Self>) -> &'static str {
        match constraint {
            None => ":",
            Some(Constraint::NotNull) => "!",
            Some(Constraint::NeverNull) => "!!",
        }
    }
}

// Attribute line: `name (: | ! | !!) type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    pub name: String,
    pub type_expr: String,
    pub constraint: Option<Constraint>,
    pub line: usize,
}

impl fmt::Display for AttributeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, Constraint::operator(self.constraint), self.type_expr)
    }
}

/// A whole declaration source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: PackageDecl,
    pub imports: Vec<ImportDecl>,
    pub class: ClassHeader,
    pub attributes: Vec<AttributeDecl>,
}

impl CompilationUnit {
    /// Dotted binary name of the declared class
    pub fn qualified_class_name(&self) -> String {
        if self.package.name.is_empty() {
            self.class.name.clone()
        } else {
            format!("{}.{}", self.package.name, self.class.name)
        }
    }
}
