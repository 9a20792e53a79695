//! Immutable description of an accessor class before encoding

use crate::ast::Constraint;

use super::instruction::Instruction;

/// A resolved attribute ready to become a field and its accessors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub constraint: Option<Constraint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldModel {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodModel {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub max_stack: u16,
    pub max_locals: u16,
    pub instructions: Vec<Instruction>,
}

/// A finished class; fields and methods keep insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassModel {
    pub access: u16,
    /// Slash-separated binary name
    pub internal_name: String,
    pub super_name: String,
    pub signature: Option<String>,
    pub source_file: Option<String>,
    pub fields: Vec<FieldModel>,
    pub methods: Vec<MethodModel>,
}

impl ClassModel {
    pub fn field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodModel> {
        self.methods.iter().find(|m| m.name == name)
    }
}
