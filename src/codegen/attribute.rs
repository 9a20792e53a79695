//! Attributes and exception table structures for Java class files

use super::constpool::ConstantPool;
use super::defs::attribute_names;
use super::error::{EncodeError, EncodeResult};
use super::frame::StackMapTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name_index: u16,
    pub info: Vec<u8>,
}

impl AttributeInfo {
    pub fn new(name_index: u16, info: Vec<u8>) -> Self {
        Self { name_index, info }
    }

    /// Attribute name as stored in the constant pool
    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Option<&'a str> {
        constant_pool.utf8(self.name_index)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.name_index.to_be_bytes());
        bytes.extend_from_slice(&(self.info.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.info);
        bytes
    }
}

/// First attribute with the given name
pub fn find_attribute<'a>(
    attributes: &'a [AttributeInfo],
    constant_pool: &ConstantPool,
    name: &str,
) -> Option<&'a AttributeInfo> {
    attributes.iter().find(|a| a.name(constant_pool) == Some(name))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Vec<AttributeInfo>,
}

impl CodeAttribute {
    pub fn new(max_stack: u16, max_locals: u16, code: Vec<u8>) -> Self {
        Self {
            max_stack,
            max_locals,
            code,
            exception_table: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.max_stack.to_be_bytes());
        bytes.extend_from_slice(&self.max_locals.to_be_bytes());
        bytes.extend_from_slice(&(self.code.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.code);
        bytes.extend_from_slice(&(self.exception_table.len() as u16).to_be_bytes());
        for entry in &self.exception_table {
            bytes.extend_from_slice(&entry.to_bytes());
        }
        bytes.extend_from_slice(&(self.attributes.len() as u16).to_be_bytes());
        for attribute in &self.attributes {
            bytes.extend_from_slice(&attribute.to_bytes());
        }
        bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

impl ExceptionTableEntry {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.start_pc.to_be_bytes());
        bytes.extend_from_slice(&self.end_pc.to_be_bytes());
        bytes.extend_from_slice(&self.handler_pc.to_be_bytes());
        bytes.extend_from_slice(&self.catch_type.to_be_bytes());
        bytes
    }
}

fn named(constant_pool: &mut ConstantPool, name: &str, info: Vec<u8>) -> EncodeResult<AttributeInfo> {
    if info.len() > u32::MAX as usize {
        return Err(EncodeError::AttributeTooLarge { size: info.len() });
    }
    let name_index = constant_pool.add_utf8(name)?;
    Ok(AttributeInfo::new(name_index, info))
}

/// Helper to build an AttributeInfo for Code
pub fn make_code_attribute(constant_pool: &mut ConstantPool, code: &CodeAttribute) -> EncodeResult<AttributeInfo> {
    named(constant_pool, attribute_names::CODE, code.to_bytes())
}

/// Helper to build an AttributeInfo for StackMapTable
pub fn make_stack_map_attribute(constant_pool: &mut ConstantPool, table: &StackMapTable) -> EncodeResult<AttributeInfo> {
    named(constant_pool, attribute_names::STACK_MAP_TABLE, table.to_bytes())
}

/// Helper to build an AttributeInfo for Signature
pub fn make_signature_attribute(constant_pool: &mut ConstantPool, signature: &str) -> EncodeResult<AttributeInfo> {
    let signature_index = constant_pool.add_utf8(signature)?;
    named(constant_pool, attribute_names::SIGNATURE, signature_index.to_be_bytes().to_vec())
}

/// Helper to build an AttributeInfo for SourceFile
pub fn make_source_file_attribute(constant_pool: &mut ConstantPool, source_file: &str) -> EncodeResult<AttributeInfo> {
    let source_index = constant_pool.add_utf8(source_file)?;
    named(constant_pool, attribute_names::SOURCE_FILE, source_index.to_be_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_attribute_layout() {
        let code = CodeAttribute::new(1, 1, vec![0x2a, 0xb1]);
        assert_eq!(code.to_bytes(), vec![0, 1, 0, 1, 0, 0, 0, 2, 0x2a, 0xb1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_signature_attribute_points_at_utf8() {
        let mut pool = ConstantPool::new();
        let attribute = make_signature_attribute(&mut pool, "TT;").unwrap();
        assert_eq!(attribute.name(&pool), Some("Signature"));
        let index = u16::from_be_bytes([attribute.info[0], attribute.info[1]]);
        assert_eq!(pool.utf8(index), Some("TT;"));
        assert!(find_attribute(&[attribute], &pool, "Signature").is_some());
    }
}
