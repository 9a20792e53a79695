//! Core classfile structures: ClassFile

use super::attribute::AttributeInfo;
use super::constpool::ConstantPool;
use super::defs::{major_versions, MAGIC};
use super::field::FieldInfo;
use super::method::MethodInfo;

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub magic: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
    pub fn new() -> Self {
        Self {
            magic: MAGIC,
            minor_version: 0,
            major_version: major_versions::JAVA_7,
            constant_pool: ConstantPool::new(),
            access_flags: 0,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Internal name of this class
    pub fn this_class_name(&self) -> Option<&str> {
        self.constant_pool.class_name(self.this_class)
    }

    pub fn super_class_name(&self) -> Option<&str> {
        self.constant_pool.class_name(self.super_class)
    }

    pub fn field_name(&self, field: &FieldInfo) -> Option<&str> {
        self.constant_pool.utf8(field.name_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Option<&str> {
        self.constant_pool.utf8(method.name_index)
    }

    /// Method with the given name and descriptor
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| {
            self.constant_pool.utf8(m.name_index) == Some(name)
                && self.constant_pool.utf8(m.descriptor_index) == Some(descriptor)
        })
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| self.constant_pool.utf8(f.name_index) == Some(name))
    }
}

impl Default for ClassFile {
    fn default() -> Self {
        Self::new()
    }
}
