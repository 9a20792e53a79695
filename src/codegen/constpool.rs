//! Constant pool and constants for Java class files

use std::collections::HashMap;

use super::bytecode::constant_tags::*;
use super::error::{EncodeError, EncodeResult};
use super::mutf8::encode_modified_utf8;

/// One constant pool entry. Floating point values are kept as raw bits so
/// entries can be compared and hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
    Dynamic(u16, u16),
    InvokeDynamic(u16, u16),
    Module(u16),
    Package(u16),
}

impl Constant {
    pub fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => CONSTANT_UTF8,
            Constant::Integer(_) => CONSTANT_INTEGER,
            Constant::Float(_) => CONSTANT_FLOAT,
            Constant::Long(_) => CONSTANT_LONG,
            Constant::Double(_) => CONSTANT_DOUBLE,
            Constant::Class(_) => CONSTANT_CLASS,
            Constant::String(_) => CONSTANT_STRING,
            Constant::FieldRef(..) => CONSTANT_FIELDREF,
            Constant::MethodRef(..) => CONSTANT_METHODREF,
            Constant::InterfaceMethodRef(..) => CONSTANT_INTERFACEMETHODREF,
            Constant::NameAndType(..) => CONSTANT_NAMEANDTYPE,
            Constant::MethodHandle(..) => CONSTANT_METHODHANDLE,
            Constant::MethodType(_) => CONSTANT_METHODTYPE,
            Constant::Dynamic(..) => CONSTANT_DYNAMIC,
            Constant::InvokeDynamic(..) => CONSTANT_INVOKEDYNAMIC,
            Constant::Module(_) => CONSTANT_MODULE,
            Constant::Package(_) => CONSTANT_PACKAGE,
        }
    }

    /// Long and double constants take two pool slots
    pub fn width(&self) -> u16 {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }

    /// Pool indices this entry refers to
    pub fn references(&self) -> Vec<u16> {
        match self {
            Constant::Class(i)
            | Constant::String(i)
            | Constant::MethodType(i)
            | Constant::Module(i)
            | Constant::Package(i)
            | Constant::MethodHandle(_, i) => vec![*i],
            Constant::FieldRef(a, b)
            | Constant::MethodRef(a, b)
            | Constant::InterfaceMethodRef(a, b)
            | Constant::NameAndType(a, b) => vec![*a, *b],
            Constant::Dynamic(_, nat) | Constant::InvokeDynamic(_, nat) => vec![*nat],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    /// Slot `i` holds pool index `i + 1`; the slot after a wide constant is `None`
    pub(crate) constants: Vec<Option<Constant>>,
    lookup: HashMap<Constant, u16>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number written as `constant_pool_count`
    pub fn count(&self) -> usize {
        self.constants.len() + 1
    }

    /// Entry at a 1-based pool index
    pub fn get(&self, index: u16) -> Option<&Constant> {
        let slot = usize::from(index).checked_sub(1)?;
        self.constants.get(slot)?.as_ref()
    }

    /// Entries with their pool indices, in pool order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.constants
            .iter()
            .enumerate()
            .filter_map(|(slot, c)| c.as_ref().map(|c| ((slot + 1) as u16, c)))
    }

    /// Add a constant, reusing an equal entry when one exists
    pub fn add(&mut self, constant: Constant) -> EncodeResult<u16> {
        if let Some(&index) = self.lookup.get(&constant) {
            return Ok(index);
        }
        let index = self.push(constant.clone())?;
        self.lookup.insert(constant, index);
        Ok(index)
    }

    /// Append a constant without deduplication, as read from a class file
    pub(crate) fn push(&mut self, constant: Constant) -> EncodeResult<u16> {
        let width = usize::from(constant.width());
        if self.count() + width > usize::from(u16::MAX) {
            return Err(EncodeError::ConstPoolOverflow);
        }
        let index = self.count() as u16;
        self.lookup.entry(constant.clone()).or_insert(index);
        self.constants.push(Some(constant));
        if width == 2 {
            self.constants.push(None);
        }
        Ok(index)
    }

    pub fn add_utf8(&mut self, value: &str) -> EncodeResult<u16> {
        let length = encode_modified_utf8(value).len();
        if length > usize::from(u16::MAX) {
            return Err(EncodeError::StringTooLong { length });
        }
        self.add(Constant::Utf8(value.to_string()))
    }

    pub fn add_class(&mut self, name: &str) -> EncodeResult<u16> {
        let name_index = self.add_utf8(name)?;
        self.add(Constant::Class(name_index))
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> EncodeResult<u16> {
        let name_index = self.add_utf8(name)?;
        let descriptor_index = self.add_utf8(descriptor)?;
        self.add(Constant::NameAndType(name_index, descriptor_index))
    }

    pub fn add_field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> EncodeResult<u16> {
        let class_index = self.add_class(class)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.add(Constant::FieldRef(class_index, name_and_type_index))
    }

    pub fn add_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> EncodeResult<u16> {
        let class_index = self.add_class(class)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.add(Constant::MethodRef(class_index, name_and_type_index))
    }

    /// Text of a `CONSTANT_Utf8` entry
    pub fn utf8(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Some(value),
            _ => None,
        }
    }

    /// Name of a `CONSTANT_Class` entry
    pub fn class_name(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            Constant::Class(name_index) => self.utf8(*name_index),
            _ => None,
        }
    }

    /// `(owner, name, descriptor)` of a field or method reference
    pub fn member_ref(&self, index: u16) -> Option<(&str, &str, &str)> {
        let (class_index, nat_index) = match self.get(index)? {
            Constant::FieldRef(c, n) | Constant::MethodRef(c, n) | Constant::InterfaceMethodRef(c, n) => (*c, *n),
            _ => return None,
        };
        let (name_index, descriptor_index) = match self.get(nat_index)? {
            Constant::NameAndType(n, d) => (*n, *d),
            _ => return None,
        };
        Some((self.class_name(class_index)?, self.utf8(name_index)?, self.utf8(descriptor_index)?))
    }
}
