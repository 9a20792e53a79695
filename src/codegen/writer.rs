//! Trait-based serialization for classfile structures

use std::io::Write;

use super::class::ClassFile;
use super::constpool::{Constant, ConstantPool};
use super::mutf8::encode_modified_utf8;

/// An object which can be written into a classfile.
/// This trait provides a unified interface for serializing all classfile components.
pub trait ClassfileWritable {
    /// Writes the bytes of this object into the given buffer.
    ///
    /// # Arguments
    ///
    /// * `buffer` - classfile byte-buffer into which this object should be written
    fn write_to_classfile<W: Write>(&self, buffer: &mut W) -> std::io::Result<()>;

    /// Writes the bytes of this object into a newly created buffer.
    fn to_classfile_bytes(&self) -> std::io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to_classfile(&mut buffer)?;
        Ok(buffer)
    }
}

impl ClassfileWritable for ClassFile {
    fn write_to_classfile<W: Write>(&self, buffer: &mut W) -> std::io::Result<()> {
        buffer.write_all(&self.magic.to_be_bytes())?;

        buffer.write_all(&self.minor_version.to_be_bytes())?;
        buffer.write_all(&self.major_version.to_be_bytes())?;

        self.constant_pool.write_to_classfile(buffer)?;

        buffer.write_all(&self.access_flags.to_be_bytes())?;

        buffer.write_all(&self.this_class.to_be_bytes())?;
        buffer.write_all(&self.super_class.to_be_bytes())?;

        buffer.write_all(&(self.interfaces.len() as u16).to_be_bytes())?;
        for interface in &self.interfaces {
            buffer.write_all(&interface.to_be_bytes())?;
        }

        buffer.write_all(&(self.fields.len() as u16).to_be_bytes())?;
        for field in &self.fields {
            buffer.write_all(&field.to_bytes())?;
        }

        buffer.write_all(&(self.methods.len() as u16).to_be_bytes())?;
        for method in &self.methods {
            buffer.write_all(&method.to_bytes())?;
        }

        buffer.write_all(&(self.attributes.len() as u16).to_be_bytes())?;
        for attribute in &self.attributes {
            buffer.write_all(&attribute.to_bytes())?;
        }
        Ok(())
    }
}

impl ClassfileWritable for ConstantPool {
    fn write_to_classfile<W: Write>(&self, buffer: &mut W) -> std::io::Result<()> {
        // Write constant pool count (size + 1)
        buffer.write_all(&(self.count() as u16).to_be_bytes())?;

        // Wide constants occupy two indices but are written once
        for (_, constant) in self.iter() {
            constant.write_to_classfile(buffer)?;
        }
        Ok(())
    }
}

impl ClassfileWritable for Constant {
    fn write_to_classfile<W: Write>(&self, buffer: &mut W) -> std::io::Result<()> {
        use Constant::*;

        buffer.write_all(&[self.tag()])?;
        match self {
            Utf8(value) => {
                let utf8_bytes = encode_modified_utf8(value);
                buffer.write_all(&(utf8_bytes.len() as u16).to_be_bytes())?;
                buffer.write_all(&utf8_bytes)?;
            }
            Integer(value) => buffer.write_all(&value.to_be_bytes())?,
            Float(bits) => buffer.write_all(&bits.to_be_bytes())?,
            Long(value) => buffer.write_all(&value.to_be_bytes())?,
            Double(bits) => buffer.write_all(&bits.to_be_bytes())?,
            Class(index) | String(index) | MethodType(index) | Module(index) | Package(index) => {
                buffer.write_all(&index.to_be_bytes())?
            }
            FieldRef(first, second)
            | MethodRef(first, second)
            | InterfaceMethodRef(first, second)
            | NameAndType(first, second)
            | Dynamic(first, second)
            | InvokeDynamic(first, second) => {
                buffer.write_all(&first.to_be_bytes())?;
                buffer.write_all(&second.to_be_bytes())?;
            }
            MethodHandle(reference_kind, reference_index) => {
                buffer.write_all(&[*reference_kind])?;
                buffer.write_all(&reference_index.to_be_bytes())?;
            }
        }
        Ok(())
    }
}

pub fn class_file_to_bytes(class_file: &ClassFile) -> std::io::Result<Vec<u8>> {
    class_file.to_classfile_bytes()
}
