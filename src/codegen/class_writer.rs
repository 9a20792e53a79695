//! Class writer
//!
//! Lowers a [`ClassModel`] into a [`ClassFile`], filling the constant pool in
//! a fixed order: this/super class, then fields, methods and class attributes
//! as they appear in the model.

use crate::common::config::Config;

use super::attribute::{make_signature_attribute, make_source_file_attribute};
use super::class::ClassFile;
use super::error::{EncodeError, EncodeResult};
use super::field::FieldInfo;
use super::method::MethodInfo;
use super::method_writer::MethodWriter;
use super::model::{ClassModel, FieldModel, MethodModel};

pub struct ClassWriter {
    major_version: u16,
}

impl ClassWriter {
    pub fn new(config: &Config) -> Self {
        Self { major_version: config.major_version }
    }

    pub fn write(&self, model: &ClassModel) -> EncodeResult<ClassFile> {
        check_count("fields", model.fields.len())?;
        check_count("methods", model.methods.len())?;

        let mut class_file = ClassFile::new();
        class_file.major_version = self.major_version;
        class_file.access_flags = model.access;
        class_file.this_class = class_file.constant_pool.add_class(&model.internal_name)?;
        class_file.super_class = class_file.constant_pool.add_class(&model.super_name)?;

        for field in &model.fields {
            let info = write_field(&mut class_file, field)?;
            class_file.fields.push(info);
        }
        for method in &model.methods {
            let info = write_method(&mut class_file, method)?;
            class_file.methods.push(info);
        }

        if let Some(signature) = &model.signature {
            let attribute = make_signature_attribute(&mut class_file.constant_pool, signature)?;
            class_file.attributes.push(attribute);
        }
        if let Some(source_file) = &model.source_file {
            let attribute = make_source_file_attribute(&mut class_file.constant_pool, source_file)?;
            class_file.attributes.push(attribute);
        }

        log::debug!(
            "lowered {} ({} constants, major version {})",
            model.internal_name,
            class_file.constant_pool.count() - 1,
            class_file.major_version
        );
        Ok(class_file)
    }
}

fn check_count(what: &'static str, count: usize) -> EncodeResult<()> {
    if count > usize::from(u16::MAX) {
        return Err(EncodeError::TooMany { what, count });
    }
    Ok(())
}

fn write_field(class_file: &mut ClassFile, field: &FieldModel) -> EncodeResult<FieldInfo> {
    let pool = &mut class_file.constant_pool;
    let mut info = FieldInfo::new(field.access, pool.add_utf8(&field.name)?, pool.add_utf8(&field.descriptor)?);
    if let Some(signature) = &field.signature {
        info.attributes.push(make_signature_attribute(pool, signature)?);
    }
    Ok(info)
}

fn write_method(class_file: &mut ClassFile, method: &MethodModel) -> EncodeResult<MethodInfo> {
    let pool = &mut class_file.constant_pool;
    let mut info = MethodInfo::new(method.access, pool.add_utf8(&method.name)?, pool.add_utf8(&method.descriptor)?);
    info.attributes.push(MethodWriter::new(pool, method).write_code()?);
    if let Some(signature) = &method.signature {
        info.attributes.push(make_signature_attribute(pool, signature)?);
    }
    Ok(info)
}
