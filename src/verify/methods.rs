use std::collections::HashSet;

use crate::codegen::attribute::CodeAttribute;
use crate::codegen::bytecode::access_flags;
use crate::codegen::class::ClassFile;
use crate::codegen::defs::{attribute_names, CONSTRUCTOR_METHOD_NAME};
use crate::codegen::descriptor::split_method_descriptor;
use crate::codegen::error::ParseClassError;
use crate::codegen::frame::StackMapTable;
use crate::codegen::method::MethodInfo;

use super::code::{self, CodeVerifyError};
use super::constant_pool::{utf8_at, ConstantPoolVerifyError};
use super::fields::signature_of;
use super::method_access_flags::{self, MethodAccessFlagsError};
use super::signature::is_valid_method_signature;

#[derive(thiserror::Error, Debug)]
pub enum MethodVerifyError {
    #[error(transparent)]
    ConstantPool(#[from] ConstantPoolVerifyError),
    #[error(transparent)]
    AccessFlags(#[from] MethodAccessFlagsError),
    #[error("Invalid method descriptor '{0}'")]
    InvalidDescriptor(String),
    #[error("Constructor must return void, found '{0}'")]
    ConstructorNotVoid(String),
    #[error("Duplicate method {name}{descriptor}")]
    DuplicateMethod { name: String, descriptor: String },
    #[error("Method must have Code attribute unless abstract or native")]
    MissingCodeAttribute,
    #[error("Abstract or native method must not have Code attribute")]
    ForbiddenCodeAttribute,
    #[error("Invalid method attribute: {0}")]
    InvalidMethodAttribute(String),
    #[error("Duplicate method attribute: {0}")]
    DuplicateMethodAttribute(String),
    #[error("Invalid Signature '{0}'")]
    InvalidSignature(String),
    #[error("Malformed attribute: {0}")]
    Malformed(#[from] ParseClassError),
    #[error("In method {method}: {source}")]
    Code {
        method: String,
        #[source]
        source: CodeVerifyError,
    },
}

pub type Result<T> = std::result::Result<T, MethodVerifyError>;

/// Verify the ClassFile methods
pub fn verify(class_file: &ClassFile) -> Result<()> {
    let pool = &class_file.constant_pool;
    let mut seen = HashSet::new();
    for method in &class_file.methods {
        method_access_flags::verify(class_file, method)?;
        let name = utf8_at(pool, method.name_index)?;
        let descriptor = utf8_at(pool, method.descriptor_index)?;
        let (_, ret) = split_method_descriptor(descriptor)
            .ok_or_else(|| MethodVerifyError::InvalidDescriptor(descriptor.to_string()))?;
        if name == CONSTRUCTOR_METHOD_NAME && ret != "V" {
            return Err(MethodVerifyError::ConstructorNotVoid(descriptor.to_string()));
        }
        if !seen.insert((name, descriptor)) {
            return Err(MethodVerifyError::DuplicateMethod { name: name.to_string(), descriptor: descriptor.to_string() });
        }
        verify_method_attributes(class_file, method, name, descriptor)?;
    }
    Ok(())
}

fn verify_method_attributes(class_file: &ClassFile, method: &MethodInfo, name: &str, descriptor: &str) -> Result<()> {
    let pool = &class_file.constant_pool;
    let mut has_code = false;
    let mut has_signature = false;

    for attribute in &method.attributes {
        let attribute_name = utf8_at(pool, attribute.name_index)?;
        match attribute_name {
            attribute_names::CODE => {
                if has_code {
                    return Err(MethodVerifyError::DuplicateMethodAttribute(attribute_name.to_string()));
                }
                has_code = true;
                let body = CodeAttribute::parse(&attribute.info)?;
                let stack_map = match find_inner(class_file, &body, attribute_names::STACK_MAP_TABLE)? {
                    Some(info) => Some(StackMapTable::parse(info)?),
                    None => None,
                };
                let is_static = method.access_flags & access_flags::ACC_STATIC != 0;
                code::verify(pool, &body, descriptor, is_static, stack_map.as_ref())
                    .map_err(|source| MethodVerifyError::Code { method: name.to_string(), source })?;
            }
            attribute_names::SIGNATURE => {
                if has_signature {
                    return Err(MethodVerifyError::DuplicateMethodAttribute(attribute_name.to_string()));
                }
                has_signature = true;
                let signature = signature_of(pool, &attribute.info)
                    .ok_or_else(|| MethodVerifyError::InvalidMethodAttribute(attribute_name.to_string()))??;
                if !is_valid_method_signature(signature) {
                    return Err(MethodVerifyError::InvalidSignature(signature.to_string()));
                }
            }
            // field-only and class-only attributes
            attribute_names::CONSTANT_VALUE
            | attribute_names::STACK_MAP_TABLE
            | attribute_names::SOURCE_FILE
            | attribute_names::BOOTSTRAP_METHODS => {
                return Err(MethodVerifyError::InvalidMethodAttribute(attribute_name.to_string()));
            }
            _ => {}
        }
    }

    let is_abstract = method.access_flags & access_flags::ACC_ABSTRACT != 0;
    let is_native = method.access_flags & access_flags::ACC_NATIVE != 0;
    match (is_abstract || is_native, has_code) {
        (true, true) => Err(MethodVerifyError::ForbiddenCodeAttribute),
        (false, false) => Err(MethodVerifyError::MissingCodeAttribute),
        _ => Ok(()),
    }
}

/// Payload of the single attribute named `name` inside a `Code` attribute
fn find_inner<'a>(class_file: &ClassFile, code: &'a CodeAttribute, name: &str) -> Result<Option<&'a [u8]>> {
    let mut matching = code
        .attributes
        .iter()
        .filter(|a| a.name(&class_file.constant_pool) == Some(name));
    let first = matching.next();
    if matching.next().is_some() {
        return Err(MethodVerifyError::DuplicateMethodAttribute(name.to_string()));
    }
    Ok(first.map(|a| a.info.as_slice()))
}
