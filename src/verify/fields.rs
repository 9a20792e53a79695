use std::collections::HashSet;

use crate::codegen::bytecode::access_flags;
use crate::codegen::class::ClassFile;
use crate::codegen::constpool::Constant;
use crate::codegen::defs::attribute_names;
use crate::codegen::descriptor::is_field_descriptor;
use crate::codegen::field::FieldInfo;

use super::constant_pool::{utf8_at, ConstantPoolVerifyError};
use super::signature::is_valid_field_signature;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FieldVerifyError {
    #[error(transparent)]
    ConstantPool(#[from] ConstantPoolVerifyError),
    #[error("Invalid field name '{0}'")]
    InvalidName(String),
    #[error("Invalid field descriptor '{0}'")]
    InvalidDescriptor(String),
    #[error("Duplicate field '{0}'")]
    DuplicateField(String),
    #[error("Invalid field access flags: 0x{0:04x}")]
    InvalidFieldAccessFlags(u16),
    #[error("Invalid field attribute: {0}")]
    InvalidFieldAttribute(String),
    #[error("Duplicate field attribute: {0}")]
    DuplicateFieldAttribute(String),
    #[error("Invalid Signature '{0}'")]
    InvalidSignature(String),
    #[error("ConstantValue on non-static field")]
    ConstantValueOnNonStatic,
    #[error("ConstantValue refers to invalid constant kind for field")]
    InvalidConstantValueKind,
}

pub type Result<T> = std::result::Result<T, FieldVerifyError>;

pub fn verify(class_file: &ClassFile) -> Result<()> {
    let mut seen = HashSet::new();
    for field in &class_file.fields {
        let pool = &class_file.constant_pool;
        let name = utf8_at(pool, field.name_index)?;
        if name.is_empty() || name.contains(&['.', ';', '[', '/'][..]) {
            return Err(FieldVerifyError::InvalidName(name.to_string()));
        }
        let descriptor = utf8_at(pool, field.descriptor_index)?;
        if !is_field_descriptor(descriptor) {
            return Err(FieldVerifyError::InvalidDescriptor(descriptor.to_string()));
        }
        // name and descriptor together identify a field
        if !seen.insert((name, descriptor)) {
            return Err(FieldVerifyError::DuplicateField(name.to_string()));
        }
        verify_access_flags(class_file, field.access_flags)?;
        verify_attributes(class_file, field)?;
    }
    Ok(())
}

fn verify_access_flags(class_file: &ClassFile, flags: u16) -> Result<()> {
    let has = |bit: u16| flags & bit != 0;
    let visibility = [access_flags::ACC_PUBLIC, access_flags::ACC_PROTECTED, access_flags::ACC_PRIVATE];
    if visibility.iter().filter(|bit| has(**bit)).count() > 1 {
        return Err(FieldVerifyError::InvalidFieldAccessFlags(flags));
    }

    if class_file.access_flags & access_flags::ACC_INTERFACE != 0 {
        let must = access_flags::ACC_PUBLIC | access_flags::ACC_STATIC | access_flags::ACC_FINAL;
        let illegal = access_flags::ACC_PRIVATE
            | access_flags::ACC_PROTECTED
            | access_flags::ACC_VOLATILE
            | access_flags::ACC_TRANSIENT
            | access_flags::ACC_ENUM;
        if flags & must != must || flags & illegal != 0 {
            return Err(FieldVerifyError::InvalidFieldAccessFlags(flags));
        }
    } else if has(access_flags::ACC_FINAL) && has(access_flags::ACC_VOLATILE) {
        return Err(FieldVerifyError::InvalidFieldAccessFlags(flags));
    }
    Ok(())
}

fn verify_attributes(class_file: &ClassFile, field: &FieldInfo) -> Result<()> {
    let pool = &class_file.constant_pool;
    let mut has_constant_value = false;
    let mut has_signature = false;

    for attribute in &field.attributes {
        let name = utf8_at(pool, attribute.name_index)?;
        match name {
            attribute_names::CONSTANT_VALUE => {
                if has_constant_value {
                    return Err(FieldVerifyError::DuplicateFieldAttribute(name.to_string()));
                }
                has_constant_value = true;
                if field.access_flags & access_flags::ACC_STATIC == 0 {
                    return Err(FieldVerifyError::ConstantValueOnNonStatic);
                }
                let index = match attribute.info.as_slice() {
                    [high, low] => u16::from_be_bytes([*high, *low]),
                    _ => return Err(FieldVerifyError::InvalidFieldAttribute(name.to_string())),
                };
                match pool.get(index) {
                    Some(
                        Constant::Integer(_)
                        | Constant::Float(_)
                        | Constant::Long(_)
                        | Constant::Double(_)
                        | Constant::String(_),
                    ) => {}
                    _ => return Err(FieldVerifyError::InvalidConstantValueKind),
                }
            }
            attribute_names::SIGNATURE => {
                if has_signature {
                    return Err(FieldVerifyError::DuplicateFieldAttribute(name.to_string()));
                }
                has_signature = true;
                let signature = signature_of(pool, &attribute.info)
                    .ok_or_else(|| FieldVerifyError::InvalidFieldAttribute(name.to_string()))??;
                if !is_valid_field_signature(signature) {
                    return Err(FieldVerifyError::InvalidSignature(signature.to_string()));
                }
            }
            // method-only and class-only attributes
            attribute_names::CODE
            | attribute_names::STACK_MAP_TABLE
            | attribute_names::SOURCE_FILE
            | attribute_names::BOOTSTRAP_METHODS => {
                return Err(FieldVerifyError::InvalidFieldAttribute(name.to_string()));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Text referenced by a two-byte `Signature` payload; `None` when the payload has the wrong size
pub(crate) fn signature_of<'a>(
    pool: &'a crate::codegen::constpool::ConstantPool,
    info: &[u8],
) -> Option<std::result::Result<&'a str, ConstantPoolVerifyError>> {
    match info {
        [high, low] => Some(utf8_at(pool, u16::from_be_bytes([*high, *low]))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::attribute::{make_signature_attribute, AttributeInfo};

    fn class_with_field(name: &str, descriptor: &str, access: u16) -> ClassFile {
        let mut class_file = ClassFile::new();
        let name_index = class_file.constant_pool.add_utf8(name).unwrap();
        let descriptor_index = class_file.constant_pool.add_utf8(descriptor).unwrap();
        class_file.fields.push(FieldInfo::new(access, name_index, descriptor_index));
        class_file
    }

    #[test]
    fn test_private_field_with_signature() {
        let mut class_file = class_with_field("value", "Ljava/lang/Object;", access_flags::ACC_PRIVATE);
        let signature = make_signature_attribute(&mut class_file.constant_pool, "TT;").unwrap();
        class_file.fields[0].attributes.push(signature);
        assert_eq!(verify(&class_file), Ok(()));
    }

    #[test]
    fn test_bad_descriptor() {
        let class_file = class_with_field("value", "Q", access_flags::ACC_PRIVATE);
        assert_eq!(verify(&class_file), Err(FieldVerifyError::InvalidDescriptor("Q".into())));
    }

    #[test]
    fn test_bad_signature() {
        let mut class_file = class_with_field("value", "Ljava/util/List;", access_flags::ACC_PRIVATE);
        let signature = make_signature_attribute(&mut class_file.constant_pool, "Ljava/util/List<>;").unwrap();
        class_file.fields[0].attributes.push(signature);
        assert!(matches!(verify(&class_file), Err(FieldVerifyError::InvalidSignature(_))));
    }

    #[test]
    fn test_duplicate_field() {
        let mut class_file = class_with_field("value", "I", access_flags::ACC_PRIVATE);
        let field = class_file.fields[0].clone();
        class_file.fields.push(field);
        assert_eq!(verify(&class_file), Err(FieldVerifyError::DuplicateField("value".into())));
    }

    #[test]
    fn test_code_attribute_on_field() {
        let mut class_file = class_with_field("value", "I", access_flags::ACC_PRIVATE);
        let name_index = class_file.constant_pool.add_utf8("Code").unwrap();
        class_file.fields[0].attributes.push(AttributeInfo::new(name_index, vec![]));
        assert_eq!(verify(&class_file), Err(FieldVerifyError::InvalidFieldAttribute("Code".into())));
    }

    #[test]
    fn test_conflicting_visibility() {
        let flags = access_flags::ACC_PRIVATE | access_flags::ACC_PUBLIC;
        let class_file = class_with_field("value", "I", flags);
        assert_eq!(verify(&class_file), Err(FieldVerifyError::InvalidFieldAccessFlags(flags)));
    }
}
