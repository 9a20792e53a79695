use crate::codegen::class::ClassFile;
use crate::codegen::defs::attribute_names;

use super::constant_pool::{utf8_at, ConstantPoolVerifyError};
use super::fields::signature_of;
use super::signature::is_valid_class_signature;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AttributesVerifyError {
    #[error(transparent)]
    ConstantPool(#[from] ConstantPoolVerifyError),
    #[error("Duplicate class attribute: {0}")]
    DuplicateClassAttribute(&'static str),
    #[error("Invalid class Signature '{0}'")]
    InvalidSignature(String),
    #[error("Invalid attribute content: {0}")]
    InvalidContent(&'static str),
    #[error("Attribute {0} is not allowed on a class")]
    Misplaced(String),
}

pub type Result<T> = std::result::Result<T, AttributesVerifyError>;

/// Verify the class-level attribute table
pub fn verify(class_file: &ClassFile) -> Result<()> {
    let pool = &class_file.constant_pool;
    let mut has_signature = false;
    let mut has_source_file = false;

    for attribute in &class_file.attributes {
        let name = utf8_at(pool, attribute.name_index)?;
        match name {
            attribute_names::SIGNATURE => {
                if has_signature {
                    return Err(AttributesVerifyError::DuplicateClassAttribute(attribute_names::SIGNATURE));
                }
                has_signature = true;
                let signature = signature_of(pool, &attribute.info)
                    .ok_or(AttributesVerifyError::InvalidContent(attribute_names::SIGNATURE))??;
                if !is_valid_class_signature(signature) {
                    return Err(AttributesVerifyError::InvalidSignature(signature.to_string()));
                }
            }
            attribute_names::SOURCE_FILE => {
                if has_source_file {
                    return Err(AttributesVerifyError::DuplicateClassAttribute(attribute_names::SOURCE_FILE));
                }
                has_source_file = true;
                // same layout as Signature: one Utf8 index
                signature_of(pool, &attribute.info)
                    .ok_or(AttributesVerifyError::InvalidContent(attribute_names::SOURCE_FILE))??;
            }
            attribute_names::CODE | attribute_names::STACK_MAP_TABLE | attribute_names::CONSTANT_VALUE => {
                return Err(AttributesVerifyError::Misplaced(name.to_string()));
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::attribute::{make_signature_attribute, make_source_file_attribute, AttributeInfo};

    #[test]
    fn test_signature_and_source_file() {
        let mut class_file = ClassFile::new();
        let pool = &mut class_file.constant_pool;
        let signature = make_signature_attribute(pool, "<T:Ljava/lang/Object;>Ljava/lang/Object;").unwrap();
        let source_file = make_source_file_attribute(pool, "Holder.gs").unwrap();
        class_file.attributes.extend([signature, source_file]);
        assert_eq!(verify(&class_file), Ok(()));
    }

    #[test]
    fn test_field_signature_on_class() {
        let mut class_file = ClassFile::new();
        let signature = make_signature_attribute(&mut class_file.constant_pool, "TT;").unwrap();
        class_file.attributes.push(signature);
        assert_eq!(verify(&class_file), Err(AttributesVerifyError::InvalidSignature("TT;".into())));
    }

    #[test]
    fn test_duplicate_source_file() {
        let mut class_file = ClassFile::new();
        let source_file = make_source_file_attribute(&mut class_file.constant_pool, "A.gs").unwrap();
        class_file.attributes.extend([source_file.clone(), source_file]);
        assert_eq!(verify(&class_file), Err(AttributesVerifyError::DuplicateClassAttribute("SourceFile")));
    }

    #[test]
    fn test_truncated_source_file() {
        let mut class_file = ClassFile::new();
        let name_index = class_file.constant_pool.add_utf8("SourceFile").unwrap();
        class_file.attributes.push(AttributeInfo::new(name_index, vec![0]));
        assert_eq!(verify(&class_file), Err(AttributesVerifyError::InvalidContent("SourceFile")));
    }
}
