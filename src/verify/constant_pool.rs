use crate::codegen::class::ClassFile;
use crate::codegen::constpool::{Constant, ConstantPool};
use crate::codegen::defs::attribute_names;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConstantPoolVerifyError {
    #[error("Invalid constant pool index {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Invalid constant pool index type {0}")]
    InvalidConstantPoolIndexType(u16),
    #[error("BootstrapMethods attribute not defined")]
    BootstrapMethodsNotDefined,
}

pub type Result<T> = std::result::Result<T, ConstantPoolVerifyError>;

/// Verify that every constant refers to entries of the right kind
pub fn verify(class_file: &ClassFile) -> Result<()> {
    let pool = &class_file.constant_pool;
    for (_, constant) in pool.iter() {
        match constant {
            Constant::Class(name_index)
            | Constant::Module(name_index)
            | Constant::Package(name_index)
            | Constant::String(name_index)
            | Constant::MethodType(name_index) => {
                utf8_at(pool, *name_index)?;
            }
            Constant::FieldRef(class_index, nat_index)
            | Constant::MethodRef(class_index, nat_index)
            | Constant::InterfaceMethodRef(class_index, nat_index) => {
                class_at(pool, *class_index)?;
                name_and_type_at(pool, *nat_index)?;
            }
            Constant::NameAndType(name_index, descriptor_index) => {
                utf8_at(pool, *name_index)?;
                utf8_at(pool, *descriptor_index)?;
            }
            Constant::MethodHandle(_, reference_index) => match pool.get(*reference_index) {
                Some(Constant::FieldRef(..) | Constant::MethodRef(..) | Constant::InterfaceMethodRef(..)) => {}
                None => return Err(ConstantPoolVerifyError::InvalidConstantPoolIndex(*reference_index)),
                _ => return Err(ConstantPoolVerifyError::InvalidConstantPoolIndexType(*reference_index)),
            },
            Constant::Dynamic(_, nat_index) | Constant::InvokeDynamic(_, nat_index) => {
                let has_bootstrap = class_file
                    .attributes
                    .iter()
                    .any(|a| a.name(pool) == Some(attribute_names::BOOTSTRAP_METHODS));
                if !has_bootstrap {
                    return Err(ConstantPoolVerifyError::BootstrapMethodsNotDefined);
                }
                name_and_type_at(pool, *nat_index)?;
            }
            Constant::Utf8(_) | Constant::Integer(_) | Constant::Float(_) | Constant::Long(_) | Constant::Double(_) => {}
        }
    }
    Ok(())
}

/// Text of the `CONSTANT_Utf8` at `index`
pub(crate) fn utf8_at(pool: &ConstantPool, index: u16) -> Result<&str> {
    match pool.get(index) {
        Some(Constant::Utf8(value)) => Ok(value),
        None => Err(ConstantPoolVerifyError::InvalidConstantPoolIndex(index)),
        _ => Err(ConstantPoolVerifyError::InvalidConstantPoolIndexType(index)),
    }
}

/// Internal name of the `CONSTANT_Class` at `index`
pub(crate) fn class_at(pool: &ConstantPool, index: u16) -> Result<&str> {
    match pool.get(index) {
        Some(Constant::Class(name_index)) => utf8_at(pool, *name_index),
        None => Err(ConstantPoolVerifyError::InvalidConstantPoolIndex(index)),
        _ => Err(ConstantPoolVerifyError::InvalidConstantPoolIndexType(index)),
    }
}

fn name_and_type_at(pool: &ConstantPool, index: u16) -> Result<()> {
    match pool.get(index) {
        Some(Constant::NameAndType(..)) => Ok(()),
        None => Err(ConstantPoolVerifyError::InvalidConstantPoolIndex(index)),
        _ => Err(ConstantPoolVerifyError::InvalidConstantPoolIndexType(index)),
    }
}
