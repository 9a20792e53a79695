use crate::codegen::bytecode::access_flags;
use crate::codegen::class::ClassFile;
use crate::codegen::defs::{major_versions, MAGIC};
use crate::codegen::descriptor::is_internal_name;

use super::attributes::{self, AttributesVerifyError};
use super::class_access_flags::{self, ClassAccessFlagsError};
use super::constant_pool::{self, class_at, ConstantPoolVerifyError};
use super::fields::{self, FieldVerifyError};
use super::methods::{self, MethodVerifyError};

pub type VerifyResult<T> = Result<T, VerifyError>;

#[derive(thiserror::Error, Debug)]
pub enum VerifyError {
    #[error("Bad magic number 0x{0:08x}")]
    BadMagic(u32),
    #[error("Unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("Invalid class name '{0}'")]
    InvalidClassName(String),
    #[error("Missing superclass")]
    MissingSuperClass,
    #[error(transparent)]
    ConstantPool(#[from] ConstantPoolVerifyError),
    #[error(transparent)]
    ClassAccessFlags(#[from] ClassAccessFlagsError),
    #[error(transparent)]
    Field(#[from] FieldVerifyError),
    #[error(transparent)]
    Method(#[from] MethodVerifyError),
    #[error(transparent)]
    Attribute(#[from] AttributesVerifyError),
}

/// Verify the ClassFile by orchestrating all sub-verifiers
pub fn verify(class_file: &ClassFile) -> VerifyResult<()> {
    if class_file.magic != MAGIC {
        return Err(VerifyError::BadMagic(class_file.magic));
    }
    // stack map frames are only understood from version 50 on
    if !(major_versions::JAVA_6_0..=major_versions::JAVA_21).contains(&class_file.major_version) {
        return Err(VerifyError::UnsupportedVersion {
            major: class_file.major_version,
            minor: class_file.minor_version,
        });
    }
    constant_pool::verify(class_file)?;
    class_access_flags::verify(class_file)?;
    verify_this_class(class_file)?;
    verify_super_class(class_file)?;
    for interface in &class_file.interfaces {
        class_at(&class_file.constant_pool, *interface)?;
    }
    fields::verify(class_file)?;
    methods::verify(class_file)?;
    attributes::verify(class_file)?;
    log::trace!(
        "verified {} ({} fields, {} methods)",
        class_file.this_class_name().unwrap_or("?"),
        class_file.fields.len(),
        class_file.methods.len()
    );
    Ok(())
}

fn verify_this_class(class_file: &ClassFile) -> VerifyResult<()> {
    let name = class_at(&class_file.constant_pool, class_file.this_class)?;
    if !is_internal_name(name) {
        return Err(VerifyError::InvalidClassName(name.to_string()));
    }
    Ok(())
}

fn verify_super_class(class_file: &ClassFile) -> VerifyResult<()> {
    // only java/lang/Object and module-info have no superclass
    if class_file.super_class == 0 {
        let is_module = class_file.access_flags & access_flags::ACC_MODULE != 0;
        if is_module || class_file.this_class_name() == Some("java/lang/Object") {
            return Ok(());
        }
        return Err(VerifyError::MissingSuperClass);
    }
    let name = class_at(&class_file.constant_pool, class_file.super_class)?;
    if !is_internal_name(name) {
        return Err(VerifyError::InvalidClassName(name.to_string()));
    }
    Ok(())
}
