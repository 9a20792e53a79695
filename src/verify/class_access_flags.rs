use crate::codegen::bytecode::access_flags;
use crate::codegen::class::ClassFile;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ClassAccessFlagsError {
    #[error("Invalid class access flags: 0x{0:04x}")]
    Invalid(u16),
}

pub type Result<T> = std::result::Result<T, ClassAccessFlagsError>;

/// Verify the class access flags
pub fn verify(class_file: &ClassFile) -> Result<()> {
    let flags = class_file.access_flags;
    let has = |bit: u16| flags & bit != 0;

    // @interface must also be interface
    if has(access_flags::ACC_ANNOTATION) && !has(access_flags::ACC_INTERFACE) {
        return Err(ClassAccessFlagsError::Invalid(flags));
    }

    if has(access_flags::ACC_INTERFACE) {
        let is_package_info = class_file
            .this_class_name()
            .and_then(|name| name.rsplit('/').next())
            == Some("package-info");
        if !has(access_flags::ACC_ABSTRACT) && !is_package_info {
            return Err(ClassAccessFlagsError::Invalid(flags));
        }
        if has(access_flags::ACC_FINAL)
            || has(access_flags::ACC_SUPER)
            || has(access_flags::ACC_ENUM)
            || has(access_flags::ACC_MODULE)
        {
            return Err(ClassAccessFlagsError::Invalid(flags));
        }
    } else if has(access_flags::ACC_FINAL) && has(access_flags::ACC_ABSTRACT) {
        return Err(ClassAccessFlagsError::Invalid(flags));
    }

    Ok(())
}
