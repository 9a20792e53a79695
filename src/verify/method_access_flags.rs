use crate::codegen::bytecode::access_flags;
use crate::codegen::class::ClassFile;
use crate::codegen::method::MethodInfo;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MethodAccessFlagsError {
    #[error("Invalid method access flags: 0x{0:04x}")]
    Invalid(u16),
}

pub type Result<T> = std::result::Result<T, MethodAccessFlagsError>;

/// Verify method access flags
pub fn verify(class_file: &ClassFile, method: &MethodInfo) -> Result<()> {
    let flags = method.access_flags;
    let has = |bit: u16| flags & bit != 0;

    let visibility = [access_flags::ACC_PUBLIC, access_flags::ACC_PROTECTED, access_flags::ACC_PRIVATE];
    if visibility.iter().filter(|bit| has(**bit)).count() > 1 {
        return Err(MethodAccessFlagsError::Invalid(flags));
    }

    let class_is_interface = class_file.access_flags & access_flags::ACC_INTERFACE != 0;
    if class_is_interface
        && (has(access_flags::ACC_PROTECTED)
            || has(access_flags::ACC_FINAL)
            || has(access_flags::ACC_SYNCHRONIZED)
            || has(access_flags::ACC_NATIVE))
    {
        return Err(MethodAccessFlagsError::Invalid(flags));
    }

    if has(access_flags::ACC_ABSTRACT)
        && (has(access_flags::ACC_PRIVATE)
            || has(access_flags::ACC_STATIC)
            || has(access_flags::ACC_FINAL)
            || has(access_flags::ACC_SYNCHRONIZED)
            || has(access_flags::ACC_NATIVE)
            || has(access_flags::ACC_STRICT))
    {
        return Err(MethodAccessFlagsError::Invalid(flags));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_flags::*;

    fn check(flags: u16) -> Result<()> {
        verify(&ClassFile::new(), &MethodInfo::new(flags, 1, 2))
    }

    #[test]
    fn test_single_visibility() {
        assert_eq!(check(ACC_PUBLIC), Ok(()));
        assert_eq!(check(ACC_PUBLIC | ACC_PRIVATE), Err(MethodAccessFlagsError::Invalid(ACC_PUBLIC | ACC_PRIVATE)));
    }

    #[test]
    fn test_abstract_combinations() {
        assert_eq!(check(ACC_PUBLIC | ACC_ABSTRACT), Ok(()));
        assert!(check(ACC_ABSTRACT | ACC_STATIC).is_err());
        assert!(check(ACC_ABSTRACT | ACC_FINAL).is_err());
    }
}
