//! Specific error types for code generation operations

use thiserror::Error;

/// Errors raised while lowering a class model into class-file structures
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Constant pool is out of space")]
    ConstPoolOverflow,
    #[error("Constant string is {length} bytes long")]
    StringTooLong { length: usize },
    #[error("Method {method}: jump to undeclared label L{label}")]
    UndefinedLabel { method: String, label: u16 },
    #[error("Method {method}: label L{label} declared twice")]
    DuplicateLabel { method: String, label: u16 },
    #[error("Method {method}: stack map frame does not follow a label")]
    FrameWithoutLabel { method: String },
    #[error("Method {method}: branch offset {offset} out of range")]
    BranchTooFar { method: String, offset: i64 },
    #[error("Method {method}: code is {size} bytes long")]
    CodeTooLarge { method: String, size: usize },
    #[error("Local variable index out of bounds: {index}")]
    LocalIndexOutOfBounds { index: u16 },
    #[error("Too many {what}: {count}")]
    TooMany { what: &'static str, count: usize },
    #[error("Attribute data too large: {size} bytes")]
    AttributeTooLarge { size: usize },
}

/// Errors raised while reading a class file back
#[derive(Error, Debug)]
pub enum ParseClassError {
    #[error("Unexpected end of class file at offset {offset}")]
    UnexpectedEof { offset: usize },
    #[error("Bad magic number 0x{0:08X}")]
    BadMagic(u32),
    #[error("Unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },
    #[error("Invalid constant pool index: {0}")]
    InvalidConstantIndex(u16),
    #[error("Constant pool entry {0} is not valid modified UTF-8")]
    InvalidUtf8(u16),
    #[error("{0} trailing bytes after class file")]
    TrailingBytes(usize),
    #[error("Malformed {attribute} attribute: {reason}")]
    MalformedAttribute { attribute: &'static str, reason: String },
}

/// Generic result type for encoding operations
pub type EncodeResult<T> = Result<T, EncodeError>;
