//! Code generation module
//!
//! Turns a resolved class description into class file bytes:
//!
//! ```text
//! AttributeSpec* → ClassAssembler → ClassModel → ClassWriter → ClassFile → bytes
//!                                                                 ↓
//!                                                              verify
//! ```
//!
//! [`ClassFile::parse`] reads the bytes back for inspection and tests.

pub mod assembler;
pub mod attribute;
pub mod bytecode;
pub mod class;
pub mod class_writer;
pub mod constpool;
pub mod defs;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod frame;
pub mod instruction;
pub mod method;
pub mod method_writer;
pub mod model;
pub mod mutf8;
pub mod opcodes;
pub mod reader;
pub mod signature;
pub mod writer;

// Re-export commonly used types
pub use assembler::ClassAssembler;
pub use class::ClassFile;
pub use class_writer::ClassWriter;
pub use constpool::{Constant, ConstantPool};
pub use error::{EncodeError, EncodeResult, ParseClassError};
pub use model::{AttributeSpec, ClassModel, FieldModel, MethodModel};
pub use writer::{class_file_to_bytes, ClassfileWritable};

use crate::common::{Config, Result};

/// Encode an assembled class into class file bytes, verifying it first when
/// the configuration asks for it
pub fn encode(model: &ClassModel, config: &Config) -> Result<Vec<u8>> {
    let class_file = ClassWriter::new(config).write(model)?;
    if config.verify {
        crate::verify::verify(&class_file)?;
        log::debug!("verified {}", model.internal_name);
    }
    let bytes = class_file_to_bytes(&class_file)?;
    log::debug!("encoded {} into {} bytes", model.internal_name, bytes.len());
    Ok(bytes)
}
