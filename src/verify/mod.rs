//! Class file verifier
//!
//! Structural checks over a lowered [`ClassFile`](crate::codegen::class::ClassFile)
//! before its bytes leave the compiler: constant pool references, access
//! flags, descriptor and signature grammar, and an operand stack simulation
//! of every method body.

mod verifier;
pub mod attributes;
pub mod class_access_flags;
pub mod code;
pub mod constant_pool;
pub mod fields;
pub mod method_access_flags;
pub mod methods;
pub mod signature;

pub use verifier::{verify, VerifyError, VerifyResult};
