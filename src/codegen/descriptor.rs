//! Utilities to build method/field descriptors and pick typed opcodes

use super::opcodes::*;
use crate::consts::MAX_ARRAY_DIMENSIONS;

/// Operand family of a field descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `B C I S Z`
    Int,
    /// `J`
    Long,
    /// `F`
    Float,
    /// `D`
    Double,
    /// `L...;` and `[...`
    Reference,
}

impl ValueKind {
    /// Family of a field descriptor. Anything that is not a primitive is a reference.
    pub fn of(descriptor: &str) -> Self {
        match descriptor {
            "B" | "C" | "I" | "S" | "Z" => ValueKind::Int,
            "J" => ValueKind::Long,
            "F" => ValueKind::Float,
            "D" => ValueKind::Double,
            _ => ValueKind::Reference,
        }
    }

    /// Local variable and operand stack slots taken by one value
    pub fn slots(self) -> u16 {
        match self {
            ValueKind::Long | ValueKind::Double => 2,
            _ => 1,
        }
    }

    /// Load instruction for `slot`, using the compact `xload_<n>` forms when possible
    pub fn load_opcode(self, slot: u16) -> (u8, Option<u8>) {
        let (compact, general) = match self {
            ValueKind::Int => (ILOAD_0, ILOAD),
            ValueKind::Long => (LLOAD_0, LLOAD),
            ValueKind::Float => (FLOAD_0, FLOAD),
            ValueKind::Double => (DLOAD_0, DLOAD),
            ValueKind::Reference => (ALOAD_0, ALOAD),
        };
        match slot {
            0..=3 => (compact + slot as u8, None),
            _ => (general, Some(slot as u8)),
        }
    }

    pub fn return_opcode(self) -> u8 {
        match self {
            ValueKind::Int => IRETURN,
            ValueKind::Long => LRETURN,
            ValueKind::Float => FRETURN,
            ValueKind::Double => DRETURN,
            ValueKind::Reference => ARETURN,
        }
    }
}

/// `()<type>`
pub fn getter_descriptor(field_type: &str) -> String {
    format!("(){}", field_type)
}

/// `(<type>)V`
pub fn setter_descriptor(field_type: &str) -> String {
    format!("({})V", field_type)
}

/// Checks the field descriptor grammar: base types, `L<name>;` and `[` prefixes
pub fn is_field_descriptor(descriptor: &str) -> bool {
    let element = descriptor.trim_start_matches('[');
    let dims = descriptor.len() - element.len();
    if dims > MAX_ARRAY_DIMENSIONS {
        return false;
    }
    match element.as_bytes().first().copied() {
        Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => element.len() == 1,
        Some(b'L') => element
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
            .map(is_internal_name)
            .unwrap_or(false),
        _ => false,
    }
}

/// Slash-separated class name without `.`, `;`, `[` or empty segments
pub fn is_internal_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('/')
            .all(|segment| !segment.is_empty() && !segment.contains(['.', ';', '[', '<', '>']))
}

/// Parameter and return descriptors of a method descriptor
pub fn split_method_descriptor(descriptor: &str) -> Option<(Vec<&str>, &str)> {
    let rest = descriptor.strip_prefix('(')?;
    let close = rest.find(')')?;
    let (mut params_text, ret) = (&rest[..close], &rest[close + 1..]);
    let mut params = Vec::new();
    while !params_text.is_empty() {
        let dims = params_text.len() - params_text.trim_start_matches('[').len();
        let len = match params_text.as_bytes().get(dims).copied()? {
            b'L' => params_text[dims..].find(';')? + 1,
            _ => 1,
        };
        params.push(&params_text[..dims + len]);
        params_text = &params_text[dims + len..];
    }
    if params.iter().any(|p| !is_field_descriptor(p)) {
        return None;
    }
    if ret != "V" && !is_field_descriptor(ret) {
        return None;
    }
    Some((params, ret))
}
