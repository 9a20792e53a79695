//! Symbolic instructions of an accessor class
//!
//! Instructions refer to classes, fields and methods by name; constant pool
//! indices and branch offsets are only assigned when the method is written.

use std::fmt;

use super::descriptor::ValueKind;

/// Branch target inside one method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u16);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// `owner.name:descriptor` of a field or method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl MemberRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self { owner: owner.into(), name: name.into(), descriptor: descriptor.into() }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.owner, self.name, self.descriptor)
    }
}

/// Verification type of one frame slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameType {
    Integer,
    Float,
    Long,
    Double,
    /// Class internal name or array descriptor
    Object(String),
}

impl FrameType {
    /// Frame entry for a value of the given field descriptor
    pub fn for_descriptor(descriptor: &str) -> Self {
        match ValueKind::of(descriptor) {
            ValueKind::Int => FrameType::Integer,
            ValueKind::Float => FrameType::Float,
            ValueKind::Long => FrameType::Long,
            ValueKind::Double => FrameType::Double,
            ValueKind::Reference => match descriptor.strip_prefix('L').and_then(|d| d.strip_suffix(';')) {
                Some(internal_name) => FrameType::Object(internal_name.to_string()),
                None => FrameType::Object(descriptor.to_string()),
            },
        }
    }
}

/// Full description of locals and operand stack at a merge point
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    pub locals: Vec<FrameType>,
    pub stack: Vec<FrameType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    LoadLocal { kind: ValueKind, slot: u16 },
    GetField(MemberRef),
    PutField(MemberRef),
    /// `None` is a `void` return
    Return(Option<ValueKind>),
    Dup,
    IfNonNull(Label),
    New(String),
    InvokeSpecial(MemberRef),
    Throw,
    Label(Label),
    Frame(Frame),
}

impl Instruction {
    /// Encoded size in bytes; labels and frames take no space
    pub fn size(&self) -> usize {
        match self {
            Instruction::LoadLocal { slot, .. } if *slot <= 3 => 1,
            Instruction::LoadLocal { .. } => 2,
            Instruction::GetField(_)
            | Instruction::PutField(_)
            | Instruction::IfNonNull(_)
            | Instruction::New(_)
            | Instruction::InvokeSpecial(_) => 3,
            Instruction::Return(_) | Instruction::Dup | Instruction::Throw => 1,
            Instruction::Label(_) | Instruction::Frame(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_types_for_descriptors() {
        assert_eq!(FrameType::for_descriptor("I"), FrameType::Integer);
        assert_eq!(FrameType::for_descriptor("Z"), FrameType::Integer);
        assert_eq!(FrameType::for_descriptor("J"), FrameType::Long);
        assert_eq!(
            FrameType::for_descriptor("Ljava/lang/String;"),
            FrameType::Object("java/lang/String".to_string())
        );
        assert_eq!(
            FrameType::for_descriptor("[Ljava/lang/String;"),
            FrameType::Object("[Ljava/lang/String;".to_string())
        );
    }

    #[test]
    fn test_instruction_sizes() {
        assert_eq!(Instruction::LoadLocal { kind: ValueKind::Int, slot: 1 }.size(), 1);
        assert_eq!(Instruction::LoadLocal { kind: ValueKind::Int, slot: 5 }.size(), 2);
        assert_eq!(Instruction::IfNonNull(Label(0)).size(), 3);
        assert_eq!(Instruction::Label(Label(0)).size(), 0);
    }
}
