//! StackMapTable frames

/// VerificationTypeInfo as defined in JVMS 4.7.4
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    Object(u16),        // cpool index to CONSTANT_Class
    Uninitialized(u16), // offset
}

impl VerificationType {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        match self {
            VerificationType::Top => bytes.push(0),
            VerificationType::Integer => bytes.push(1),
            VerificationType::Float => bytes.push(2),
            VerificationType::Double => bytes.push(3),
            VerificationType::Long => bytes.push(4),
            VerificationType::Null => bytes.push(5),
            VerificationType::UninitializedThis => bytes.push(6),
            VerificationType::Object(cp_index) => {
                bytes.push(7);
                bytes.extend_from_slice(&cp_index.to_be_bytes());
            }
            VerificationType::Uninitialized(offset) => {
                bytes.push(8);
                bytes.extend_from_slice(&offset.to_be_bytes());
            }
        }
        bytes
    }

    /// Local or stack slots this entry describes
    pub fn slots(&self) -> u16 {
        match self {
            VerificationType::Long | VerificationType::Double => 2,
            _ => 1,
        }
    }
}

/// StackMapFrame variants as defined in JVMS 4.7.4
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackMapFrame {
    Same { offset_delta: u16 },
    SameLocals1StackItem { offset_delta: u16, stack: VerificationType },
    Chop { k: u8, offset_delta: u16 },          // k in {1,2,3}
    Append { offset_delta: u16, locals: Vec<VerificationType> }, // 1 to 3 locals
    Full { offset_delta: u16, locals: Vec<VerificationType>, stack: Vec<VerificationType> },
}

impl StackMapFrame {
    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::Same { offset_delta }
            | StackMapFrame::SameLocals1StackItem { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => *offset_delta,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        match self {
            StackMapFrame::Same { offset_delta } => {
                if *offset_delta <= 63 {
                    bytes.push(*offset_delta as u8);
                } else {
                    bytes.push(251); // same_frame_extended
                    bytes.extend_from_slice(&offset_delta.to_be_bytes());
                }
            }
            StackMapFrame::SameLocals1StackItem { offset_delta, stack } => {
                if *offset_delta <= 63 {
                    bytes.push(64 + *offset_delta as u8);
                } else {
                    bytes.push(247); // same_locals_1_stack_item_frame_extended
                    bytes.extend_from_slice(&offset_delta.to_be_bytes());
                }
                bytes.extend_from_slice(&stack.to_bytes());
            }
            StackMapFrame::Chop { k, offset_delta } => {
                bytes.push(251 - *k);
                bytes.extend_from_slice(&offset_delta.to_be_bytes());
            }
            StackMapFrame::Append { offset_delta, locals } => {
                bytes.push(251 + locals.len() as u8);
                bytes.extend_from_slice(&offset_delta.to_be_bytes());
                for l in locals {
                    bytes.extend_from_slice(&l.to_bytes());
                }
            }
            StackMapFrame::Full { offset_delta, locals, stack } => {
                bytes.push(255);
                bytes.extend_from_slice(&offset_delta.to_be_bytes());
                bytes.extend_from_slice(&(locals.len() as u16).to_be_bytes());
                for l in locals {
                    bytes.extend_from_slice(&l.to_bytes());
                }
                bytes.extend_from_slice(&(stack.len() as u16).to_be_bytes());
                for s in stack {
                    bytes.extend_from_slice(&s.to_bytes());
                }
            }
        }
        bytes
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StackMapTable {
    pub frames: Vec<StackMapFrame>,
}

impl StackMapTable {
    pub fn new() -> Self { Self { frames: Vec::new() } }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(self.frames.len() as u16).to_be_bytes());
        for f in &self.frames {
            bytes.extend_from_slice(&f.to_bytes());
        }
        bytes
    }

    /// Absolute bytecode offset of every frame
    pub fn offsets(&self) -> Vec<u32> {
        let mut offsets = Vec::with_capacity(self.frames.len());
        let mut previous: Option<u32> = None;
        for frame in &self.frames {
            let delta = u32::from(frame.offset_delta());
            let offset = match previous {
                None => delta,
                Some(pc) => pc + delta + 1,
            };
            offsets.push(offset);
            previous = Some(offset);
        }
        offsets
    }
}

/// Produce human-readable descriptions of frames with absolute bytecode offsets
pub fn describe_stack_map_frames(table: &StackMapTable) -> Vec<String> {
    table
        .frames
        .iter()
        .zip(table.offsets())
        .map(|(frame, pc)| match frame {
            StackMapFrame::Same { offset_delta } => format!("@{:>4} SAME (delta={})", pc, offset_delta),
            StackMapFrame::SameLocals1StackItem { offset_delta, stack } => {
                format!("@{:>4} SAME_LOCALS_1 (delta={}, stack={:?})", pc, offset_delta, stack)
            }
            StackMapFrame::Chop { k, offset_delta } => format!("@{:>4} CHOP{} (delta={})", pc, k, offset_delta),
            StackMapFrame::Append { offset_delta, locals } => {
                format!("@{:>4} APPEND (delta={}, locals={:?})", pc, offset_delta, locals)
            }
            StackMapFrame::Full { offset_delta, locals, stack } => {
                format!("@{:>4} FULL (delta={}, locals={:?}, stack={:?})", pc, offset_delta, locals, stack)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_frame_bytes() {
        let frame = StackMapFrame::Full {
            offset_delta: 14,
            locals: vec![VerificationType::Object(2), VerificationType::Object(9)],
            stack: vec![VerificationType::Object(2), VerificationType::Object(9)],
        };
        assert_eq!(
            frame.to_bytes(),
            vec![255, 0, 14, 0, 2, 7, 0, 2, 7, 0, 9, 0, 2, 7, 0, 2, 7, 0, 9]
        );
    }

    #[test]
    fn test_compact_frames() {
        assert_eq!(StackMapFrame::Same { offset_delta: 5 }.to_bytes(), vec![5]);
        assert_eq!(StackMapFrame::Same { offset_delta: 100 }.to_bytes(), vec![251, 0, 100]);
        assert_eq!(StackMapFrame::Chop { k: 2, offset_delta: 1 }.to_bytes(), vec![249, 0, 1]);
        assert_eq!(
            StackMapFrame::Append { offset_delta: 3, locals: vec![VerificationType::Integer] }.to_bytes(),
            vec![252, 0, 3, 1]
        );
    }

    #[test]
    fn test_offsets_accumulate() {
        let table = StackMapTable {
            frames: vec![StackMapFrame::Same { offset_delta: 14 }, StackMapFrame::Same { offset_delta: 3 }],
        };
        assert_eq!(table.offsets(), vec![14, 18]);
        assert_eq!(describe_stack_map_frames(&table)[0], "@  14 SAME (delta=14)");
    }
}
