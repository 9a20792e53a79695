//! Method body assembly
//!
//! Lowers symbolic instructions into a `Code` attribute. Label offsets are
//! resolved in a first pass; the second pass emits bytes, branch offsets and
//! the stack map frames declared at labels.

use std::collections::HashMap;

use super::attribute::{make_code_attribute, make_stack_map_attribute, AttributeInfo, CodeAttribute};
use super::constpool::ConstantPool;
use super::error::{EncodeError, EncodeResult};
use super::frame::{StackMapFrame, StackMapTable, VerificationType};
use super::instruction::{Frame, FrameType, Instruction, Label};
use super::model::MethodModel;
use super::opcodes::*;

/// Largest code array a method may have
const MAX_CODE_LENGTH: usize = 65535;

pub struct MethodWriter<'a> {
    constant_pool: &'a mut ConstantPool,
    method: &'a MethodModel,
}

impl<'a> MethodWriter<'a> {
    pub fn new(constant_pool: &'a mut ConstantPool, method: &'a MethodModel) -> Self {
        Self { constant_pool, method }
    }

    /// Build the `Code` attribute of the method
    pub fn write_code(mut self) -> EncodeResult<AttributeInfo> {
        let method: &'a MethodModel = self.method;
        let (labels, frame_offsets) = self.layout()?;
        let mut code = Vec::new();
        let mut frames: Vec<(usize, &'a Frame)> = Vec::new();

        for (index, instruction) in method.instructions.iter().enumerate() {
            let pc = code.len();
            match instruction {
                Instruction::LoadLocal { kind, slot } => {
                    if *slot > u16::from(u8::MAX) {
                        return Err(EncodeError::LocalIndexOutOfBounds { index: *slot });
                    }
                    let (opcode, operand) = kind.load_opcode(*slot);
                    code.push(opcode);
                    code.extend(operand);
                }
                Instruction::GetField(field) => {
                    let index = self.constant_pool.add_field_ref(&field.owner, &field.name, &field.descriptor)?;
                    code.push(GETFIELD);
                    code.extend_from_slice(&index.to_be_bytes());
                }
                Instruction::PutField(field) => {
                    let index = self.constant_pool.add_field_ref(&field.owner, &field.name, &field.descriptor)?;
                    code.push(PUTFIELD);
                    code.extend_from_slice(&index.to_be_bytes());
                }
                Instruction::Return(kind) => code.push(kind.map_or(RETURN, |k| k.return_opcode())),
                Instruction::Dup => code.push(DUP),
                Instruction::IfNonNull(label) => {
                    let target = self.label_offset(&labels, *label)?;
                    let offset = target as i64 - pc as i64;
                    let offset = i16::try_from(offset).map_err(|_| EncodeError::BranchTooFar {
                        method: self.method.name.clone(),
                        offset,
                    })?;
                    code.push(IFNONNULL);
                    code.extend_from_slice(&offset.to_be_bytes());
                }
                Instruction::New(class) => {
                    let index = self.constant_pool.add_class(class)?;
                    code.push(NEW);
                    code.extend_from_slice(&index.to_be_bytes());
                }
                Instruction::InvokeSpecial(target) => {
                    let index = self.constant_pool.add_method_ref(&target.owner, &target.name, &target.descriptor)?;
                    code.push(INVOKESPECIAL);
                    code.extend_from_slice(&index.to_be_bytes());
                }
                Instruction::Throw => code.push(ATHROW),
                Instruction::Label(_) => {}
                Instruction::Frame(frame) => {
                    let offset = frame_offsets.get(&index).copied().ok_or_else(|| {
                        EncodeError::FrameWithoutLabel { method: self.method.name.clone() }
                    })?;
                    frames.push((offset, frame));
                }
            }
        }

        if code.len() > MAX_CODE_LENGTH {
            return Err(EncodeError::CodeTooLarge { method: self.method.name.clone(), size: code.len() });
        }

        let mut attribute = CodeAttribute::new(self.method.max_stack, self.method.max_locals, code);
        if !frames.is_empty() {
            let table = self.stack_map(&frames)?;
            attribute.attributes.push(make_stack_map_attribute(self.constant_pool, &table)?);
        }
        make_code_attribute(self.constant_pool, &attribute)
    }

    /// First pass: offsets of labels, and of frames keyed by instruction index
    fn layout(&self) -> EncodeResult<(HashMap<Label, usize>, HashMap<usize, usize>)> {
        let mut labels = HashMap::new();
        let mut frames = HashMap::new();
        let mut pc = 0usize;
        let mut previous: Option<&Instruction> = None;

        for (index, instruction) in self.method.instructions.iter().enumerate() {
            match instruction {
                Instruction::Label(label) => {
                    if labels.insert(*label, pc).is_some() {
                        return Err(EncodeError::DuplicateLabel { method: self.method.name.clone(), label: label.0 });
                    }
                }
                Instruction::Frame(_) => {
                    if !matches!(previous, Some(Instruction::Label(_))) {
                        return Err(EncodeError::FrameWithoutLabel { method: self.method.name.clone() });
                    }
                    frames.insert(index, pc);
                }
                _ => {}
            }
            pc += instruction.size();
            previous = Some(instruction);
        }
        Ok((labels, frames))
    }

    fn label_offset(&self, labels: &HashMap<Label, usize>, label: Label) -> EncodeResult<usize> {
        labels
            .get(&label)
            .copied()
            .ok_or_else(|| EncodeError::UndefinedLabel { method: self.method.name.clone(), label: label.0 })
    }

    fn stack_map(&mut self, frames: &[(usize, &Frame)]) -> EncodeResult<StackMapTable> {
        let mut table = StackMapTable::new();
        let mut previous: Option<usize> = None;
        for (offset, frame) in frames {
            let delta = match previous {
                None => Some(*offset),
                Some(prev) => offset.checked_sub(prev + 1),
            };
            let offset_delta = delta.and_then(|d| u16::try_from(d).ok()).ok_or_else(|| {
                EncodeError::FrameWithoutLabel { method: self.method.name.clone() }
            })?;
            table.frames.push(StackMapFrame::Full {
                offset_delta,
                locals: self.verification_types(&frame.locals)?,
                stack: self.verification_types(&frame.stack)?,
            });
            previous = Some(*offset);
        }
        Ok(table)
    }

    fn verification_types(&mut self, types: &[FrameType]) -> EncodeResult<Vec<VerificationType>> {
        types
            .iter()
            .map(|t| {
                Ok(match t {
                    FrameType::Integer => VerificationType::Integer,
                    FrameType::Float => VerificationType::Float,
                    FrameType::Long => VerificationType::Long,
                    FrameType::Double => VerificationType::Double,
                    FrameType::Object(name) => VerificationType::Object(self.constant_pool.add_class(name)?),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::descriptor::ValueKind;
    use crate::codegen::instruction::MemberRef;

    fn method(instructions: Vec<Instruction>) -> MethodModel {
        MethodModel {
            access: 1,
            name: "m".to_string(),
            descriptor: "()V".to_string(),
            signature: None,
            max_stack: 2,
            max_locals: 2,
            instructions,
        }
    }

    fn code_of(pool: &ConstantPool, attribute: &AttributeInfo) -> Vec<u8> {
        assert_eq!(attribute.name(pool), Some("Code"));
        let len = u32::from_be_bytes([attribute.info[4], attribute.info[5], attribute.info[6], attribute.info[7]]);
        attribute.info[8..8 + len as usize].to_vec()
    }

    #[test]
    fn test_simple_body() {
        let mut pool = ConstantPool::new();
        let m = method(vec![
            Instruction::LoadLocal { kind: ValueKind::Reference, slot: 0 },
            Instruction::GetField(MemberRef::new("A", "x", "J")),
            Instruction::Return(Some(ValueKind::Long)),
        ]);
        let attribute = MethodWriter::new(&mut pool, &m).write_code().unwrap();
        let code = code_of(&pool, &attribute);
        assert_eq!(code[0], ALOAD_0);
        assert_eq!(code[1], GETFIELD);
        let index = u16::from_be_bytes([code[2], code[3]]);
        assert_eq!(pool.member_ref(index), Some(("A", "x", "J")));
        assert_eq!(code[4], LRETURN);
    }

    #[test]
    fn test_branch_offset_and_frame() {
        let mut pool = ConstantPool::new();
        let label = Label(0);
        let m = method(vec![
            Instruction::LoadLocal { kind: ValueKind::Reference, slot: 1 },
            Instruction::IfNonNull(label),
            Instruction::Throw,
            Instruction::Label(label),
            Instruction::Frame(Frame { locals: vec![FrameType::Integer], stack: vec![] }),
            Instruction::Return(None),
        ]);
        let attribute = MethodWriter::new(&mut pool, &m).write_code().unwrap();
        let code = code_of(&pool, &attribute);
        assert_eq!(code, vec![ALOAD_1, IFNONNULL, 0, 4, ATHROW, RETURN]);
        // max_stack, max_locals, code_length, code, exception table, one attribute
        let tail = &attribute.info[8 + code.len()..];
        assert_eq!(&tail[0..4], &[0, 0, 0, 1]);
    }

    #[test]
    fn test_undefined_label() {
        let mut pool = ConstantPool::new();
        let m = method(vec![Instruction::IfNonNull(Label(3)), Instruction::Return(None)]);
        let err = MethodWriter::new(&mut pool, &m).write_code().unwrap_err();
        assert!(matches!(err, EncodeError::UndefinedLabel { label: 3, .. }));
    }

    #[test]
    fn test_duplicate_label() {
        let mut pool = ConstantPool::new();
        let m = method(vec![Instruction::Label(Label(1)), Instruction::Label(Label(1)), Instruction::Return(None)]);
        let err = MethodWriter::new(&mut pool, &m).write_code().unwrap_err();
        assert!(matches!(err, EncodeError::DuplicateLabel { label: 1, .. }));
    }

    #[test]
    fn test_frame_must_follow_label() {
        let mut pool = ConstantPool::new();
        let m = method(vec![
            Instruction::Frame(Frame { locals: vec![], stack: vec![] }),
            Instruction::Return(None),
        ]);
        let err = MethodWriter::new(&mut pool, &m).write_code().unwrap_err();
        assert!(matches!(err, EncodeError::FrameWithoutLabel { .. }));
    }
}
