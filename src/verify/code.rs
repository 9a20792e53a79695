//! Operand stack simulation over a decoded `Code` attribute
//!
//! Walks every reachable instruction, tracking the operand stack depth in
//! slots, and cross-checks the declared `max_stack`/`max_locals`, the return
//! instructions and the stack map frames at branch targets.

use std::collections::{BTreeMap, HashMap};

use crate::codegen::attribute::CodeAttribute;
use crate::codegen::constpool::{Constant, ConstantPool};
use crate::codegen::descriptor::{split_method_descriptor, ValueKind};
use crate::codegen::frame::StackMapTable;
use crate::codegen::opcodes::*;

use super::constant_pool::ConstantPoolVerifyError;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CodeVerifyError {
    #[error(transparent)]
    ConstantPool(#[from] ConstantPoolVerifyError),
    #[error("Empty code array")]
    EmptyCode,
    #[error("Unsupported opcode 0x{opcode:02x} at {pc}")]
    UnsupportedOpcode { pc: usize, opcode: u8 },
    #[error("Truncated instruction at {pc}")]
    Truncated { pc: usize },
    #[error("Invalid method descriptor '{0}'")]
    InvalidDescriptor(String),
    #[error("Branch at {pc} targets {target}, which is not an instruction")]
    BadBranchTarget { pc: usize, target: i64 },
    #[error("Operand stack underflow at {pc}")]
    StackUnderflow { pc: usize },
    #[error("Operand stack depth {depth} at {pc} exceeds max_stack {max_stack}")]
    StackOverflow { pc: usize, depth: u16, max_stack: u16 },
    #[error("Local {index} used at {pc} is outside max_locals {max_locals}")]
    LocalOutOfRange { pc: usize, index: u16, max_locals: u16 },
    #[error("Parameters need {needed} locals but max_locals is {max_locals}")]
    ParametersExceedLocals { needed: u16, max_locals: u16 },
    #[error("Stack depth at {pc} is {found} on one path and {expected} on another")]
    InconsistentStack { pc: usize, expected: u16, found: u16 },
    #[error("Execution falls off the end of the code")]
    FallsOffEnd,
    #[error("Return at {pc} is {found}, descriptor needs {expected}")]
    ReturnMismatch { pc: usize, expected: &'static str, found: &'static str },
    #[error("Branch target {pc} has no stack map frame")]
    MissingFrame { pc: usize },
    #[error("Stack map frame at {offset} is not on an instruction boundary")]
    FrameNotAtInstruction { offset: usize },
    #[error("Stack map frame at {offset} declares {declared} stack slots, simulation has {simulated}")]
    FrameStackMismatch { offset: usize, declared: u16, simulated: u16 },
}

pub type Result<T> = std::result::Result<T, CodeVerifyError>;

/// One decoded instruction
#[derive(Debug, Clone, Copy)]
struct Insn {
    opcode: u8,
    len: usize,
    /// `u1` local index or `u2` pool index, when the instruction has one
    operand: Option<u16>,
    branch: Option<usize>,
}

/// Simulate `code` for a method with the given descriptor
pub fn verify(
    pool: &ConstantPool,
    code: &CodeAttribute,
    descriptor: &str,
    is_static: bool,
    stack_map: Option<&StackMapTable>,
) -> Result<()> {
    let (params, ret) =
        split_method_descriptor(descriptor).ok_or_else(|| CodeVerifyError::InvalidDescriptor(descriptor.to_string()))?;
    let needed = params.iter().map(|p| ValueKind::of(p).slots()).sum::<u16>() + u16::from(!is_static);
    if needed > code.max_locals {
        return Err(CodeVerifyError::ParametersExceedLocals { needed, max_locals: code.max_locals });
    }
    let expected_return = match ret {
        "V" => RETURN,
        _ => ValueKind::of(ret).return_opcode(),
    };

    let insns = decode(&code.code)?;
    let frames = frame_depths(stack_map, &insns)?;

    let mut depths: HashMap<usize, u16> = HashMap::new();
    let mut work = vec![(0usize, 0u16)];
    while let Some((pc, depth)) = work.pop() {
        if let Some(&seen) = depths.get(&pc) {
            if seen != depth {
                return Err(CodeVerifyError::InconsistentStack { pc, expected: seen, found: depth });
            }
            continue;
        }
        if let Some(&declared) = frames.get(&pc) {
            if declared != depth {
                return Err(CodeVerifyError::FrameStackMismatch { offset: pc, declared, simulated: depth });
            }
        }
        depths.insert(pc, depth);

        let insn = insns.get(&pc).ok_or(CodeVerifyError::FallsOffEnd)?;
        let (pop, push) = stack_effect(pool, code, pc, insn)?;
        let after = depth.checked_sub(pop).ok_or(CodeVerifyError::StackUnderflow { pc })?;
        let peak = after + push;
        if peak > code.max_stack || depth > code.max_stack {
            return Err(CodeVerifyError::StackOverflow { pc, depth: peak.max(depth), max_stack: code.max_stack });
        }

        match insn.opcode {
            IRETURN | LRETURN | FRETURN | DRETURN | ARETURN | RETURN => {
                if insn.opcode != expected_return {
                    return Err(CodeVerifyError::ReturnMismatch {
                        pc,
                        expected: opcode_name(expected_return).unwrap_or("?"),
                        found: opcode_name(insn.opcode).unwrap_or("?"),
                    });
                }
            }
            ATHROW => {}
            _ => {
                if let Some(target) = insn.branch {
                    if !frames.contains_key(&target) {
                        return Err(CodeVerifyError::MissingFrame { pc: target });
                    }
                    work.push((target, peak));
                }
                work.push((pc + insn.len, peak));
            }
        }
    }
    Ok(())
}

fn decode(code: &[u8]) -> Result<BTreeMap<usize, Insn>> {
    if code.is_empty() {
        return Err(CodeVerifyError::EmptyCode);
    }
    let mut insns = BTreeMap::new();
    let mut pc = 0;
    while pc < code.len() {
        let opcode = code[pc];
        let operands = operand_count(opcode).ok_or(CodeVerifyError::UnsupportedOpcode { pc, opcode })?;
        let bytes = code.get(pc + 1..pc + 1 + operands).ok_or(CodeVerifyError::Truncated { pc })?;
        let operand = match bytes {
            [] => None,
            [index] => Some(u16::from(*index)),
            [high, low] => Some(u16::from_be_bytes([*high, *low])),
            _ => return Err(CodeVerifyError::Truncated { pc }),
        };
        let branch = match (opcode, operand) {
            (IFNONNULL, Some(raw)) => {
                let target = pc as i64 + i64::from(raw as i16);
                Some(usize::try_from(target).map_err(|_| CodeVerifyError::BadBranchTarget { pc, target })?)
            }
            _ => None,
        };
        insns.insert(pc, Insn { opcode, len: 1 + operands, operand, branch });
        pc += 1 + operands;
    }
    for (pc, insn) in &insns {
        if let Some(target) = insn.branch {
            if !insns.contains_key(&target) {
                return Err(CodeVerifyError::BadBranchTarget { pc: *pc, target: target as i64 });
            }
        }
    }
    Ok(insns)
}

/// Declared operand stack size, in slots, at every frame offset
fn frame_depths(stack_map: Option<&StackMapTable>, insns: &BTreeMap<usize, Insn>) -> Result<HashMap<usize, u16>> {
    let mut depths = HashMap::new();
    let Some(table) = stack_map else {
        return Ok(depths);
    };
    for (frame, offset) in table.frames.iter().zip(table.offsets()) {
        let offset = offset as usize;
        if !insns.contains_key(&offset) {
            return Err(CodeVerifyError::FrameNotAtInstruction { offset });
        }
        let slots = match frame {
            crate::codegen::frame::StackMapFrame::Full { stack, .. } => stack.iter().map(|t| t.slots()).sum(),
            crate::codegen::frame::StackMapFrame::SameLocals1StackItem { stack, .. } => stack.slots(),
            _ => 0,
        };
        depths.insert(offset, slots);
    }
    Ok(depths)
}

/// Slots popped and pushed by one instruction
fn stack_effect(pool: &ConstantPool, code: &CodeAttribute, pc: usize, insn: &Insn) -> Result<(u16, u16)> {
    if let Some((kind, index)) = load_kind(insn) {
        if index + kind.slots() > code.max_locals {
            return Err(CodeVerifyError::LocalOutOfRange { pc, index, max_locals: code.max_locals });
        }
        return Ok((0, kind.slots()));
    }

    let index = insn.operand.unwrap_or(0);
    let effect = match insn.opcode {
        DUP => (1, 2),
        NEW => {
            class_ref(pool, index)?;
            (0, 1)
        }
        ATHROW | IFNONNULL => (1, 0),
        IRETURN | FRETURN | ARETURN => (1, 0),
        LRETURN | DRETURN => (2, 0),
        RETURN => (0, 0),
        GETFIELD => (1, ValueKind::of(field_ref(pool, index)?).slots()),
        PUTFIELD => (1 + ValueKind::of(field_ref(pool, index)?).slots(), 0),
        INVOKESPECIAL => {
            let descriptor = method_ref(pool, index)?;
            let (params, ret) = split_method_descriptor(descriptor)
                .ok_or_else(|| CodeVerifyError::InvalidDescriptor(descriptor.to_string()))?;
            let pop = 1 + params.iter().map(|p| ValueKind::of(p).slots()).sum::<u16>();
            let push = if ret == "V" { 0 } else { ValueKind::of(ret).slots() };
            (pop, push)
        }
        opcode => return Err(CodeVerifyError::UnsupportedOpcode { pc, opcode }),
    };
    Ok(effect)
}

fn load_kind(insn: &Insn) -> Option<(ValueKind, u16)> {
    let kind_of = |base: u8| match base {
        ILOAD | ILOAD_0 => ValueKind::Int,
        LLOAD | LLOAD_0 => ValueKind::Long,
        FLOAD | FLOAD_0 => ValueKind::Float,
        DLOAD | DLOAD_0 => ValueKind::Double,
        _ => ValueKind::Reference,
    };
    match insn.opcode {
        ILOAD | LLOAD | FLOAD | DLOAD | ALOAD => Some((kind_of(insn.opcode), insn.operand.unwrap_or(0))),
        ILOAD_0..=ALOAD_3 => {
            let offset = insn.opcode - ILOAD_0;
            let base = ILOAD_0 + (offset / 4) * 4;
            Some((kind_of(base), u16::from(offset % 4)))
        }
        _ => None,
    }
}

fn field_ref(pool: &ConstantPool, index: u16) -> Result<&str> {
    match pool.get(index) {
        Some(Constant::FieldRef(..)) => member_descriptor(pool, index),
        None => Err(ConstantPoolVerifyError::InvalidConstantPoolIndex(index).into()),
        _ => Err(ConstantPoolVerifyError::InvalidConstantPoolIndexType(index).into()),
    }
}

fn method_ref(pool: &ConstantPool, index: u16) -> Result<&str> {
    match pool.get(index) {
        Some(Constant::MethodRef(..) | Constant::InterfaceMethodRef(..)) => member_descriptor(pool, index),
        None => Err(ConstantPoolVerifyError::InvalidConstantPoolIndex(index).into()),
        _ => Err(ConstantPoolVerifyError::InvalidConstantPoolIndexType(index).into()),
    }
}

fn class_ref(pool: &ConstantPool, index: u16) -> Result<()> {
    super::constant_pool::class_at(pool, index)?;
    Ok(())
}

fn member_descriptor(pool: &ConstantPool, index: u16) -> Result<&str> {
    pool.member_ref(index)
        .map(|(_, _, descriptor)| descriptor)
        .ok_or_else(|| ConstantPoolVerifyError::InvalidConstantPoolIndexType(index).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::frame::{StackMapFrame, VerificationType};

    fn code(max_stack: u16, max_locals: u16, bytes: Vec<u8>) -> CodeAttribute {
        CodeAttribute::new(max_stack, max_locals, bytes)
    }

    fn getter_pool() -> (ConstantPool, [u8; 2]) {
        let mut pool = ConstantPool::new();
        let index = pool.add_field_ref("A", "x", "J").unwrap();
        (pool, index.to_be_bytes())
    }

    #[test]
    fn test_long_getter() {
        let (pool, [h, l]) = getter_pool();
        let body = code(2, 1, vec![ALOAD_0, GETFIELD, h, l, LRETURN]);
        assert_eq!(verify(&pool, &body, "()J", false, None), Ok(()));
    }

    #[test]
    fn test_max_stack_too_small() {
        let (pool, [h, l]) = getter_pool();
        let body = code(1, 1, vec![ALOAD_0, GETFIELD, h, l, LRETURN]);
        assert!(matches!(
            verify(&pool, &body, "()J", false, None),
            Err(CodeVerifyError::StackOverflow { pc: 1, depth: 2, max_stack: 1 })
        ));
    }

    #[test]
    fn test_wrong_return() {
        let (pool, [h, l]) = getter_pool();
        let body = code(2, 1, vec![ALOAD_0, GETFIELD, h, l, LRETURN]);
        assert!(matches!(
            verify(&pool, &body, "()I", false, None),
            Err(CodeVerifyError::ReturnMismatch { expected: "ireturn", found: "lreturn", .. })
        ));
    }

    #[test]
    fn test_parameters_exceed_locals() {
        let pool = ConstantPool::new();
        let body = code(0, 2, vec![RETURN]);
        assert_eq!(
            verify(&pool, &body, "(D)V", false, None),
            Err(CodeVerifyError::ParametersExceedLocals { needed: 3, max_locals: 2 })
        );
    }

    #[test]
    fn test_local_out_of_range() {
        let pool = ConstantPool::new();
        let body = code(1, 1, vec![ALOAD_1, ARETURN]);
        assert!(matches!(
            verify(&pool, &body, "()Ljava/lang/Object;", false, None),
            Err(CodeVerifyError::LocalOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_falls_off_end() {
        let pool = ConstantPool::new();
        let body = code(1, 1, vec![ALOAD_0]);
        assert_eq!(verify(&pool, &body, "()V", false, None), Err(CodeVerifyError::FallsOffEnd));
    }

    #[test]
    fn test_branch_needs_frame() {
        let pool = ConstantPool::new();
        let body = code(1, 2, vec![ALOAD_1, IFNONNULL, 0, 3, RETURN]);
        assert_eq!(
            verify(&pool, &body, "(Ljava/lang/Object;)V", false, None),
            Err(CodeVerifyError::MissingFrame { pc: 4 })
        );

        let table = StackMapTable {
            frames: vec![StackMapFrame::Full {
                offset_delta: 4,
                locals: vec![VerificationType::Top, VerificationType::Top],
                stack: vec![],
            }],
        };
        assert_eq!(verify(&pool, &body, "(Ljava/lang/Object;)V", false, Some(&table)), Ok(()));
    }

    #[test]
    fn test_frame_stack_mismatch() {
        let pool = ConstantPool::new();
        let body = code(2, 2, vec![ALOAD_1, DUP, IFNONNULL, 0, 4, ATHROW, RETURN]);
        let table = StackMapTable {
            frames: vec![StackMapFrame::Full { offset_delta: 6, locals: vec![], stack: vec![] }],
        };
        // one reference is still on the stack at the merge point
        assert_eq!(
            verify(&pool, &body, "(Ljava/lang/Object;)V", false, Some(&table)),
            Err(CodeVerifyError::FrameStackMismatch { offset: 6, declared: 0, simulated: 1 })
        );
    }

    #[test]
    fn test_unsupported_opcode() {
        let pool = ConstantPool::new();
        let body = code(1, 1, vec![0x00, RETURN]);
        assert_eq!(
            verify(&pool, &body, "()V", false, None),
            Err(CodeVerifyError::UnsupportedOpcode { pc: 0, opcode: 0 })
        );
    }
}
