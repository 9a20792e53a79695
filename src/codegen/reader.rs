//! Class file decoder
//!
//! Reads the bytes produced by the writer (or any well-formed class file) back
//! into [`ClassFile`]. Attribute payloads stay raw; `Code` and
//! `StackMapTable` payloads can be decoded on demand.

use super::attribute::{AttributeInfo, CodeAttribute, ExceptionTableEntry};
use super::bytecode::constant_tags::*;
use super::class::ClassFile;
use super::constpool::{Constant, ConstantPool};
use super::defs::MAGIC;
use super::error::ParseClassError;
use super::field::FieldInfo;
use super::frame::{StackMapFrame, StackMapTable, VerificationType};
use super::method::MethodInfo;
use super::mutf8::decode_modified_utf8;
use super::opcodes::{opcode_name, operand_count, IFNONNULL, NEW};

type ParseResult<T> = Result<T, ParseClassError>;

/// Big-endian cursor over a byte slice
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize) -> ParseResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ParseClassError::UnexpectedEof { offset: self.offset })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> ParseResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> ParseResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> ParseResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> ParseResult<u64> {
        let high = u64::from(self.u32()?);
        let low = u64::from(self.u32()?);
        Ok((high << 32) | low)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}

impl ClassFile {
    /// Decode a complete class file
    pub fn parse(bytes: &[u8]) -> Result<ClassFile, ParseClassError> {
        let mut reader = ByteReader::new(bytes);
        let magic = reader.u32()?;
        if magic != MAGIC {
            return Err(ParseClassError::BadMagic(magic));
        }

        let mut class_file = ClassFile::new();
        class_file.minor_version = reader.u16()?;
        class_file.major_version = reader.u16()?;
        class_file.constant_pool = read_constant_pool(&mut reader)?;
        class_file.access_flags = reader.u16()?;
        class_file.this_class = reader.u16()?;
        class_file.super_class = reader.u16()?;

        let interface_count = reader.u16()?;
        for _ in 0..interface_count {
            class_file.interfaces.push(reader.u16()?);
        }

        let field_count = reader.u16()?;
        for _ in 0..field_count {
            let mut field = FieldInfo::new(reader.u16()?, reader.u16()?, reader.u16()?);
            field.attributes = read_attributes(&mut reader)?;
            class_file.fields.push(field);
        }

        let method_count = reader.u16()?;
        for _ in 0..method_count {
            let mut method = MethodInfo::new(reader.u16()?, reader.u16()?, reader.u16()?);
            method.attributes = read_attributes(&mut reader)?;
            class_file.methods.push(method);
        }

        class_file.attributes = read_attributes(&mut reader)?;
        if reader.remaining() > 0 {
            return Err(ParseClassError::TrailingBytes(reader.remaining()));
        }
        Ok(class_file)
    }
}

fn read_constant_pool(reader: &mut ByteReader) -> ParseResult<ConstantPool> {
    let count = reader.u16()?;
    let mut pool = ConstantPool::new();
    let mut index: u16 = 1;
    while index < count {
        let tag = reader.u8()?;
        let constant = match tag {
            CONSTANT_UTF8 => {
                let len = reader.u16()?;
                let bytes = reader.take(usize::from(len))?;
                Constant::Utf8(decode_modified_utf8(bytes).ok_or(ParseClassError::InvalidUtf8(index))?)
            }
            CONSTANT_INTEGER => Constant::Integer(reader.u32()? as i32),
            CONSTANT_FLOAT => Constant::Float(reader.u32()?),
            CONSTANT_LONG => Constant::Long(reader.u64()? as i64),
            CONSTANT_DOUBLE => Constant::Double(reader.u64()?),
            CONSTANT_CLASS => Constant::Class(reader.u16()?),
            CONSTANT_STRING => Constant::String(reader.u16()?),
            CONSTANT_FIELDREF => Constant::FieldRef(reader.u16()?, reader.u16()?),
            CONSTANT_METHODREF => Constant::MethodRef(reader.u16()?, reader.u16()?),
            CONSTANT_INTERFACEMETHODREF => Constant::InterfaceMethodRef(reader.u16()?, reader.u16()?),
            CONSTANT_NAMEANDTYPE => Constant::NameAndType(reader.u16()?, reader.u16()?),
            CONSTANT_METHODHANDLE => Constant::MethodHandle(reader.u8()?, reader.u16()?),
            CONSTANT_METHODTYPE => Constant::MethodType(reader.u16()?),
            CONSTANT_DYNAMIC => Constant::Dynamic(reader.u16()?, reader.u16()?),
            CONSTANT_INVOKEDYNAMIC => Constant::InvokeDynamic(reader.u16()?, reader.u16()?),
            CONSTANT_MODULE => Constant::Module(reader.u16()?),
            CONSTANT_PACKAGE => Constant::Package(reader.u16()?),
            _ => return Err(ParseClassError::UnknownConstantTag { tag, index }),
        };
        let width = constant.width();
        pool.push(constant).map_err(|_| ParseClassError::InvalidConstantIndex(index))?;
        index = index.saturating_add(width);
    }
    if index != count {
        return Err(ParseClassError::InvalidConstantIndex(index));
    }
    Ok(pool)
}

fn read_attributes(reader: &mut ByteReader) -> ParseResult<Vec<AttributeInfo>> {
    let count = reader.u16()?;
    let mut attributes = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let name_index = reader.u16()?;
        let len = reader.u32()? as usize;
        attributes.push(AttributeInfo::new(name_index, reader.take(len)?.to_vec()));
    }
    Ok(attributes)
}

fn malformed(attribute: &'static str) -> impl Fn(ParseClassError) -> ParseClassError {
    move |err| ParseClassError::MalformedAttribute { attribute, reason: err.to_string() }
}

impl CodeAttribute {
    /// Decode the payload of a `Code` attribute
    pub fn parse(info: &[u8]) -> Result<CodeAttribute, ParseClassError> {
        let parse = || -> ParseResult<CodeAttribute> {
            let mut reader = ByteReader::new(info);
            let max_stack = reader.u16()?;
            let max_locals = reader.u16()?;
            let code_length = reader.u32()? as usize;
            let mut code = CodeAttribute::new(max_stack, max_locals, reader.take(code_length)?.to_vec());
            let exception_count = reader.u16()?;
            for _ in 0..exception_count {
                code.exception_table.push(ExceptionTableEntry {
                    start_pc: reader.u16()?,
                    end_pc: reader.u16()?,
                    handler_pc: reader.u16()?,
                    catch_type: reader.u16()?,
                });
            }
            code.attributes = read_attributes(&mut reader)?;
            if reader.remaining() > 0 {
                return Err(ParseClassError::TrailingBytes(reader.remaining()));
            }
            Ok(code)
        };
        parse().map_err(malformed("Code"))
    }
}

impl StackMapTable {
    /// Decode the payload of a `StackMapTable` attribute
    pub fn parse(info: &[u8]) -> Result<StackMapTable, ParseClassError> {
        let parse = || -> ParseResult<StackMapTable> {
            let mut reader = ByteReader::new(info);
            let count = reader.u16()?;
            let mut table = StackMapTable::new();
            for _ in 0..count {
                table.frames.push(read_frame(&mut reader)?);
            }
            if reader.remaining() > 0 {
                return Err(ParseClassError::TrailingBytes(reader.remaining()));
            }
            Ok(table)
        };
        parse().map_err(malformed("StackMapTable"))
    }
}

fn read_frame(reader: &mut ByteReader) -> ParseResult<StackMapFrame> {
    let frame_type = reader.u8()?;
    let frame = match frame_type {
        0..=63 => StackMapFrame::Same { offset_delta: u16::from(frame_type) },
        64..=127 => StackMapFrame::SameLocals1StackItem {
            offset_delta: u16::from(frame_type - 64),
            stack: read_verification_type(reader)?,
        },
        247 => StackMapFrame::SameLocals1StackItem {
            offset_delta: reader.u16()?,
            stack: read_verification_type(reader)?,
        },
        248..=250 => StackMapFrame::Chop { k: 251 - frame_type, offset_delta: reader.u16()? },
        251 => StackMapFrame::Same { offset_delta: reader.u16()? },
        252..=254 => {
            let offset_delta = reader.u16()?;
            let locals = (0..frame_type - 251)
                .map(|_| read_verification_type(reader))
                .collect::<ParseResult<Vec<_>>>()?;
            StackMapFrame::Append { offset_delta, locals }
        }
        255 => {
            let offset_delta = reader.u16()?;
            let local_count = reader.u16()?;
            let locals = (0..local_count)
                .map(|_| read_verification_type(reader))
                .collect::<ParseResult<Vec<_>>>()?;
            let stack_count = reader.u16()?;
            let stack = (0..stack_count)
                .map(|_| read_verification_type(reader))
                .collect::<ParseResult<Vec<_>>>()?;
            StackMapFrame::Full { offset_delta, locals, stack }
        }
        _ => {
            return Err(ParseClassError::MalformedAttribute {
                attribute: "StackMapTable",
                reason: format!("reserved frame type {}", frame_type),
            })
        }
    };
    Ok(frame)
}

fn read_verification_type(reader: &mut ByteReader) -> ParseResult<VerificationType> {
    let tag = reader.u8()?;
    let verification_type = match tag {
        0 => VerificationType::Top,
        1 => VerificationType::Integer,
        2 => VerificationType::Float,
        3 => VerificationType::Double,
        4 => VerificationType::Long,
        5 => VerificationType::Null,
        6 => VerificationType::UninitializedThis,
        7 => VerificationType::Object(reader.u16()?),
        8 => VerificationType::Uninitialized(reader.u16()?),
        _ => {
            return Err(ParseClassError::MalformedAttribute {
                attribute: "StackMapTable",
                reason: format!("unknown verification type {}", tag),
            })
        }
    };
    Ok(verification_type)
}

/// Render a code array as one line per instruction, javap style
pub fn disassemble(code: &[u8], constant_pool: &ConstantPool) -> Result<Vec<String>, ParseClassError> {
    let mut reader = ByteReader::new(code);
    let mut lines = Vec::new();
    while reader.remaining() > 0 {
        let pc = reader.offset;
        let opcode = reader.u8()?;
        let (name, operands) = opcode_name(opcode)
            .zip(operand_count(opcode))
            .ok_or_else(|| ParseClassError::MalformedAttribute {
                attribute: "Code",
                reason: format!("unsupported opcode 0x{:02x} at {}", opcode, pc),
            })?;
        let line = match (opcode, operands) {
            (_, 0) => name.to_string(),
            (_, 1) => format!("{} {}", name, reader.u8()?),
            (IFNONNULL, _) => {
                let offset = reader.u16()? as i16;
                format!("{} {}", name, pc as i64 + i64::from(offset))
            }
            _ => {
                let index = reader.u16()?;
                let target = match opcode {
                    NEW => constant_pool.class_name(index).map(str::to_string),
                    _ => constant_pool
                        .member_ref(index)
                        .map(|(owner, member, descriptor)| format!("{}.{}:{}", owner, member, descriptor)),
                };
                match target {
                    Some(target) => format!("{} #{} // {}", name, index, target),
                    None => format!("{} #{}", name, index),
                }
            }
        };
        lines.push(format!("{:>4}: {}", pc, line));
    }
    Ok(lines)
}
