//! Class assembler
//!
//! Builds the [`ClassModel`] of an accessor class: a default constructor, then
//! for each attribute a private field with a getter and a setter. The builder
//! is consumed by [`ClassAssembler::finish`].

use indexmap::IndexMap;

use crate::common::error::{Error, Result};
use crate::common::names::to_internal_name;
use crate::consts::{JAVA_LANG_OBJECT, NULL_POINTER_EXCEPTION};

use super::bytecode::access_flags::{ACC_PRIVATE, ACC_PUBLIC, ACC_SUPER};
use super::defs::{CONSTRUCTOR_METHOD_NAME, NO_ARG_CONSTRUCTOR_DESCRIPTOR};
use super::descriptor::{getter_descriptor, setter_descriptor, ValueKind};
use super::instruction::{Frame, FrameType, Instruction, Label, MemberRef};
use super::model::{AttributeSpec, ClassModel, FieldModel, MethodModel};
use super::signature::{class_signature, getter_name, getter_signature, setter_name, setter_signature};

/// Extra operand stack taken by `new; dup` on top of `this, value, value`
const NULL_CHECK_EXTRA_STACK: u16 = 3;

pub struct ClassAssembler {
    internal_name: String,
    signature: Option<String>,
    source_file: Option<String>,
    /// Keyed by `(name, descriptor)`; a name may repeat with another type
    fields: IndexMap<(String, String), FieldModel>,
    methods: Vec<MethodModel>,
}

impl ClassAssembler {
    /// Start a class named by its dotted binary name
    pub fn begin(name: &str, type_params: &[String], source_file: Option<&str>) -> Self {
        let mut assembler = Self {
            internal_name: to_internal_name(name),
            signature: class_signature(type_params),
            source_file: source_file.map(str::to_string),
            fields: IndexMap::new(),
            methods: Vec::new(),
        };
        assembler.methods.push(default_constructor());
        log::debug!("begin class {} (signature {:?})", assembler.internal_name, assembler.signature);
        assembler
    }

    /// Add a private field and its accessor pair
    pub fn add_attribute(&mut self, spec: AttributeSpec) -> Result<()> {
        let key = (spec.name.clone(), spec.descriptor.clone());
        if self.fields.contains_key(&key) {
            return Err(Error::syntax_error(
                0,
                format!("duplicate attribute '{}' of type {}", spec.name, spec.descriptor),
            ));
        }
        let kind = ValueKind::of(&spec.descriptor);
        if spec.constraint.is_some() && kind != ValueKind::Reference {
            return Err(Error::syntax_error(
                0,
                format!("null constraint on primitive attribute '{}'", spec.name),
            ));
        }

        let field = FieldModel {
            access: ACC_PRIVATE,
            name: spec.name,
            descriptor: spec.descriptor,
            signature: spec.signature,
        };
        let getter = self.getter(&field, kind);
        let setter = self.setter(&field, kind, spec.constraint.is_some());
        for accessor in [&getter, &setter] {
            if self.methods.iter().any(|m| m.name == accessor.name && m.descriptor == accessor.descriptor) {
                return Err(Error::syntax_error(
                    0,
                    format!("accessor {}{} clashes with an earlier attribute", accessor.name, accessor.descriptor),
                ));
            }
        }

        log::trace!("attribute {}:{} -> {}, {}", field.name, field.descriptor, getter.name, setter.name);
        self.methods.push(getter);
        self.methods.push(setter);
        self.fields.insert(key, field);
        Ok(())
    }

    /// Freeze the class
    pub fn finish(self) -> ClassModel {
        log::debug!(
            "assembled {} with {} field(s) and {} method(s)",
            self.internal_name,
            self.fields.len(),
            self.methods.len()
        );
        ClassModel {
            access: ACC_PUBLIC | ACC_SUPER,
            internal_name: self.internal_name,
            super_name: JAVA_LANG_OBJECT.to_string(),
            signature: self.signature,
            source_file: self.source_file,
            fields: self.fields.into_values().collect(),
            methods: self.methods,
        }
    }

    fn field_ref(&self, field: &FieldModel) -> MemberRef {
        MemberRef::new(&self.internal_name, &field.name, &field.descriptor)
    }

    /// `aload_0; getfield; <x>return`
    fn getter(&self, field: &FieldModel, kind: ValueKind) -> MethodModel {
        let slots = kind.slots();
        MethodModel {
            access: ACC_PUBLIC,
            name: getter_name(&field.name, &field.descriptor),
            descriptor: getter_descriptor(&field.descriptor),
            signature: getter_signature(field.signature.as_deref()),
            max_stack: slots,
            max_locals: slots,
            instructions: vec![
                Instruction::LoadLocal { kind: ValueKind::Reference, slot: 0 },
                Instruction::GetField(self.field_ref(field)),
                Instruction::Return(Some(kind)),
            ],
        }
    }

    /// `aload_0; <x>load_1; [null check]; putfield; return`
    fn setter(&self, field: &FieldModel, kind: ValueKind, null_check: bool) -> MethodModel {
        let slots = kind.slots();
        let mut instructions = vec![
            Instruction::LoadLocal { kind: ValueKind::Reference, slot: 0 },
            Instruction::LoadLocal { kind, slot: 1 },
        ];

        let extra_stack = if null_check {
            let merge = Label(0);
            let this_and_value = vec![
                FrameType::Object(self.internal_name.clone()),
                FrameType::for_descriptor(&field.descriptor),
            ];
            instructions.extend([
                Instruction::Dup,
                Instruction::IfNonNull(merge),
                Instruction::New(NULL_POINTER_EXCEPTION.to_string()),
                Instruction::Dup,
                Instruction::InvokeSpecial(MemberRef::new(
                    NULL_POINTER_EXCEPTION,
                    CONSTRUCTOR_METHOD_NAME,
                    NO_ARG_CONSTRUCTOR_DESCRIPTOR,
                )),
                Instruction::Throw,
                Instruction::Label(merge),
                Instruction::Frame(Frame { locals: this_and_value.clone(), stack: this_and_value }),
            ]);
            NULL_CHECK_EXTRA_STACK
        } else {
            1
        };

        instructions.push(Instruction::PutField(self.field_ref(field)));
        instructions.push(Instruction::Return(None));

        MethodModel {
            access: ACC_PUBLIC,
            name: setter_name(&field.name),
            descriptor: setter_descriptor(&field.descriptor),
            signature: setter_signature(field.signature.as_deref()),
            max_stack: slots + extra_stack,
            max_locals: slots + 1,
            instructions,
        }
    }
}

/// `aload_0; invokespecial java/lang/Object.<init>()V; return`
fn default_constructor() -> MethodModel {
    MethodModel {
        access: ACC_PUBLIC,
        name: CONSTRUCTOR_METHOD_NAME.to_string(),
        descriptor: NO_ARG_CONSTRUCTOR_DESCRIPTOR.to_string(),
        signature: None,
        max_stack: 1,
        max_locals: 1,
        instructions: vec![
            Instruction::LoadLocal { kind: ValueKind::Reference, slot: 0 },
            Instruction::InvokeSpecial(MemberRef::new(
                JAVA_LANG_OBJECT,
                CONSTRUCTOR_METHOD_NAME,
                NO_ARG_CONSTRUCTOR_DESCRIPTOR,
            )),
            Instruction::Return(None),
        ],
    }
}
