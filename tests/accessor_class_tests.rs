mod common;

use common::*;
use getset::codegen::bytecode::access_flags::{ACC_PRIVATE, ACC_PUBLIC, ACC_SUPER};
use getset::codegen::frame::{StackMapFrame, VerificationType};
use getset::codegen::opcodes::*;

#[test]
fn nothing_has_only_a_default_constructor() {
    let class_file = compile_class(">> pkg1\nNothing\n");

    assert_eq!(class_file.this_class_name(), Some("pkg1/Nothing"));
    assert_eq!(class_file.super_class_name(), Some("java/lang/Object"));
    assert_eq!(class_file.access_flags, ACC_PUBLIC | ACC_SUPER);
    assert_eq!(class_file.major_version, 51);
    assert!(class_file.fields.is_empty());
    assert!(class_file.interfaces.is_empty());
    assert_eq!(method_names(&class_file), vec![("<init>".to_string(), "()V".to_string())]);
    assert_eq!(class_signature(&class_file), None);

    let init = code_of(&class_file, "<init>", "()V");
    assert_eq!((init.max_stack, init.max_locals), (1, 1));
    assert_eq!(init.code[0], ALOAD_0);
    assert_eq!(init.code[1], INVOKESPECIAL);
    assert_eq!(init.code[4], RETURN);
    let [high, low] = [init.code[2], init.code[3]];
    assert_eq!(
        class_file.constant_pool.member_ref(u16::from_be_bytes([high, low])),
        Some(("java/lang/Object", "<init>", "()V"))
    );
}

#[test]
fn int_holder_has_field_and_accessors() {
    let class_file = compile_class(&source_of("IntHolder", &["value : int"]));

    let field = class_file.find_field("value").unwrap();
    assert_eq!(field.access_flags, ACC_PRIVATE);
    assert_eq!(field_descriptor(&class_file, "value"), "I");
    assert_eq!(field_signature(&class_file, "value"), None);

    assert_eq!(
        method_names(&class_file),
        vec![
            ("<init>".to_string(), "()V".to_string()),
            ("getValue".to_string(), "()I".to_string()),
            ("setValue".to_string(), "(I)V".to_string()),
        ]
    );
    assert_eq!(method(&class_file, "getValue", "()I").access_flags, ACC_PUBLIC);

    let getter = code_of(&class_file, "getValue", "()I");
    assert_eq!((getter.max_stack, getter.max_locals), (1, 1));
    assert_eq!(getter.code.len(), 5);
    assert_eq!([getter.code[0], getter.code[1], getter.code[4]], [ALOAD_0, GETFIELD, IRETURN]);
    let field_ref = u16::from_be_bytes([getter.code[2], getter.code[3]]);
    assert_eq!(
        class_file.constant_pool.member_ref(field_ref),
        Some(("pkg1/IntHolder", "value", "I"))
    );

    let setter = code_of(&class_file, "setValue", "(I)V");
    assert_eq!((setter.max_stack, setter.max_locals), (2, 2));
    assert_eq!(setter.code.len(), 6);
    assert_eq!([setter.code[0], setter.code[1], setter.code[2], setter.code[5]], [ALOAD_0, ILOAD_1, PUTFIELD, RETURN]);
    assert!(stack_map_of(&class_file, &setter).is_none());
}

#[test]
fn primitive_holder_overloads_one_name_per_type() {
    let class_file = compile_class(&source_of(
        "PrimitiveHolder",
        &[
            "value : int",
            "value : boolean",
            "value : byte",
            "value : short",
            "value : char",
            "value : long",
            "value : float",
            "value : double",
        ],
    ));
    assert_eq!(class_file.methods.len(), 17);

    let pool = &class_file.constant_pool;
    let fields: Vec<(&str, &str)> = class_file
        .fields
        .iter()
        .map(|f| (pool.utf8(f.name_index).unwrap(), pool.utf8(f.descriptor_index).unwrap()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("value", "I"),
            ("value", "Z"),
            ("value", "B"),
            ("value", "S"),
            ("value", "C"),
            ("value", "J"),
            ("value", "F"),
            ("value", "D"),
        ]
    );

    let cases = [
        ("I", "getValue", ILOAD_1, IRETURN, 1),
        ("Z", "isValue", ILOAD_1, IRETURN, 1),
        ("B", "getValue", ILOAD_1, IRETURN, 1),
        ("S", "getValue", ILOAD_1, IRETURN, 1),
        ("C", "getValue", ILOAD_1, IRETURN, 1),
        ("J", "getValue", LLOAD_1, LRETURN, 2),
        ("F", "getValue", FLOAD_1, FRETURN, 1),
        ("D", "getValue", DLOAD_1, DRETURN, 2),
    ];
    for (descriptor, getter_name, load, ret, slots) in cases {
        let getter = code_of(&class_file, getter_name, &format!("(){}", descriptor));
        assert_eq!(getter.code[4], ret, "return opcode for {}", descriptor);
        assert_eq!((getter.max_stack, getter.max_locals), (slots, slots), "getter sizes for {}", descriptor);
        let field_ref = u16::from_be_bytes([getter.code[2], getter.code[3]]);
        assert_eq!(pool.member_ref(field_ref), Some(("pkg1/PrimitiveHolder", "value", descriptor)));

        let setter = code_of(&class_file, "setValue", &format!("({})V", descriptor));
        assert_eq!(setter.code[1], load, "load opcode for {}", descriptor);
        assert_eq!((setter.max_stack, setter.max_locals), (slots + 1, slots + 1), "setter sizes for {}", descriptor);
        let field_ref = u16::from_be_bytes([setter.code[3], setter.code[4]]);
        assert_eq!(pool.member_ref(field_ref), Some(("pkg1/PrimitiveHolder", "value", descriptor)));
    }
    assert!(class_file.find_method("getValue", "()Z").is_none());
}

#[test]
fn object_holder_resolves_imports_and_java_lang() {
    let class_file = compile_class(">> pkg1\n<< java.util.Date\nObjectHolder\ndate : Date\nstring : String\n");

    assert_eq!(class_file.methods.len(), 5);
    assert_eq!(field_descriptor(&class_file, "date"), "Ljava/util/Date;");
    assert_eq!(field_descriptor(&class_file, "string"), "Ljava/lang/String;");
    assert_eq!(field_signature(&class_file, "date"), None);

    let getter = code_of(&class_file, "getString", "()Ljava/lang/String;");
    assert_eq!(getter.code[4], ARETURN);
    let setter = code_of(&class_file, "setDate", "(Ljava/util/Date;)V");
    assert_eq!(setter.code[1], ALOAD_1);
    assert_eq!((setter.max_stack, setter.max_locals), (2, 2));
}

#[test]
fn generic_object_holder_keeps_signatures() {
    let class_file = compile_class(
        ">> pkg1\n<< java.util.List\n<< java.util.Map\nGenericObjectHolder\n\
         string : String\nlist : List<Integer>\nmap : Map<String,List<Integer>>\n",
    );
    assert_eq!(class_file.methods.len(), 7);
    assert_eq!(class_signature(&class_file), None);

    assert_eq!(field_descriptor(&class_file, "list"), "Ljava/util/List;");
    assert_eq!(field_signature(&class_file, "list"), Some("Ljava/util/List<Ljava/lang/Integer;>;"));
    assert_eq!(
        method_signature(&class_file, "getList", "()Ljava/util/List;"),
        Some("()Ljava/util/List<Ljava/lang/Integer;>;")
    );
    assert_eq!(
        method_signature(&class_file, "setList", "(Ljava/util/List;)V"),
        Some("(Ljava/util/List<Ljava/lang/Integer;>;)V")
    );

    assert_eq!(field_descriptor(&class_file, "map"), "Ljava/util/Map;");
    assert_eq!(
        field_signature(&class_file, "map"),
        Some("Ljava/util/Map<Ljava/lang/String;Ljava/util/List<Ljava/lang/Integer;>;>;")
    );
    assert_eq!(method_signature(&class_file, "getString", "()Ljava/lang/String;"), None);
}

#[test]
fn basic_generic_holder_uses_type_variables() {
    let class_file = compile_class(
        ">> pkg1\n<< java.util.List\nBasicGenericHolder<L, T>\nthing : T\nlist : List<L>\n",
    );

    assert_eq!(
        class_signature(&class_file),
        Some("<L:Ljava/lang/Object;T:Ljava/lang/Object;>Ljava/lang/Object;")
    );
    assert_eq!(field_descriptor(&class_file, "thing"), "Ljava/lang/Object;");
    assert_eq!(field_signature(&class_file, "thing"), Some("TT;"));
    assert_eq!(method_signature(&class_file, "getThing", "()Ljava/lang/Object;"), Some("()TT;"));
    assert_eq!(method_signature(&class_file, "setThing", "(Ljava/lang/Object;)V"), Some("(TT;)V"));
    assert_eq!(field_signature(&class_file, "list"), Some("Ljava/util/List<TL;>;"));
    assert_eq!(method_signature(&class_file, "getList", "()Ljava/util/List;"), Some("()Ljava/util/List<TL;>;"));
}

#[test]
fn not_null_setter_throws_before_store() {
    let class_file = compile_class(&source_of("NotNull", &["string ! String"]));
    let setter = code_of(&class_file, "setString", "(Ljava/lang/String;)V");

    assert_eq!((setter.max_stack, setter.max_locals), (4, 2));
    assert_eq!(
        [setter.code[0], setter.code[1], setter.code[2], setter.code[3]],
        [ALOAD_0, ALOAD_1, DUP, IFNONNULL]
    );
    // the branch skips to the putfield at pc 14
    assert_eq!(i16::from_be_bytes([setter.code[4], setter.code[5]]), 11);
    assert_eq!(setter.code[6], NEW);
    let exception = u16::from_be_bytes([setter.code[7], setter.code[8]]);
    assert_eq!(class_file.constant_pool.class_name(exception), Some("java/lang/NullPointerException"));
    assert_eq!([setter.code[9], setter.code[10], setter.code[13]], [DUP, INVOKESPECIAL, ATHROW]);
    assert_eq!([setter.code[14], setter.code[17]], [PUTFIELD, RETURN]);

    let table = stack_map_of(&class_file, &setter).expect("null check needs a frame");
    assert_eq!(table.frames.len(), 1);
    let StackMapFrame::Full { offset_delta, locals, stack } = &table.frames[0] else {
        panic!("expected a full frame, got {:?}", table.frames[0]);
    };
    assert_eq!(*offset_delta, 14);
    assert_eq!(locals, stack);
    let names: Vec<&str> = locals
        .iter()
        .map(|vt| match vt {
            VerificationType::Object(index) => class_file.constant_pool.class_name(*index).unwrap(),
            other => panic!("unexpected verification type {:?}", other),
        })
        .collect();
    assert_eq!(names, vec!["pkg1/NotNull", "java/lang/String"]);

    // the getter is untouched by the constraint
    let getter = code_of(&class_file, "getString", "()Ljava/lang/String;");
    assert_eq!(getter.code.len(), 5);
}

#[test]
fn never_null_setter_matches_not_null() {
    let not_null = compile_class(&source_of("Holder", &["string ! String"]));
    let never_null = compile_class(&source_of("Holder", &["string !! String"]));

    let descriptor = "(Ljava/lang/String;)V";
    assert_eq!(code_of(&not_null, "setString", descriptor), code_of(&never_null, "setString", descriptor));
}

#[test]
fn never_null_array_holder() {
    let class_file = compile_class(&source_of("NeverNullArray", &["strings !! String[][][]", "ints !! int[][]"]));
    assert_eq!(class_file.methods.len(), 5);
    assert_eq!(field_descriptor(&class_file, "strings"), "[[[Ljava/lang/String;");
    assert_eq!(field_descriptor(&class_file, "ints"), "[[I");

    let setter = code_of(&class_file, "setInts", "([[I)V");
    assert_eq!([setter.code[1], setter.code[2], setter.code[3]], [ALOAD_1, DUP, IFNONNULL]);
    let table = stack_map_of(&class_file, &setter).unwrap();
    let StackMapFrame::Full { locals, .. } = &table.frames[0] else {
        panic!("expected a full frame");
    };
    let VerificationType::Object(index) = locals[1] else {
        panic!("array parameter should be an object type");
    };
    assert_eq!(class_file.constant_pool.class_name(index), Some("[[I"));

    let getter = code_of(&class_file, "getStrings", "()[[[Ljava/lang/String;");
    assert_eq!(getter.code[4], ARETURN);
}

#[test]
fn default_package_class() {
    let class_file = compile_class(">>\nTop\nname : String\n");
    assert_eq!(class_file.this_class_name(), Some("Top"));
}

#[test]
fn wide_setter_with_unicode_name() {
    let class_file = compile_class(&source_of("Wide", &["über : double"]));
    let setter = code_of(&class_file, "setÜber", "(D)V");
    assert_eq!((setter.max_stack, setter.max_locals), (3, 3));
}

#[test]
fn null_checked_type_variable_and_generic_fields() {
    let class_file = compile_class(">> pkg1\n<< java.util.List\nBox<T>\nx ! T\ny !! List<T>\n");

    assert_eq!(method_signature(&class_file, "setX", "(Ljava/lang/Object;)V"), Some("(TT;)V"));
    assert_eq!(method_signature(&class_file, "setY", "(Ljava/util/List;)V"), Some("(Ljava/util/List<TT;>;)V"));

    for (setter, descriptor, parameter) in [
        ("setX", "(Ljava/lang/Object;)V", "java/lang/Object"),
        ("setY", "(Ljava/util/List;)V", "java/util/List"),
    ] {
        let code = code_of(&class_file, setter, descriptor);
        assert_eq!((code.max_stack, code.max_locals), (4, 2));
        assert_eq!([code.code[2], code.code[3]], [DUP, IFNONNULL]);

        let table = stack_map_of(&class_file, &code).expect("null check needs a frame");
        let StackMapFrame::Full { locals, stack, .. } = &table.frames[0] else {
            panic!("expected a full frame in {}", setter);
        };
        assert_eq!(locals, stack);
        let names: Vec<&str> = locals
            .iter()
            .map(|vt| match vt {
                VerificationType::Object(index) => class_file.constant_pool.class_name(*index).unwrap(),
                other => panic!("unexpected verification type {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["pkg1/Box", parameter]);
    }
    getset::verify::verify(&class_file).unwrap();
}
