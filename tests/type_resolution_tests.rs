mod common;

use common::*;
use getset::common::{ImportTable, TypeCatalog, TypeResolver};
use getset::{compile, Config, Error};

fn resolve(expr: &str, imports: &[&str], params: &[&str]) -> getset::Result<(String, Option<String>)> {
    let imports: ImportTable = imports.iter().copied().collect();
    let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    let resolver = TypeResolver::new(&imports, &params, TypeCatalog::platform());
    resolver.resolve(expr, true).map(|resolved| (resolved.descriptor, resolved.signature))
}

#[test]
fn list_of_integer_in_non_generic_class() {
    let class_file = compile_class(">> pkg1\n<< java.util.List\nHolder\nlist : List<Integer>\n");
    assert_eq!(field_descriptor(&class_file, "list"), "Ljava/util/List;");
    assert_eq!(field_signature(&class_file, "list"), Some("Ljava/util/List<Ljava/lang/Integer;>;"));
}

#[test]
fn fully_qualified_names_need_no_import() {
    let class_file = compile_class(&source_of("DateHolder", &["date : java.util.Date"]));
    assert_eq!(field_descriptor(&class_file, "date"), "Ljava/util/Date;");

    let class_file = compile_class(&source_of("IntArrayHolder", &["valueArray : int[][][]"]));
    assert_eq!(field_descriptor(&class_file, "valueArray"), "[[[I");
}

#[test]
fn string_to_integer_map() {
    let (descriptor, signature) = resolve("Map<String,Integer>", &["java.util.Map"], &[]).unwrap();
    assert_eq!(descriptor, "Ljava/util/Map;");
    assert_eq!(signature.as_deref(), Some("Ljava/util/Map<Ljava/lang/String;Ljava/lang/Integer;>;"));
}

#[test]
fn type_variable_arrays_and_arguments() {
    let (descriptor, signature) = resolve("T[][]", &[], &["T"]).unwrap();
    assert_eq!(descriptor, "[[Ljava/lang/Object;");
    assert_eq!(signature.as_deref(), Some("[[TT;"));

    let (descriptor, signature) = resolve("java.util.Map<K, java.util.List<V>>[]", &[], &["K", "V"]).unwrap();
    assert_eq!(descriptor, "[Ljava/util/Map;");
    assert_eq!(signature.as_deref(), Some("[Ljava/util/Map<TK;Ljava/util/List<TV;>;>;"));
}

#[test]
fn import_shadows_java_lang() {
    let config = Config::default().with_known_type("com.acme.String");
    let bytes = compile(">> pkg1\n<< com.acme.String\nHolder\nname : String\n", None, &config).unwrap();
    let class_file = getset::codegen::ClassFile::parse(&bytes).unwrap();
    assert_eq!(field_descriptor(&class_file, "name"), "Lcom/acme/String;");
}

#[test]
fn known_types_extend_the_catalog() {
    let source = ">> pkg1\nHolder\nwidget : com.acme.Widget\n";
    assert!(matches!(
        compile(source, None, &Config::default()),
        Err(Error::UnresolvedType { line: 3, .. })
    ));

    let config = Config::default().with_known_type("com.acme.Widget");
    let bytes = compile(source, None, &config).unwrap();
    let class_file = getset::codegen::ClassFile::parse(&bytes).unwrap();
    assert_eq!(field_descriptor(&class_file, "widget"), "Lcom/acme/Widget;");
}

#[test]
fn custom_catalog_is_the_only_universe() {
    let mut catalog = TypeCatalog::new();
    catalog.insert("java.lang.String");
    let imports = ImportTable::new();
    let resolver = TypeResolver::new(&imports, &[], &catalog);

    assert_eq!(resolver.resolve("String", false).unwrap().descriptor, "Ljava/lang/String;");
    assert!(resolver.resolve("Integer", false).is_err());
}

#[test]
fn primitive_generic_argument_is_rejected() {
    let err = resolve("List<int>", &["java.util.List"], &[]).unwrap_err();
    assert!(matches!(err, Error::PrimitiveTypeArgument { ref expr, .. } if expr == "int"));
}

#[test]
fn malformed_expressions_are_unresolved() {
    for expr in ["List<>", "Map<,String>", "List<String", "Str[]ing", "T<String>", "Nope"] {
        let err = resolve(expr, &["java.util.List", "java.util.Map"], &["T"]).unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { .. }), "{} gave {:?}", expr, err);
    }
}
