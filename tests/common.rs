// Common test utilities

#![allow(dead_code)]

use getset::codegen::attribute::{find_attribute, CodeAttribute};
use getset::codegen::defs::attribute_names;
use getset::codegen::frame::StackMapTable;
use getset::codegen::method::MethodInfo;
use getset::codegen::{ClassFile, ConstantPool};
use getset::Config;

/// Compile a source string with the default configuration and decode the result
pub fn compile_class(source: &str) -> ClassFile {
    let bytes = getset::compile(source, Some("Test.gs"), &Config::default()).expect("compile failed");
    ClassFile::parse(&bytes).expect("output does not decode")
}

/// Source for `>> pkg1`, the given class header and attribute lines
pub fn source_of(header: &str, attributes: &[&str]) -> String {
    let mut source = format!(">> pkg1\n{}\n", header);
    for line in attributes {
        source.push_str(line);
        source.push('\n');
    }
    source
}

pub fn method<'a>(class_file: &'a ClassFile, name: &str, descriptor: &str) -> &'a MethodInfo {
    class_file
        .find_method(name, descriptor)
        .unwrap_or_else(|| panic!("missing method {}{}", name, descriptor))
}

pub fn code_of(class_file: &ClassFile, name: &str, descriptor: &str) -> CodeAttribute {
    let method = method(class_file, name, descriptor);
    let code = find_attribute(&method.attributes, &class_file.constant_pool, attribute_names::CODE)
        .expect("method has no Code attribute");
    CodeAttribute::parse(&code.info).expect("malformed Code attribute")
}

pub fn stack_map_of(class_file: &ClassFile, code: &CodeAttribute) -> Option<StackMapTable> {
    find_attribute(&code.attributes, &class_file.constant_pool, attribute_names::STACK_MAP_TABLE)
        .map(|table| StackMapTable::parse(&table.info).expect("malformed StackMapTable"))
}

/// Text of a `Signature`-shaped attribute (a single constant pool index)
pub fn signature_in<'a>(
    pool: &'a ConstantPool,
    attributes: &[getset::codegen::attribute::AttributeInfo],
) -> Option<&'a str> {
    let attribute = find_attribute(attributes, pool, attribute_names::SIGNATURE)?;
    match attribute.info.as_slice() {
        [high, low] => pool.utf8(u16::from_be_bytes([*high, *low])),
        _ => None,
    }
}

pub fn class_signature(class_file: &ClassFile) -> Option<&str> {
    signature_in(&class_file.constant_pool, &class_file.attributes)
}

pub fn field_signature<'a>(class_file: &'a ClassFile, name: &str) -> Option<&'a str> {
    let field = class_file.find_field(name).unwrap_or_else(|| panic!("missing field {}", name));
    signature_in(&class_file.constant_pool, &field.attributes)
}

pub fn method_signature<'a>(class_file: &'a ClassFile, name: &str, descriptor: &str) -> Option<&'a str> {
    signature_in(&class_file.constant_pool, &method(class_file, name, descriptor).attributes)
}

pub fn field_descriptor<'a>(class_file: &'a ClassFile, name: &str) -> &'a str {
    let field = class_file.find_field(name).unwrap_or_else(|| panic!("missing field {}", name));
    class_file.constant_pool.utf8(field.descriptor_index).expect("field descriptor")
}

/// `(name, descriptor)` of every method, in class file order
pub fn method_names(class_file: &ClassFile) -> Vec<(String, String)> {
    class_file
        .methods
        .iter()
        .map(|m| {
            (
                class_file.constant_pool.utf8(m.name_index).unwrap_or_default().to_string(),
                class_file.constant_pool.utf8(m.descriptor_index).unwrap_or_default().to_string(),
            )
        })
        .collect()
}
