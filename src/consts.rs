// Source markers of the declaration language

/// Comment line prefix
pub const COMMENT: &str = "#";
/// Package directive marker
pub const PACKAGE: &str = ">>";
/// Import directive marker
pub const IMPORT: &str = "<<";

// Well-known platform names

/// Root of the class hierarchy, as an internal name
pub const JAVA_LANG_OBJECT: &str = "java/lang/Object";
/// Descriptor of the root object type, used as type-variable erasure
pub const JAVA_LANG_OBJECT_DESCRIPTOR: &str = "Ljava/lang/Object;";
/// Package searched for unqualified platform types
pub const JAVA_LANG_PACKAGE: &str = "java.lang";
/// Failure raised by null-rejecting setters
pub const NULL_POINTER_EXCEPTION: &str = "java/lang/NullPointerException";

/// Most array dimensions a descriptor may carry
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Extension written for compiled classes
pub const CLASS_FILE_EXTENSION: &str = "class";

/// Primitive keywords and their descriptors
pub const PRIMITIVE_DESCRIPTORS: &[(&str, char)] = &[
    ("byte", 'B'),
    ("char", 'C'),
    ("double", 'D'),
    ("float", 'F'),
    ("int", 'I'),
    ("long", 'J'),
    ("short", 'S'),
    ("boolean", 'Z'),
];

/// Descriptor character for a primitive keyword
pub fn primitive_descriptor(keyword: &str) -> Option<char> {
    PRIMITIVE_DESCRIPTORS
        .iter()
        .find(|(name, _)| *name == keyword)
        .map(|(_, desc)| *desc)
}
