//! Name syntax checks shared by the parser and the type resolver

/// Java identifier: a letter, `_` or `$`, followed by letters, digits, `_` or `$`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Dotted sequence of identifiers, e.g. `java.util.List`
pub fn is_qualified_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

/// `java.util.List` -> `java/util/List`
pub fn to_internal_name(qualified_name: &str) -> String {
    qualified_name.replace('.', "/")
}
