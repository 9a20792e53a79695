//! JVM Signature attribute strings and accessor naming
//!
//! Generic shapes survive erasure only through `Signature` attributes: the
//! class carries its formal type parameters, each field and accessor carries
//! the generic form of the attribute type when it has one.

use crate::consts::JAVA_LANG_OBJECT_DESCRIPTOR;

/// `<P1:Ljava/lang/Object;P2:Ljava/lang/Object;>Ljava/lang/Object;`, or `None`
/// for a class without type parameters
pub fn class_signature(type_params: &[String]) -> Option<String> {
    if type_params.is_empty() {
        return None;
    }
    let mut signature = String::from("<");
    for param in type_params {
        signature.push_str(param);
        signature.push(':');
        signature.push_str(JAVA_LANG_OBJECT_DESCRIPTOR);
    }
    signature.push('>');
    signature.push_str(JAVA_LANG_OBJECT_DESCRIPTOR);
    Some(signature)
}

/// Upper-case the first character only, leaving the rest untouched
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `is<Name>` for boolean fields, `get<Name>` otherwise
pub fn getter_name(field_name: &str, field_descriptor: &str) -> String {
    let prefix = if field_descriptor == "Z" { "is" } else { "get" };
    format!("{}{}", prefix, capitalize(field_name))
}

pub fn setter_name(field_name: &str) -> String {
    format!("set{}", capitalize(field_name))
}

/// `()<sig>` when the field has a signature
pub fn getter_signature(field_signature: Option<&str>) -> Option<String> {
    field_signature.map(|sig| format!("(){}", sig))
}

/// `(<sig>)V` when the field has a signature
pub fn setter_signature(field_signature: Option<&str>) -> Option<String> {
    field_signature.map(|sig| format!("({})V", sig))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_signature() {
        assert_eq!(class_signature(&[]), None);
        assert_eq!(
            class_signature(&["T".to_string(), "L".to_string()]).as_deref(),
            Some("<T:Ljava/lang/Object;L:Ljava/lang/Object;>Ljava/lang/Object;")
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("value"), "Value");
        assert_eq!(capitalize("xAxis"), "XAxis");
        assert_eq!(capitalize("ßig"), "SSig");
        assert_eq!(capitalize("éclair"), "Éclair");
        assert_eq!(capitalize("_x"), "_x");
    }

    #[test]
    fn test_accessor_names() {
        assert_eq!(getter_name("enabled", "Z"), "isEnabled");
        assert_eq!(getter_name("enabled", "Ljava/lang/Boolean;"), "getEnabled");
        assert_eq!(getter_name("value", "I"), "getValue");
        assert_eq!(setter_name("value"), "setValue");
    }

    #[test]
    fn test_accessor_signatures() {
        assert_eq!(getter_signature(None), None);
        assert_eq!(getter_signature(Some("TT;")).as_deref(), Some("()TT;"));
        assert_eq!(setter_signature(Some("TT;")).as_deref(), Some("(TT;)V"));
    }
}
