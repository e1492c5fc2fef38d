//! Java naming conventions.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// `page_size` → `pageSize`, `PagedExpand` → `pagedExpand`.
pub fn lower_camel(name: &str) -> String {
    name.to_lower_camel_case()
}

/// Reserved words and literals that cannot name a Java method or variable.
const JAVA_RESERVED: &[&str] = &[
    "_", "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while",
];

pub fn is_java_reserved(name: &str) -> bool {
    JAVA_RESERVED.contains(&name)
}

/// Lower camel case, with a trailing `_` when the result is reserved:
/// `package` → `package_`, `Import` → `import_`.
pub fn java_identifier(name: &str) -> String {
    let camel = lower_camel(name);
    if is_java_reserved(&camel) {
        format!("{camel}_")
    } else {
        camel
    }
}

/// `page_size` → `PageSize`.
pub fn upper_camel(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Java's `String.hashCode()`: `s[0]*31^(n-1) + ... + s[n-1]` over UTF-16
/// code units with 32-bit wrapping arithmetic.
pub fn java_hash_code(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Builder setter for a proto field, e.g. `setPageSize`.
pub fn setter(field: &str) -> String {
    format!("set{}", upper_camel(field))
}

pub fn adder_all(field: &str) -> String {
    format!("addAll{}", upper_camel(field))
}

pub fn putter_all(field: &str) -> String {
    format!("putAll{}", upper_camel(field))
}
