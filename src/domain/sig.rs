//! Helpers over textual type signatures.
//!
//! A signature is a dotted type name with optional generic arguments and array
//! suffixes, e.g. `java.util.List<java.lang.String>[]`. Resolution works on the
//! erased element type; these helpers peel the decorations off.

/// Number of array dimensions in a signature (`int[][]` → 2).
pub fn array_count(signature: &str) -> u32 {
    let mut count = 0;
    let mut rest = signature.trim_end();
    while let Some(stripped) = rest.strip_suffix("[]") {
        count += 1;
        rest = stripped.trim_end();
    }
    count
}

/// The signature with all array suffixes removed (`int[][]` → `int`).
pub fn element_type(signature: &str) -> &str {
    let mut rest = signature.trim_end();
    while let Some(stripped) = rest.strip_suffix("[]") {
        rest = stripped.trim_end();
    }
    rest
}

/// The signature with its generic argument list removed
/// (`Map<String, Long>` → `Map`).
pub fn erasure(signature: &str) -> &str {
    match signature.find('<') {
        Some(idx) => &signature[..idx],
        None => signature,
    }
}

/// Last dotted segment of the erased signature (`java.util.List` → `List`).
pub fn simple_name(signature: &str) -> &str {
    let erased = erasure(signature);
    match erased.rfind('.') {
        Some(idx) => &erased[idx + 1..],
        None => erased,
    }
}

/// Everything before the last dotted segment (`java.util.List` → `java.util`),
/// empty for unqualified names.
pub fn qualifier(signature: &str) -> &str {
    let erased = erasure(signature);
    match erased.rfind('.') {
        Some(idx) => &erased[..idx],
        None => "",
    }
}
