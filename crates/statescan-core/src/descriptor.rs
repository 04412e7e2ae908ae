//! Conversion between on-disk type descriptors and canonical dotted class names.
//!
//! A descriptor is a sequence of `[` array markers followed by either a
//! primitive sigil or `L<slash-separated-name>;`. The canonical form is the
//! dotted name with one trailing `[]` per array dimension; primitives and
//! `void` have no canonical name.
//!
//! Conversion is total: malformed input yields `None` rather than panicking,
//! since analysis must stay best-effort on partially readable artifacts.

/// Converts a slash-separated internal class name to its dotted form.
pub fn internal_to_canonical(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Returns the canonical name for a reference or array descriptor, or `None`
/// for a primitive or void descriptor.
pub fn canonical(descriptor: &str) -> Option<String> {
    let (dims, rest) = strip_array_markers(descriptor);
    let base = match rest.chars().next()? {
        'L' => {
            let end = rest.find(';')?;
            internal_to_canonical(&rest[1..end])
        }
        // A bare primitive has no canonical name, but a primitive array
        // does: `int[]` is itself a reference type.
        sigil @ ('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z') if dims > 0 => {
            primitive_name(sigil)?.to_string()
        }
        _ => return None,
    };
    Some(append_dims(base, dims))
}

fn primitive_name(sigil: char) -> Option<&'static str> {
    Some(match sigil {
        'B' => "byte",
        'C' => "char",
        'D' => "double",
        'F' => "float",
        'I' => "int",
        'J' => "long",
        'S' => "short",
        'Z' => "boolean",
        _ => return None,
    })
}

/// Encodes a canonical name back into its on-disk descriptor form, the
/// inverse of [`canonical`]. `None` for inputs `canonical` never produces
/// (e.g. a bare primitive name with no array suffix).
pub fn to_descriptor(canonical_name: &str) -> Option<String> {
    let mut name = canonical_name;
    let mut dims = 0usize;
    while let Some(stripped) = name.strip_suffix("[]") {
        dims += 1;
        name = stripped;
    }

    let base = match name {
        "byte" if dims > 0 => "B".to_string(),
        "char" if dims > 0 => "C".to_string(),
        "double" if dims > 0 => "D".to_string(),
        "float" if dims > 0 => "F".to_string(),
        "int" if dims > 0 => "I".to_string(),
        "long" if dims > 0 => "J".to_string(),
        "short" if dims > 0 => "S".to_string(),
        "boolean" if dims > 0 => "Z".to_string(),
        _ if name.is_empty() => return None,
        _ => format!("L{};", name.replace('.', "/")),
    };

    Some(format!("{}{}", "[".repeat(dims), base))
}

/// Extracts the canonical return type of a method descriptor, or `None` for
/// `void` or a malformed descriptor.
pub fn return_type(method_descriptor: &str) -> Option<String> {
    let close = method_descriptor.find(')')?;
    canonical(&method_descriptor[close + 1..])
}

/// Splits the parenthesized parameter region of a method descriptor into its
/// successive type tokens, honoring array prefixes and primitive/reference
/// disambiguation. Returns `None` on malformed input.
pub fn parameter_types(method_descriptor: &str) -> Option<Vec<String>> {
    let body = method_descriptor
        .strip_prefix('(')
        .and_then(|rest| rest.split(')').next())?;

    let mut out = Vec::new();
    let mut rest = body;
    while !rest.is_empty() {
        let (token, remainder) = take_one_descriptor(rest)?;
        out.push(token);
        rest = remainder;
    }
    Some(out)
}

/// Consumes exactly one field descriptor (honoring leading `[` markers) from
/// the front of `input`, returning its raw token text and the remainder.
fn take_one_descriptor(input: &str) -> Option<(&str, &str)> {
    let bytes = input.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() && bytes[i] == b'[' {
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }
    match bytes[i] {
        b'L' => {
            let end = input[i..].find(';')? + i;
            Some((&input[..=end], &input[end + 1..]))
        }
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => {
            Some((&input[..=i], &input[i + 1..]))
        }
        _ => None,
    }
}

fn strip_array_markers(descriptor: &str) -> (usize, &str) {
    let dims = descriptor.chars().take_while(|&c| c == '[').count();
    (dims, &descriptor[dims..])
}

fn append_dims(mut base: String, dims: usize) -> String {
    for _ in 0..dims {
        base.push_str("[]");
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonical_primitive_is_none() {
        assert_eq!(canonical("I"), None);
        assert_eq!(canonical("V"), None);
    }

    #[test]
    fn primitive_array_has_canonical_name() {
        assert_eq!(canonical("[I"), Some("int[]".to_string()));
        assert_eq!(canonical("[[Z"), Some("boolean[][]".to_string()));
    }

    #[test]
    fn to_descriptor_inverts_canonical() {
        assert_eq!(to_descriptor("java.lang.String").as_deref(), Some("Ljava/lang/String;"));
        assert_eq!(to_descriptor("java.lang.String[][]").as_deref(), Some("[[Ljava/lang/String;"));
        assert_eq!(to_descriptor("int[]").as_deref(), Some("[I"));
    }

    fn internal_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("java.lang.String".to_string()),
            Just("java.util.Map".to_string()),
            Just("com.example.app.Service".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn round_trips_reference_descriptors(name in internal_name(), dims in 0usize..3) {
            let descriptor = format!("{}L{};", "[".repeat(dims), name.replace('.', "/"));
            let canonical_name = canonical(&descriptor).expect("reference descriptor always has a canonical name");
            prop_assert_eq!(to_descriptor(&canonical_name), Some(descriptor));
        }

        #[test]
        fn round_trips_primitive_array_descriptors(dims in 1usize..3) {
            for sigil in ['B', 'C', 'D', 'F', 'I', 'J', 'S', 'Z'] {
                let descriptor = format!("{}{}", "[".repeat(dims), sigil);
                let canonical_name = canonical(&descriptor).expect("primitive array always has a canonical name");
                prop_assert_eq!(to_descriptor(&canonical_name), Some(descriptor));
            }
        }
    }

    #[test]
    fn canonical_reference_type() {
        assert_eq!(
            canonical("Ljava/lang/String;"),
            Some("java.lang.String".to_string())
        );
    }

    #[test]
    fn canonical_array_dimensions() {
        assert_eq!(
            canonical("[[Ljava/lang/String;"),
            Some("java.lang.String[][]".to_string())
        );
        assert_eq!(canonical("[I"), Some("int[]".to_string()));
    }

    #[test]
    fn return_type_void_is_none() {
        assert_eq!(return_type("(I)V"), None);
    }

    #[test]
    fn return_type_reference() {
        assert_eq!(
            return_type("(I)Ljava/lang/String;"),
            Some("java.lang.String".to_string())
        );
    }

    #[test]
    fn parameter_types_mixed() {
        let params = parameter_types("(ILjava/lang/String;[J)V").unwrap();
        assert_eq!(
            params,
            vec![
                "I".to_string(),
                "Ljava/lang/String;".to_string(),
                "[J".to_string(),
            ]
        );
    }

    #[test]
    fn parameter_types_empty() {
        assert_eq!(parameter_types("()V").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn malformed_descriptor_returns_none() {
        assert_eq!(canonical("Lmissing_semicolon"), None);
        assert_eq!(parameter_types("(Lfoo"), None);
    }
}
