//! Case conversion helpers shared by the naming rules
//!
//! Every identifier that ends up in generated source passes through one of
//! these functions, so they must agree with each other: `to_proper_case` is
//! defined in terms of `to_snake_case`.

/// Rust keywords (strict and reserved) that cannot be used as plain identifiers.
const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Prelude and std type names the generated source spells unqualified.
const RESERVED_TYPE_NAMES: &[&str] = &["Box", "Option", "Result", "String", "Vec"];

/// Returns true if `ident` is a Rust keyword.
pub fn is_rust_keyword(ident: &str) -> bool {
    RUST_KEYWORDS.contains(&ident)
}

/// Returns true if a generated type named `ident` would shadow a name the
/// generated source relies on, or is not an identifier at all.
pub fn is_reserved_type_name(ident: &str) -> bool {
    is_rust_keyword(ident) || RESERVED_TYPE_NAMES.contains(&ident)
}

/// Converts a string to snake_case.
///
/// Word boundaries are lower-to-upper transitions, the last capital of an
/// acronym run (`HTTPResponse` splits as `http_response`), and any of
/// `-`, `_`, `.` or whitespace. Other punctuation is dropped.
///
/// # Examples
/// ```
/// use clientgen::generation::utils::to_snake_case;
///
/// assert_eq!(to_snake_case("studentGroups"), "student_groups");
/// assert_eq!(to_snake_case("student-groups"), "student_groups");
/// assert_eq!(to_snake_case("HTTPResponse"), "http_response");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let after_lower = prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
            let ends_acronym =
                prev.is_some_and(char::is_uppercase) && next.is_some_and(char::is_lowercase);
            if (after_lower || ends_acronym) && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch.is_alphanumeric() {
            result.push(ch);
        } else if matches!(ch, '-' | '_' | '.' | ' ' | '\t') && !result.ends_with('_') {
            result.push('_');
        }
    }

    result.trim_matches('_').to_string()
}

/// Converts a string to PascalCase by way of snake_case.
///
/// # Examples
/// ```
/// use clientgen::generation::utils::to_proper_case;
///
/// assert_eq!(to_proper_case("by_foo_and_bar"), "ByFooAndBar");
/// assert_eq!(to_proper_case("studentGroups"), "StudentGroups");
/// ```
pub fn to_proper_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Sanitizes a string into a snake_case Rust field or module name.
///
/// Keywords get a trailing underscore and a leading digit gets a leading
/// underscore, so the result is always usable without raw-identifier syntax.
///
/// # Examples
/// ```
/// use clientgen::generation::utils::sanitize_rust_field_name;
///
/// assert_eq!(sanitize_rust_field_name("type"), "type_");
/// assert_eq!(sanitize_rust_field_name("widgetId"), "widget_id");
/// assert_eq!(sanitize_rust_field_name("2fa"), "_2fa");
/// ```
pub fn sanitize_rust_field_name(s: &str) -> String {
    let snake_case = to_snake_case(s);

    if is_rust_keyword(&snake_case) {
        format!("{snake_case}_")
    } else if snake_case.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{snake_case}")
    } else {
        snake_case
    }
}
