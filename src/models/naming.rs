//! Identifier conversions used to derive serialization names from column
//! and table names.

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

// Keywords that cannot be written as raw identifiers.
const RESERVED_PATH_KEYWORDS: &[&str] = &["crate", "self", "super"];

/// Converts `REALM_ID`, `realmId` or `realm-id` to `realm_id`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase()
                && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
            {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
        prev = Some(c);
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// `user_session` -> `UserSession`.
pub fn upper_camel_case(name: &str) -> String {
    snake_case(name)
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `user_session` -> `userSession`.
pub fn lower_camel_case(name: &str) -> String {
    let upper = upper_camel_case(name);
    let mut chars = upper.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Snake-cased identifier usable as a Rust struct field.
pub fn rust_field_name(name: &str) -> String {
    let snake = snake_case(name);

    if snake.is_empty() {
        return "field".to_string();
    }
    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{}", snake);
    }
    if RESERVED_PATH_KEYWORDS.contains(&snake.as_str()) {
        return format!("{}_", snake);
    }
    if RUST_KEYWORDS.contains(&snake.as_str()) {
        return format!("r#{}", snake);
    }
    snake
}

/// Snake-cased protobuf field name. Protobuf identifiers must start with a
/// letter.
pub fn proto_field_name(name: &str) -> String {
    let snake = snake_case(name);

    match snake.chars().next() {
        None => "field".to_string(),
        Some(c) if c.is_ascii_alphabetic() => snake,
        Some(_) => format!("f_{}", snake),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("REALM_ID"), "realm_id");
        assert_eq!(snake_case("realmId"), "realm_id");
        assert_eq!(snake_case("user-session"), "user_session");
        assert_eq!(snake_case("label"), "label");
        assert_eq!(snake_case("OTP_POLICY_ALG_"), "otp_policy_alg");
    }

    #[test]
    fn test_camel_cases() {
        assert_eq!(upper_camel_case("USER_SESSION"), "UserSession");
        assert_eq!(lower_camel_case("USER_SESSION"), "userSession");
        assert_eq!(lower_camel_case("id"), "id");
    }

    #[test]
    fn test_rust_field_name_escapes_keywords() {
        assert_eq!(rust_field_name("TYPE"), "r#type");
        assert_eq!(rust_field_name("SELF"), "self_");
        assert_eq!(rust_field_name("2FA"), "_2_fa");
        assert_eq!(rust_field_name("EMAIL"), "email");
    }

    #[test]
    fn test_proto_field_name_starts_with_letter() {
        assert_eq!(proto_field_name("2FA"), "f_2_fa");
        assert_eq!(proto_field_name("REALM_ID"), "realm_id");
        assert_eq!(proto_field_name("--"), "field");
    }
}
