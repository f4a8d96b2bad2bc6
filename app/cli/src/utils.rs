//! CLI utility functions.

/// Expand `${VAR}` patterns in a string with environment variable values.
///
/// Unknown variables are replaced with an empty string. An unterminated
/// `${` is kept as written.
pub fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return result;
        };
        if let Ok(value) = std::env::var(&after[..end]) {
            result.push_str(&value);
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}
