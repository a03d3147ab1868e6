use crate::error::{PomupError, Result};
use regex::Regex;

/// Anchored, case-sensitive regex for a `*`/`?` glob. Maven identifiers are
/// case-sensitive, so `org.Foo` does not match `org.foo`.
pub fn compile_glob(pattern: &str) -> Result<Regex> {
    let mut regex = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '.' | '+' | '(' | ')' | '|' | '^' | '$' | '{' | '}' | '[' | ']' | '\\' => {
                regex.push('\\');
                regex.push(ch);
            }
            _ => regex.push(ch),
        }
    }
    regex.push('$');

    Regex::new(&regex)
        .map_err(|e| PomupError::Config(format!("Invalid pattern '{}': {}", pattern, e)))
}
