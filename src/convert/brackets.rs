use once_cell::sync::Lazy;
use regex::Regex;

use super::ConvertError;

static NON_DOT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.]+").unwrap());

/// Re-groups one bracketed supplied span so that only the dot-free runs stay
/// bracketed. Dots stand for lost characters and have to sit outside the
/// reconstruction.
///
/// ```text
/// [abd.efg]               -> [abd].[efg]
/// [...abd...efg...hij...] -> ...[abd]...[efg]...[hij]...
/// []                      -> (empty)
/// [.]                     -> .
/// ```
///
/// A `[` or `]` anywhere inside the outer pair is a [`ConvertError::NestedBracket`].
pub fn normalize_supplied_brackets(text: &str) -> Result<String, ConvertError> {
    let inner = match text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => inner,
        None => text,
    };

    if inner.contains(['[', ']']) {
        return Err(ConvertError::NestedBracket {
            text: inner.to_string(),
            context: String::new(),
        });
    }

    Ok(NON_DOT_RUN.replace_all(inner, "[$0]").into_owned())
}
