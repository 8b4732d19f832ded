//! Pre-processing of movetext before it is walked token by token.

use smallvec::SmallVec;

use crate::error::MovetextError;

/// Stands in for whitespace inside `{...}` so a comment survives whitespace splitting.
const COMMENT_SPACE: char = '\u{E000}';

/// Checks that `(`/`)` and `{`/`}` pair up. Braces do not nest, and parentheses inside a
/// comment are plain text.
pub fn check_brackets(body: &str) -> Result<(), MovetextError> {
    let mut open: SmallVec<[char; 16]> = SmallVec::new();

    for (offset, c) in body.char_indices() {
        let in_comment = open.last() == Some(&'{');
        match c {
            '}' if in_comment => {
                open.pop();
            }
            _ if in_comment => {}
            '{' | '(' => open.push(c),
            ')' if open.last() == Some(&'(') => {
                open.pop();
            }
            ')' | '}' => return Err(MovetextError::UnexpectedBracket { found: c, offset }),
            _ => {}
        }
    }

    match open.pop() {
        Some(c) => Err(MovetextError::UnclosedBracket(c)),
        None => Ok(()),
    }
}

/// Splits movetext into tokens. Comments come out as single `{...}` tokens and every
/// parenthesis outside a comment stands alone.
pub fn tokenize(body: &str) -> Vec<String> {
    let mut padded = String::with_capacity(body.len() + body.len() / 4);
    let mut in_comment = false;

    for c in body.chars() {
        if in_comment {
            match c {
                '}' => {
                    padded.push_str("} ");
                    in_comment = false;
                }
                c if c.is_whitespace() => padded.push(COMMENT_SPACE),
                c => padded.push(c),
            }
            continue;
        }
        match c {
            '{' => {
                padded.push_str(" {");
                in_comment = true;
            }
            '(' | ')' => {
                padded.push(' ');
                padded.push(c);
                padded.push(' ');
            }
            c => padded.push(c),
        }
    }

    padded.split_whitespace().map(str::to_string).collect()
}

/// The text of a comment token produced by [`tokenize`], or `None` for other tokens.
pub fn restore_comment(token: &str) -> Option<String> {
    let inner = token.strip_prefix('{')?;
    let inner = inner.strip_suffix('}').unwrap_or(inner);
    Some(inner.replace(COMMENT_SPACE, " "))
}
