//! Quote-aware scanning over raw line text

/// Characters of `text` that sit outside quoted literals, with byte offsets
///
/// Recognises `"..."` and `'...'` (backslash escapes) and back-tick strings.
pub fn unquoted(text: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    text.char_indices().filter(move |&(_, c)| match quote {
        Some(q) => {
            if escaped {
                escaped = false;
            } else if c == '\\' && q != '`' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            false
        }
        None if matches!(c, '"' | '\'' | '`') => {
            quote = Some(c);
            false
        }
        None => true,
    })
}

/// Net brace depth change over `text`
pub fn brace_balance(text: &str) -> i32 {
    unquoted(text).fold(0, |depth, (_, c)| match c {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

/// Offset of the first `}` that closes a block opened before `text`
pub fn closing_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in unquoted(text) {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(offset),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Offset of the `)` matching a `(` that precedes `text`
pub fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in unquoted(text) {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(offset),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}
