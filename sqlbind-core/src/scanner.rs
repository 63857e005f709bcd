//! Shared lexical scanning for SQL rewriting.
//!
//! Every rewriter in this crate walks SQL bytes with the same rules for what
//! is *not* code: single-quoted strings (with `''` escapes), `--` line
//! comments, `/* */` block comments, and `"quoted identifiers"`. A single
//! implementation guarantees that `@foo` inside a string literal is invisible
//! to the named-parameter rewriter, the alias quoter, and the name inferencer
//! alike.

/// Returns the end index (exclusive) of the non-code region starting at `i`,
/// or `None` when `src[i]` does not open one.
///
/// Unterminated regions run to the end of the input; the server will reject
/// the SQL anyway, so the scanners just stay out of the way.
pub fn skip_region(src: &[u8], i: usize) -> Option<usize> {
    match src[i] {
        b'\'' => Some(skip_single_quoted(src, i)),
        b'"' => Some(skip_quoted_ident(src, i)),
        b'-' if src.get(i + 1) == Some(&b'-') => Some(skip_line_comment(src, i)),
        b'/' if src.get(i + 1) == Some(&b'*') => Some(skip_block_comment(src, i)),
        _ => None,
    }
}

/// Like [`skip_region`] but only for the two comment forms. Used where a
/// string literal would be a syntax error anyway (e.g. between the tokens of
/// an INSERT column list).
pub fn skip_comment(src: &[u8], i: usize) -> Option<usize> {
    match src[i] {
        b'-' if src.get(i + 1) == Some(&b'-') => Some(skip_line_comment(src, i)),
        b'/' if src.get(i + 1) == Some(&b'*') => Some(skip_block_comment(src, i)),
        _ => None,
    }
}

fn skip_single_quoted(src: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < src.len() {
        if src[i] == b'\'' {
            // '' is an escaped quote, not a terminator
            if src.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    src.len()
}

fn skip_quoted_ident(src: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < src.len() {
        if src[i] == b'"' {
            if src.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    src.len()
}

fn skip_line_comment(src: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i < src.len() {
        if src[i] == b'\n' {
            return i + 1;
        }
        i += 1;
    }
    src.len()
}

// Block comments are treated as non-nested.
fn skip_block_comment(src: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i + 1 < src.len() {
        if src[i] == b'*' && src[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    src.len()
}

/// First byte of a SQL identifier: `[A-Za-z_]`.
pub fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// Subsequent byte of a SQL identifier: `[A-Za-z0-9_]`.
pub fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// End index (exclusive) of the identifier starting at `i`. The caller has
/// already checked `is_ident_start(src[i])`.
pub fn ident_end(src: &[u8], i: usize) -> usize {
    let mut j = i + 1;
    while j < src.len() && is_ident_char(src[j]) {
        j += 1;
    }
    j
}
