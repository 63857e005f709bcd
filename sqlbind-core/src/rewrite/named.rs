//! Named-parameter rewriting: `@name` → `$N`.
//!
//! New slots are numbered above the highest `$K` already present in the
//! input, so mixing styles never collides. Repeated `@name` uses reuse the
//! same slot.

use crate::scanner::{ident_end, is_ident_start, skip_region};

/// Result of a successful rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRewrite {
    /// SQL with every `@name` replaced by a `$K` placeholder.
    pub sql: String,
    /// Source names of the newly assigned slots, in slot order. The first
    /// entry owns slot `positional_count + 1`, and so on.
    pub names: Vec<String>,
    /// Highest `$K` that already existed in the input.
    pub positional_count: u16,
}

/// Rewrite `@name` parameters to positional `$K` form.
///
/// Returns `None` when the input contains no named parameter, so callers can
/// keep the original string untouched. The rewrite is idempotent: running it
/// over its own output is always a no-op.
pub fn rewrite_named_params(sql: &str) -> Option<NamedRewrite> {
    let bytes = sql.as_bytes();

    // Pass 1: the highest preexisting $K, and whether any @name exists.
    let mut positional_count: u16 = 0;
    let mut has_named = false;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = skip_region(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'$' => {
                let (slot, end) = read_slot(bytes, i);
                if let Some(k) = slot {
                    positional_count = positional_count.max(k);
                }
                i = end;
            }
            b'@' if i + 1 < bytes.len() && is_ident_start(bytes[i + 1]) => {
                has_named = true;
                i = ident_end(bytes, i + 1);
            }
            _ => i += 1,
        }
    }
    if !has_named {
        return None;
    }

    // Pass 2: emit, assigning slots above positional_count. Everything
    // between rewrite points is copied through as-is.
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = skip_region(bytes, i) {
            i = end;
            continue;
        }
        if bytes[i] == b'@' && i + 1 < bytes.len() && is_ident_start(bytes[i + 1]) {
            let end = ident_end(bytes, i + 1);
            let name = &sql[i + 1..end];
            let slot = match names.iter().position(|n| n == name) {
                Some(pos) => positional_count as usize + pos + 1,
                None => {
                    names.push(name.to_string());
                    positional_count as usize + names.len()
                }
            };
            out.push_str(&sql[copied..i]);
            out.push('$');
            out.push_str(&slot.to_string());
            copied = end;
            i = end;
        } else {
            i += 1;
        }
    }
    out.push_str(&sql[copied..]);

    Some(NamedRewrite {
        sql: out,
        names,
        positional_count,
    })
}

/// Parse the `$K` placeholder starting at `i` (which points at `$`).
/// Returns the slot number (if the digits form one) and the end index.
fn read_slot(bytes: &[u8], i: usize) -> (Option<u16>, usize) {
    let mut j = i + 1;
    while j < bytes.len() && bytes[j].is_ascii_digit() {
        j += 1;
    }
    if j == i + 1 {
        return (None, j);
    }
    let digits = std::str::from_utf8(&bytes[i + 1..j]).unwrap_or("");
    (digits.parse::<u16>().ok(), j)
}
