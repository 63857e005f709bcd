//! Parameter-name inference.
//!
//! The server tells us how many parameters a statement takes and what their
//! types are, but `$1` is a miserable field name. This module derives a
//! readable name for each positional slot from the SQL itself: the INSERT
//! column list, the left-hand side of a comparison, or a `LIMIT`/`OFFSET`
//! keyword. Slots nothing matches fall back to `param_<K>`.

use std::collections::HashSet;

use crate::scanner::{ident_end, is_ident_char, is_ident_start, skip_comment, skip_region};

/// Keywords that can sit directly left of a comparison operator without
/// being a useful name.
const NOISE_WORDS: &[&str] = &[
    "AND", "OR", "NOT", "IS", "IN", "LIKE", "SET", "WHERE", "HAVING", "ON", "THEN", "WHEN",
    "ELSE", "NULL",
];

/// INSERT column lists longer than this are not worth pairing up.
const MAX_INSERT_COLUMNS: usize = 64;

/// Produce `count` non-empty, duplicate-free parameter names for `sql`.
pub fn infer_param_names(sql: &str, count: usize) -> Vec<String> {
    let mut names: Vec<Option<String>> = vec![None; count];

    // Rule 1: INSERT INTO t (a, b) VALUES ($1, $2) pairs slots with columns.
    if let Some(pairs) = match_insert_columns(sql) {
        for (slot, col) in pairs {
            let k = slot as usize;
            if (1..=count).contains(&k) && names[k - 1].is_none() {
                names[k - 1] = Some(col);
            }
        }
    }

    // Rules 2 and 3 need the position of each slot's first occurrence.
    let positions = placeholder_positions(sql, count);
    for k in 0..count {
        if names[k].is_some() {
            continue;
        }
        if let Some(pos) = positions[k] {
            names[k] = infer_from_context(sql, pos);
        }
    }

    // Rule 4: fallback.
    let mut out: Vec<String> = names
        .into_iter()
        .enumerate()
        .map(|(k, n)| n.unwrap_or_else(|| format!("param_{}", k + 1)))
        .collect();
    dedupe_names(&mut out);
    out
}

/// Rewrite duplicate names in place by suffixing `_1`, `_2`, ... onto the
/// later occurrences. The first occurrence keeps the bare name.
pub fn dedupe_names(names: &mut [String]) {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    for name in names.iter_mut() {
        if seen.insert(name.clone()) {
            continue;
        }
        let base = name.clone();
        let mut n = 1;
        loop {
            let candidate = format!("{}_{}", base, n);
            if seen.insert(candidate.clone()) {
                *name = candidate;
                break;
            }
            n += 1;
        }
    }
}

/// Byte offset of the first occurrence of each `$K`, `K` in `1..=count`.
fn placeholder_positions(sql: &str, count: usize) -> Vec<Option<usize>> {
    let bytes = sql.as_bytes();
    let mut positions: Vec<Option<usize>> = vec![None; count];
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = skip_region(bytes, i) {
            i = end;
            continue;
        }
        if bytes[i] == b'$' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 {
                if let Ok(k) = sql[i + 1..j].parse::<usize>() {
                    if (1..=count).contains(&k) && positions[k - 1].is_none() {
                        positions[k - 1] = Some(i);
                    }
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }
    positions
}

/// Walk backward from the `$` at `pos`: a comparison operator gives us its
/// left-hand identifier, a bare `LIMIT`/`OFFSET` keyword names the slot
/// directly.
fn infer_from_context(sql: &str, pos: usize) -> Option<String> {
    let bytes = sql.as_bytes();
    let mut j = pos;
    while j > 0 && bytes[j - 1].is_ascii_whitespace() {
        j -= 1;
    }

    // Longest operator first: != <> <= >= before = < >
    let two = if j >= 2 { &sql[j - 2..j] } else { "" };
    let op_len = if matches!(two, "!=" | "<>" | "<=" | ">=") {
        2
    } else if j >= 1 && matches!(bytes[j - 1], b'=' | b'<' | b'>') {
        1
    } else {
        0
    };

    if op_len > 0 {
        j -= op_len;
        while j > 0 && bytes[j - 1].is_ascii_whitespace() {
            j -= 1;
        }
        let word = word_before(sql, j)?;
        if NOISE_WORDS.iter().any(|w| word.eq_ignore_ascii_case(w)) {
            return None;
        }
        return Some(word.to_string());
    }

    let word = word_before(sql, j)?;
    if word.eq_ignore_ascii_case("LIMIT") {
        return Some("limit".to_string());
    }
    if word.eq_ignore_ascii_case("OFFSET") {
        return Some("offset".to_string());
    }
    None
}

/// The identifier ending exactly at `end`, or `None` if what precedes `end`
/// is not an identifier.
fn word_before(sql: &str, end: usize) -> Option<&str> {
    let bytes = sql.as_bytes();
    let mut start = end;
    while start > 0 && is_ident_char(bytes[start - 1]) {
        start -= 1;
    }
    if start == end || !is_ident_start(bytes[start]) {
        return None;
    }
    Some(&sql[start..end])
}

/// Tolerant match of `INSERT INTO <table> ( c1, ... ) VALUES ( e1, ... )`.
/// Returns `(slot, column)` pairs for every value expression that is exactly
/// a `$K` placeholder.
fn match_insert_columns(sql: &str) -> Option<Vec<(u16, String)>> {
    let mut cur = Cursor { sql, i: 0 };
    cur.skip_trivia();
    if !cur.eat_keyword("INSERT") {
        return None;
    }
    cur.skip_trivia();
    if !cur.eat_keyword("INTO") {
        return None;
    }
    cur.skip_trivia();
    cur.eat_qualified_ident()?;
    cur.skip_trivia();
    if !cur.eat_byte(b'(') {
        return None;
    }

    let mut cols = Vec::new();
    loop {
        cur.skip_trivia();
        cols.push(cur.eat_ident()?);
        if cols.len() > MAX_INSERT_COLUMNS {
            return None;
        }
        cur.skip_trivia();
        if cur.eat_byte(b',') {
            continue;
        }
        if cur.eat_byte(b')') {
            break;
        }
        return None;
    }

    cur.skip_trivia();
    if !cur.eat_keyword("VALUES") {
        return None;
    }
    cur.skip_trivia();
    if !cur.eat_byte(b'(') {
        return None;
    }

    let exprs = cur.split_value_exprs()?;
    let mut pairs = Vec::new();
    for (idx, expr) in exprs.iter().enumerate() {
        if idx >= cols.len() {
            break;
        }
        if let Some(slot) = placeholder_slot(expr) {
            pairs.push((slot, cols[idx].clone()));
        }
    }
    Some(pairs)
}

/// `Some(K)` when the trimmed expression is exactly `$K`.
fn placeholder_slot(expr: &str) -> Option<u16> {
    let expr = expr.trim();
    let rest = expr.strip_prefix('$')?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse::<u16>().ok()
}

/// A tiny forward cursor for the INSERT matcher. Trivia between tokens is
/// whitespace and comments only; string literals cannot occur there.
struct Cursor<'a> {
    sql: &'a str,
    i: usize,
}

impl<'a> Cursor<'a> {
    fn bytes(&self) -> &'a [u8] {
        self.sql.as_bytes()
    }

    fn skip_trivia(&mut self) {
        let bytes = self.bytes();
        while self.i < bytes.len() {
            if bytes[self.i].is_ascii_whitespace() {
                self.i += 1;
            } else if let Some(end) = skip_comment(bytes, self.i) {
                self.i = end;
            } else {
                break;
            }
        }
    }

    fn eat_byte(&mut self, b: u8) -> bool {
        if self.bytes().get(self.i) == Some(&b) {
            self.i += 1;
            true
        } else {
            false
        }
    }

    /// Case-insensitive whole-word keyword match.
    fn eat_keyword(&mut self, kw: &str) -> bool {
        let bytes = self.bytes();
        let end = self.i + kw.len();
        if end > bytes.len() {
            return false;
        }
        if !self.sql[self.i..end].eq_ignore_ascii_case(kw) {
            return false;
        }
        if bytes.get(end).is_some_and(|&b| is_ident_char(b)) {
            return false;
        }
        self.i = end;
        true
    }

    /// A bare or `"quoted"` identifier.
    fn eat_ident(&mut self) -> Option<String> {
        let bytes = self.bytes();
        match bytes.get(self.i).copied() {
            Some(b'"') => {
                let end = skip_region(bytes, self.i)?;
                if end < self.i + 2 {
                    return None;
                }
                let inner = &self.sql[self.i + 1..end - 1];
                self.i = end;
                Some(inner.replace("\"\"", "\""))
            }
            Some(b) if is_ident_start(b) => {
                let end = ident_end(bytes, self.i);
                let word = &self.sql[self.i..end];
                self.i = end;
                Some(word.to_string())
            }
            _ => None,
        }
    }

    /// `ident` optionally qualified: `schema.table`, `"Schema"."Table"`.
    fn eat_qualified_ident(&mut self) -> Option<()> {
        self.eat_ident()?;
        loop {
            if !self.eat_byte(b'.') {
                return Some(());
            }
            self.eat_ident()?;
        }
    }

    /// Consume the VALUES tuple the cursor sits inside (just past the opening
    /// paren) and return the expression spans between top-level commas.
    fn split_value_exprs(&mut self) -> Option<Vec<&'a str>> {
        let bytes = self.bytes();
        let mut exprs = Vec::new();
        let mut depth = 0usize;
        let mut start = self.i;
        while self.i < bytes.len() {
            if let Some(end) = skip_region(bytes, self.i) {
                self.i = end;
                continue;
            }
            match bytes[self.i] {
                b'(' => depth += 1,
                b')' => {
                    if depth == 0 {
                        exprs.push(&self.sql[start..self.i]);
                        self.i += 1;
                        return Some(exprs);
                    }
                    depth -= 1;
                }
                b',' if depth == 0 => {
                    exprs.push(&self.sql[start..self.i]);
                    start = self.i + 1;
                }
                _ => {}
            }
            self.i += 1;
        }
        None
    }
}
