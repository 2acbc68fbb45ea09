//! Visible-text extraction from HTML-bearing card fields.
//!
//! All length and word-count heuristics in the rule set operate on the
//! visible text of a field: markup removed, entities decoded, and
//! whitespace collapsed. Extraction is best-effort and fail-soft --
//! malformed markup degrades to literal text, it never aborts
//! validation.

/// Human-readable text of a raw field value.
///
/// Tags are replaced by a word boundary, character entities are
/// decoded, and whitespace runs collapse to single spaces. The pass
/// repeats until a fixpoint so the function is idempotent even when
/// entity decoding uncovers further markup (`&lt;b&gt;x` and `<b>x`
/// normalize identically). The result is never longer than the input.
pub fn visible_text(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = collapse_whitespace(&decode_entities(&strip_tags(&current)));
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Number of whitespace-delimited tokens in the visible text.
pub fn word_count(raw: &str) -> usize {
    visible_text(raw).split_whitespace().count()
}

/// Character length of the visible text.
pub fn char_count(raw: &str) -> usize {
    visible_text(raw).chars().count()
}

/// Remove markup tags, substituting a single space for each.
///
/// A `<` only opens a tag when followed by a tag name (or `/`, `!`)
/// and a closing `>` exists; otherwise it stays literal text. One
/// unterminated tag must not swallow the rest of the field.
fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if opens_tag(after) {
            match after.find('>') {
                Some(end) => {
                    out.push(' ');
                    rest = &after[end + 1..];
                }
                None => {
                    out.push('<');
                    rest = after;
                }
            }
        } else {
            out.push('<');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

fn opens_tag(after_lt: &str) -> bool {
    let mut chars = after_lt.chars();
    match chars.next() {
        Some('/') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
        // Comments and doctype declarations.
        Some('!') => true,
        Some(c) => c.is_ascii_alphabetic(),
        None => false,
    }
}

/// Decode character entity references (named set plus numeric forms).
///
/// Unknown or malformed references stay literal.
fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match decode_one(rest) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode the entity at the start of `s` (which begins with `&`),
/// returning the character and the byte length consumed.
fn decode_one(s: &str) -> Option<(char, usize)> {
    let semi = s[1..].find(';')?;
    let name = &s[1..1 + semi];
    if name.is_empty()
        || name.len() > 8
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
    {
        return None;
    }
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)?
        }
    };
    Some((ch, semi + 2))
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
