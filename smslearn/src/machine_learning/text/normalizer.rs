// normalizer.rs

/// Replaces `$` before tokenization.
pub const DOLLAR_TOKEN: &str = "dollarsign";
/// Replaces `£` before tokenization.
pub const POUND_TOKEN: &str = "poundsign";
/// Replaces `://` before tokenization.
pub const URL_SCHEME_TOKEN: &str = "urlscheme";

/// Lower-cases `text` and rewrites currency symbols and `://` into reserved words.
///
/// The reserved words are padded with spaces so they tokenize on their own:
/// `"Win $500"` becomes `"win  dollarsign 500"`.
pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let lowercase = text.to_lowercase();
    let mut rest = lowercase.as_str();
    while let Some(c) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("://") {
            push_reserved(&mut normalized, URL_SCHEME_TOKEN);
            rest = tail;
            continue;
        }
        match c {
            '$' => push_reserved(&mut normalized, DOLLAR_TOKEN),
            '£' => push_reserved(&mut normalized, POUND_TOKEN),
            c => normalized.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }
    normalized
}

fn push_reserved(buffer: &mut String, token: &str) {
    buffer.push(' ');
    buffer.push_str(token);
    buffer.push(' ');
}

/// Splits on every non-alphanumeric character, dropping empty pieces.
pub fn tokenize(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
}
