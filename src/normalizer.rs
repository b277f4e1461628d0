// Canonical comparison form for device and profile names
use unicode_normalization::UnicodeNormalization;

/// Punctuation that separates words in vendor strings.
const SEPARATORS: &[char] = &[
    '-', '_', '.', ',', ';', ':', '/', '\\', '|', '(', ')', '[', ']', '{', '}', '"', '\'',
    '\u{FFFD}',
];

/// Symbols vendors sprinkle into product names that carry no meaning.
const NOISE_SYMBOLS: &[char] = &['®', '™', '©'];

/// Spelled-out marks, matched case-insensitively.
const NOISE_MARKS: &[&str] = &["(r)", "(tm)", "(c)"];

/// Normalizes a raw name: applies NFKC (full-width letters, ligatures),
/// folds case, drops trademark noise, turns whitespace, control characters
/// and separator punctuation into single spaces and trims both ends.
/// Total and idempotent; "" maps to "".
pub fn normalize(raw: &str) -> String {
    // marks go first: NFKC would spell ™ out as "TM"
    let folded: String = raw
        .chars()
        .filter(|c| !NOISE_SYMBOLS.contains(c))
        .nfkc()
        .collect();

    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    let mut rest = folded.as_str();

    while let Some(c) = rest.chars().next() {
        if c == '(' {
            if let Some(mark) = NOISE_MARKS.iter().find(|m| starts_with_ignore_case(rest, m)) {
                rest = &rest[mark.len()..];
                pending_space = !out.is_empty();
                continue;
            }
        }
        rest = &rest[c.len_utf8()..];

        if c.is_whitespace() || c.is_control() || SEPARATORS.contains(&c) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Splits a normalized name into its words.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split(' ').filter(|t| !t.is_empty())
}

fn starts_with_ignore_case(haystack: &str, ascii_prefix: &str) -> bool {
    haystack
        .get(..ascii_prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(ascii_prefix))
}
