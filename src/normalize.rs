//! File name normalization.
//!
//! Turns an arbitrary file stem into a filesystem-safe ASCII identifier:
//! Cyrillic letters are transliterated to Latin, everything else that is not
//! an ASCII letter, digit or underscore becomes `_`.

const CYRILLIC_SYMBOLS: &str = "абвгдеёжзийклмнопрстуфхцчшщъыьэюяєіїґ";

const TRANSLATION: [&str; 37] = [
    "a", "b", "v", "g", "d", "e", "e", "j", "z", "i", "j", "k", "l", "m", "n", "o", "p", "r", "s",
    "t", "u", "f", "h", "ts", "ch", "sh", "sch", "", "y", "", "e", "yu", "ya", "je", "i", "ji", "g",
];

/// Looks up the Latin spelling of a Cyrillic letter.
///
/// Uppercase letters map to the uppercased Latin string, so `Щ` becomes `SCH`.
fn transliterate(c: char) -> Option<String> {
    if let Some(idx) = CYRILLIC_SYMBOLS.chars().position(|s| s == c) {
        return Some(TRANSLATION[idx].to_string());
    }

    CYRILLIC_SYMBOLS
        .chars()
        .position(|s| s.to_uppercase().eq(std::iter::once(c)))
        .map(|idx| TRANSLATION[idx].to_uppercase())
}

/// Normalizes a file stem.
///
/// The extension is not part of the input: callers strip it before and
/// re-append the lowercased extension afterwards.
///
/// # Examples
///
/// ```
/// use dirsort::normalize::normalize;
///
/// assert_eq!(normalize("Доклад"), "Doklad");
/// assert_eq!(normalize("my file (1)"), "my_file__1_");
/// ```
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for c in name.chars() {
        match transliterate(c) {
            Some(latin) => out.push_str(&latin),
            None if c.is_ascii_alphanumeric() || c == '_' => out.push(c),
            None => out.push('_'),
        }
    }

    out
}
