//! Canonical forms of business names and phone numbers.
//!
//! Both functions return an empty string when the input is not a usable
//! identity; callers treat that as "no key".

/// Punctuation removed before comparing names
const NAME_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\'', '"', '(', ')', '[', ']', '{', '}', '-', '_',
];

/// Words carrying no identity, dropped when they stand alone
const STOP_WORDS: &[&str] = &[
    "the", "le", "la", "les", "un", "une", "des", "and", "et", "&", "of", "de", "du",
];

/// Minimum number of digits for a phone number to count as an identity
pub const MIN_PHONE_DIGITS: usize = 8;

/// Phone numbers longer than this without a `+` are taken as international
const NATIONAL_MAX_LEN: usize = 10;

/// Normalize a display name for comparison.
///
/// ```
/// use table_harvest::dedup::normalize_name;
///
/// assert_eq!(normalize_name("  The Coffee-House, Inc. "), "coffeehouse inc");
/// assert_eq!(normalize_name("Café de la Gare"), "café gare");
/// ```
pub fn normalize_name(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .trim()
        .chars()
        .filter(|c| !NAME_PUNCTUATION.contains(c))
        .collect();

    stripped
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a phone number for comparison.
///
/// ```
/// use table_harvest::dedup::normalize_phone;
///
/// assert_eq!(normalize_phone("+1 212-555-0182"), "+12125550182");
/// assert_eq!(normalize_phone("001 212 5550182"), "+12125550182");
/// assert_eq!(normalize_phone("555-0182"), "");
/// ```
pub fn normalize_phone(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_ascii_digit() || (c == '+' && normalized.is_empty()) {
            normalized.push(c);
        }
    }

    if let Some(rest) = normalized.strip_prefix("00") {
        normalized = format!("+{}", rest);
    }

    if !normalized.starts_with('+') && normalized.len() > NATIONAL_MAX_LEN {
        normalized.insert(0, '+');
    }

    let digits = normalized.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_DIGITS {
        return String::new();
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_basic() {
        assert_eq!(normalize_name("Acme Inc"), "acme inc");
        assert_eq!(normalize_name("ACME, INC."), "acme inc");
        assert_eq!(normalize_name("  Acme    Inc  "), "acme inc");
    }

    #[test]
    fn test_normalize_name_stop_words() {
        assert_eq!(normalize_name("The Bank of England"), "bank england");
        assert_eq!(normalize_name("Boulangerie de la Place"), "boulangerie place");
        assert_eq!(normalize_name("Smith & Sons"), "smith sons");
        assert_eq!(normalize_name("Smith and Sons"), "smith sons");
        // Only whole words are stop words
        assert_eq!(normalize_name("Theatre Lest"), "theatre lest");
    }

    #[test]
    fn test_normalize_name_punctuation() {
        assert_eq!(normalize_name("O'Reilly (Books)"), "oreilly books");
        assert_eq!(normalize_name("Jean-Pierre_Co"), "jeanpierreco");
        assert_eq!(normalize_name("[Hello]{World}!?"), "helloworld");
    }

    #[test]
    fn test_normalize_name_empty() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
        assert_eq!(normalize_name("The"), "");
        assert_eq!(normalize_name("..."), "");
    }

    #[test]
    fn test_normalize_name_idempotent() {
        let inputs = [
            "The Coffee-House, Inc.",
            "  le Petit   Bistro  ",
            "A & B",
            "Café de la Gare",
            "the the the",
            "Ünïcödé  Nâme",
            "des - et - du",
        ];
        for input in inputs {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_normalize_phone_formats() {
        assert_eq!(normalize_phone("+1 212-555-0182"), "+12125550182");
        assert_eq!(normalize_phone("001 212 5550182"), "+12125550182");
        assert_eq!(normalize_phone("(212) 555-0182"), "2125550182");
        assert_eq!(normalize_phone("+44 7000 000000"), "+447000000000");
    }

    #[test]
    fn test_normalize_phone_international_prefix_equivalence() {
        assert_eq!(normalize_phone("0033 1 23 45 67 89"), "+33123456789");
        assert_eq!(normalize_phone("33 1 23 45 67 89"), "+33123456789");
        assert_eq!(normalize_phone("+33 1 23 45 67 89"), "+33123456789");
    }

    #[test]
    fn test_normalize_phone_too_short() {
        assert_eq!(normalize_phone("555-0182"), "");
        assert_eq!(normalize_phone("+1234567"), "");
        assert_eq!(normalize_phone("00 123 456"), "");
        assert_eq!(normalize_phone("n/a"), "");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn test_normalize_phone_keeps_only_leading_plus() {
        assert_eq!(normalize_phone("+33+1 23 45 67 89"), "+33123456789");
        assert_eq!(normalize_phone("tel: +33 1 23 45 67 89"), "+33123456789");
    }

    #[test]
    fn test_normalize_phone_national_number_untouched() {
        assert_eq!(normalize_phone("01 23 45 67 89"), "0123456789");
        assert_eq!(normalize_phone("12345678"), "12345678");
    }
}
