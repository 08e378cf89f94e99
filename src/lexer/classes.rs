//! Character classifier and reserved word tables
//!
//! The DFA alphabet is made of exact characters plus a small set of class
//! labels. A character can carry several labels at once, so [`classify`]
//! returns a [`ClassSet`] that the lexer tries in a fixed order.

/// Newline class label.
pub const NEWLINE: &str = "newline";
/// Space, tab and carriage return.
pub const WHITESPACE: &str = "whitespace";
/// ASCII letters.
pub const LETTER: &str = "letter";
/// ASCII digits.
pub const DIGIT: &str = "digit";
/// The `_` character.
pub const UNDERSCORE: &str = "underscore";
/// Any character in [`SYMBOL_CHARS`].
pub const SYMBOL: &str = "symbol";
/// Fallback label for identifier continuation characters.
pub const IDENT_CONTINUE: &str = "letter_or_digit_or_underscore";
/// Wildcard label.
pub const ANY: &str = "any";
/// Wildcard used only while scanning a quoted literal.
pub const ANY_NON_QUOTE: &str = "any_non_quote";

/// Punctuation and operator characters of Pascal-S.
pub const SYMBOL_CHARS: &str = "+-*/=<>()[];,:'.";

/// Reserved words. Matched against the lowercased lexeme.
pub const KEYWORDS: &[&str] = &[
    "program",
    "variabel",
    "mulai",
    "selesai",
    "konstanta",
    "tipe",
    "prosedur",
    "fungsi",
    "jika",
    "maka",
    "selain-itu",
    "selama",
    "lakukan",
    "untuk",
    "ke",
    "turun-ke",
    "ulangi",
    "sampai",
    "larik",
    "dari",
    "integer",
    "real",
    "boolean",
    "char",
];

/// Word-form logical operators.
pub const LOGICAL_WORDS: &[&str] = &["dan", "atau", "tidak"];

/// Word-form arithmetic operators.
pub const ARITHMETIC_WORDS: &[&str] = &["bagi", "mod"];

/// Identifiers the parser reads as boolean literals.
pub const BOOLEAN_WORDS: &[&str] = &["benar", "salah", "true", "false"];

/// Class labels carried by one character, in the order the lexer tries them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassSet {
    labels: [Option<&'static str>; 3],
}

impl ClassSet {
    fn push(&mut self, label: &'static str) {
        if let Some(slot) = self.labels.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(label);
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.iter().any(|l| l == label)
    }

    pub fn is_empty(&self) -> bool {
        self.labels[0].is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.labels.iter().flatten().copied()
    }
}

/// Map a character to its class labels.
///
/// Order is deterministic: letter, digit, underscore, whitespace, newline,
/// symbol. Only ASCII letters and digits count.
pub fn classify(ch: char) -> ClassSet {
    let mut set = ClassSet::default();
    if ch.is_ascii_alphabetic() {
        set.push(LETTER);
    }
    if ch.is_ascii_digit() {
        set.push(DIGIT);
    }
    if ch == '_' {
        set.push(UNDERSCORE);
    }
    if matches!(ch, ' ' | '\t' | '\r') {
        set.push(WHITESPACE);
    }
    if ch == '\n' {
        set.push(NEWLINE);
    }
    if SYMBOL_CHARS.contains(ch) {
        set.push(SYMBOL);
    }
    set
}

/// True for characters accepted by the [`IDENT_CONTINUE`] fallback.
pub fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

pub fn is_keyword(lowered: &str) -> bool {
    KEYWORDS.contains(&lowered)
}

pub fn is_logical_word(lowered: &str) -> bool {
    LOGICAL_WORDS.contains(&lowered)
}

pub fn is_arithmetic_word(lowered: &str) -> bool {
    ARITHMETIC_WORDS.contains(&lowered)
}

pub fn is_boolean_word(word: &str) -> bool {
    BOOLEAN_WORDS.iter().any(|w| w.eq_ignore_ascii_case(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_and_digit_are_disjoint() {
        let a = classify('a');
        assert!(a.contains(LETTER));
        assert!(!a.contains(DIGIT));

        let seven = classify('7');
        assert!(seven.contains(DIGIT));
        assert!(!seven.contains(LETTER));
    }

    #[test]
    fn test_symbols_and_spacing() {
        assert_eq!(classify(':').iter().collect::<Vec<_>>(), vec![SYMBOL]);
        assert_eq!(classify('\'').iter().collect::<Vec<_>>(), vec![SYMBOL]);
        assert_eq!(classify('\t').iter().collect::<Vec<_>>(), vec![WHITESPACE]);
        assert_eq!(classify('\n').iter().collect::<Vec<_>>(), vec![NEWLINE]);
        assert!(classify('#').is_empty());
        assert!(classify('é').is_empty());
    }

    #[test]
    fn test_underscore_continues_identifiers() {
        assert!(classify('_').contains(UNDERSCORE));
        assert!(is_ident_continue('_'));
        assert!(is_ident_continue('x'));
        assert!(is_ident_continue('9'));
        assert!(!is_ident_continue('-'));
    }

    #[test]
    fn test_word_tables() {
        assert!(is_keyword("selain-itu"));
        assert!(is_keyword("turun-ke"));
        assert!(!is_keyword("MULAI"));
        assert!(is_logical_word("atau"));
        assert!(is_arithmetic_word("bagi"));
        assert!(is_boolean_word("Benar"));
        assert!(!is_boolean_word("mulai"));
    }
}
