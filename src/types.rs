//! Fundamental types used by this crate: tokens, lexicon meanings and token-level errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a token as delivered by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Word,
    Punctuation,
    Number,
    Ordinal,
    /// A date, possibly with a month name, e. g. `12. nóvember`.
    Date,
    /// An amount of money, e. g. `24 milljónir króna`.
    Amount,
    SentenceBegin,
    SentenceEnd,
    Other,
}

impl TokenKind {
    pub fn is_sentence_boundary(&self) -> bool {
        matches!(self, TokenKind::SentenceBegin | TokenKind::SentenceEnd)
    }
}

/// One meaning of a word form in the lexicon.
///
/// `inflection` is an underscore-separated list of variant tags such as `þgf_et_gr`
/// or `fh_nt_p3_et`. A meaning without inflection information has `-` as its inflection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meaning {
    pub lemma: String,
    pub category: String,
    pub domain: String,
    pub form: String,
    pub inflection: String,
}

/// A word form generated by the lexicon. Shares its layout with [Meaning].
pub type WordForm = Meaning;

impl Meaning {
    pub fn new<S: Into<String>>(form: S, lemma: S, category: S, inflection: S) -> Self {
        Meaning {
            form: form.into(),
            lemma: lemma.into(),
            category: category.into(),
            domain: "alm".into(),
            inflection: inflection.into(),
        }
    }

    pub fn with_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = domain.into();
        self
    }

    /// The inflection tags of this meaning. Empty if the meaning carries no inflection.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.inflection
            .split('_')
            .filter(|x| !x.is_empty() && *x != "-")
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        self.variants().any(|x| x == variant)
    }

    /// The lemma without compound-boundary hyphens.
    pub fn plain_lemma(&self) -> String {
        self.lemma.replace('-', "")
    }

    pub fn is_compound(&self) -> bool {
        self.lemma.contains('-')
    }
}

/// The category of a token-level error. The category determines the first letter(s) of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Compound,
    UnknownWord,
    Capitalization,
    Taboo,
    Spelling,
    SpellingSuggestion,
    Phrase,
    Abbreviation,
    Punctuation,
}

impl ErrorKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ErrorKind::Compound => "C",
            ErrorKind::UnknownWord => "U",
            ErrorKind::Capitalization => "Z",
            ErrorKind::Taboo => "T",
            ErrorKind::Spelling => "S",
            ErrorKind::SpellingSuggestion => "W",
            ErrorKind::Phrase => "P_",
            ErrorKind::Abbreviation => "A",
            ErrorKind::Punctuation => "N",
        }
    }

    fn always_warning(&self, code: &str) -> bool {
        match self {
            ErrorKind::Taboo | ErrorKind::SpellingSuggestion => true,
            ErrorKind::Compound => code == "004",
            _ => false,
        }
    }
}

/// An error attached to a single token by the correction pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenError {
    kind: ErrorKind,
    code: String,
    text: String,
    span: usize,
    suggest: Option<String>,
}

impl TokenError {
    /// Creates an error of the given kind. `code` is the numeric (or phrase) part, the
    /// kind prefix and the warning suffix are added here.
    pub fn new<S: Into<String>>(kind: ErrorKind, code: &str, text: S) -> Self {
        let mut full = format!("{}{}", kind.prefix(), code);
        if kind.always_warning(code) {
            full.push_str("/w");
        }

        TokenError {
            kind,
            code: full,
            text: text.into(),
            span: 1,
            suggest: None,
        }
    }

    /// Marks the error as a warning, appending `/w` to its code if it is not already there.
    pub fn warning(mut self, is_warning: bool) -> Self {
        if is_warning && !self.code.ends_with("/w") {
            self.code.push_str("/w");
        }
        self
    }

    pub fn with_span(mut self, span: usize) -> Self {
        self.span = span.max(1);
        self
    }

    pub fn with_suggestion<S: Into<String>>(mut self, suggest: S) -> Self {
        self.suggest = Some(suggest.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The number of tokens covered by this error, starting at the token carrying it.
    pub fn span(&self) -> usize {
        self.span
    }

    pub fn suggest(&self) -> Option<&str> {
        self.suggest.as_deref()
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.text)
    }
}

/// The error slot of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    NoError,
    /// The token continues a multi-token replacement whose error sits on an earlier token.
    /// Later stages leave it alone.
    Pending { original: String },
    Resolved(TokenError),
}

impl Default for Provenance {
    fn default() -> Self {
        Provenance::NoError
    }
}

impl Provenance {
    pub fn error(&self) -> Option<&TokenError> {
        match self {
            Provenance::Resolved(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Provenance::NoError)
    }
}

/// Combines the provenance of tokens that are merged into one.
///
/// The first resolved error wins. An error that covered several tokens now covers the
/// single merged token, so its span is reset to 1. Without any resolved error, a pending
/// marker is kept.
pub fn coalesce(tokens: &[Token]) -> Provenance {
    if let Some(error) = tokens.iter().find_map(|x| x.error()) {
        return Provenance::Resolved(error.clone().with_span(1));
    }
    tokens
        .iter()
        .map(|x| x.provenance.clone())
        .find(|x| !x.is_none())
        .unwrap_or_default()
}

/// A token of a sentence together with its correction state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub meanings: Vec<Meaning>,
    pub provenance: Provenance,
    /// The surface form before any correction, if the token was changed.
    pub original: Option<String>,
    /// The number of source tokens folded into this token.
    pub consumed: usize,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, text: S) -> Self {
        Token {
            kind,
            text: text.into(),
            meanings: Vec::new(),
            provenance: Provenance::NoError,
            original: None,
            consumed: 1,
        }
    }

    pub fn word<S: Into<String>>(text: S, meanings: Vec<Meaning>) -> Self {
        Token {
            meanings,
            ..Token::new(TokenKind::Word, text)
        }
    }

    pub fn punctuation<S: Into<String>>(text: S) -> Self {
        Token::new(TokenKind::Punctuation, text)
    }

    pub fn sentence_begin() -> Self {
        Token::new(TokenKind::SentenceBegin, "")
    }

    pub fn sentence_end() -> Self {
        Token::new(TokenKind::SentenceEnd, "")
    }

    /// Builds a word token replacing this one. The error slot and the original
    /// surface form are carried over.
    pub fn replaced<S: Into<String>>(&self, text: S, meanings: Vec<Meaning>) -> Token {
        Token {
            kind: TokenKind::Word,
            text: text.into(),
            meanings,
            provenance: self.provenance.clone(),
            original: Some(self.original_text().to_string()),
            consumed: self.consumed,
        }
    }

    /// Builds one word token out of several, combining their provenance.
    pub fn merged<S: Into<String>>(tokens: &[Token], text: S, meanings: Vec<Meaning>) -> Token {
        let original = tokens
            .iter()
            .map(|x| x.original_text())
            .collect::<Vec<_>>()
            .join(" ");

        Token {
            kind: TokenKind::Word,
            text: text.into(),
            meanings,
            provenance: coalesce(tokens),
            original: Some(original),
            consumed: tokens.iter().map(|x| x.consumed).sum(),
        }
    }

    pub fn original_text(&self) -> &str {
        self.original.as_deref().unwrap_or(&self.text)
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    pub fn has_meanings(&self) -> bool {
        !self.meanings.is_empty()
    }

    pub fn error(&self) -> Option<&TokenError> {
        self.provenance.error()
    }

    pub fn error_code(&self) -> &str {
        self.error().map_or("", |x| x.code())
    }

    pub fn error_span(&self) -> usize {
        self.error().map_or(1, |x| x.span())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.provenance, Provenance::Pending { .. })
    }

    pub fn set_error(&mut self, error: TokenError) {
        self.provenance = Provenance::Resolved(error);
    }

    pub fn with_error(mut self, error: TokenError) -> Self {
        self.set_error(error);
        self
    }

    /// Marks this token as the continuation of a replacement made on an earlier token.
    pub fn set_pending<S: Into<String>>(&mut self, original: S) {
        self.provenance = Provenance::Pending {
            original: original.into(),
        };
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_carry_prefix_and_warning() {
        let error = TokenError::new(ErrorKind::Compound, "004", "'á' er að öllum líkindum ofaukið");
        assert_eq!(error.code(), "C004/w");

        let error = TokenError::new(ErrorKind::UnknownWord, "001", "Óþekkt orð: 'x'").warning(true);
        assert_eq!(error.code(), "U001/w");

        let error = TokenError::new(ErrorKind::Phrase, "YI", "x").with_span(2);
        assert_eq!(error.code(), "P_YI");
        assert_eq!(error.span(), 2);
    }

    #[test]
    fn coalesce_resets_span() {
        let mut first = Token::word("fimm", vec![]);
        first.set_pending("fimm");
        let second = Token::word("hundruð", vec![])
            .with_error(TokenError::new(ErrorKind::Phrase, "X", "x").with_span(3));

        let merged = Token::merged(&[first, second], "fimm hundruð", vec![]);
        assert_eq!(merged.error_span(), 1);
        assert_eq!(merged.error_code(), "P_X");
        assert_eq!(merged.consumed, 2);
        assert_eq!(merged.original_text(), "fimm hundruð");
    }

    #[test]
    fn replacement_copies_provenance() {
        let token = Token::word("kvenær", vec![])
            .with_error(TokenError::new(ErrorKind::Spelling, "001", "x"));
        let replaced = token.replaced("hvenær", vec![]);

        assert_eq!(replaced.error_code(), "S001");
        assert_eq!(replaced.original_text(), "kvenær");
    }
}
