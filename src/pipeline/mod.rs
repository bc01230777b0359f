//! The token correction pipeline.
//!
//! The stages run in a fixed order, each transforming the token list of one sentence:
//! 1. [duplicates, wrongly joined and split compounds, punctuation](compound::parse_errors)
//! 2. [compound words with invalid prefixes](compound::fix_compound_words)
//! 3. [multiword error phrases](multiword::fix_phrases)
//! 4. [unknown and rare words](unknown::fix_unknown_words)
//! 5. [capitalization](capitalization::fix_capitalization)
//! 6. [taboo words](taboo::check_taboo_words)
//! 7. [capitalization of numbers, amounts and dates](capitalization::late_fix_capitalization)
//!
//! In [context-independent mode](Pipeline::only_ci) corrections which depend on the
//! surrounding words or on statistics are skipped: duplicates, abbreviations, split
//! compounds, multiword phrases, spelling correction and taboo words.
//!
//! Words are looked up in the lexicon after the first stage. No stage fails: tokens which
//! cannot be corrected are marked with an error instead.

use log::debug;

use crate::{
    config::RuleTables,
    properties::Lexicon,
    spell::Corrector,
    types::{Token, TokenKind},
};

pub mod capitalization;
pub mod compound;
pub mod multiword;
pub mod taboo;
pub mod unknown;

/// The pipeline over the shared rule tables, lexicon and spelling corrector.
#[derive(Clone, Copy)]
pub struct Pipeline<'a> {
    tables: &'a RuleTables,
    lexicon: &'a dyn Lexicon,
    corrector: Option<&'a Corrector>,
    apply_suggestions: bool,
    only_ci: bool,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline without spelling correction. Unknown words are only flagged.
    pub fn new(tables: &'a RuleTables, lexicon: &'a dyn Lexicon) -> Self {
        Pipeline {
            tables,
            lexicon,
            corrector: None,
            apply_suggestions: false,
            only_ci: false,
        }
    }

    pub fn with_corrector(mut self, corrector: &'a Corrector) -> Self {
        self.corrector = Some(corrector);
        self
    }

    /// Whether to apply spelling corrections the corrector is not confident about.
    /// If `false`, those are only suggested.
    pub fn apply_suggestions(mut self, apply_suggestions: bool) -> Self {
        self.apply_suggestions = apply_suggestions;
        self
    }

    /// Whether to make only context-independent corrections.
    pub fn only_ci(mut self, only_ci: bool) -> Self {
        self.only_ci = only_ci;
        self
    }

    pub fn is_only_ci(&self) -> bool {
        self.only_ci
    }

    pub fn tables(&self) -> &'a RuleTables {
        self.tables
    }

    pub fn lexicon(&self) -> &'a dyn Lexicon {
        self.lexicon
    }

    pub fn corrector(&self) -> Option<&'a Corrector> {
        self.corrector
    }

    /// A fresh word token for `text` with its meanings.
    pub(crate) fn word(&self, text: &str, at_sentence_start: bool) -> Token {
        let (word, meanings) = self.lexicon.lookup(text, at_sentence_start);
        Token::word(word, meanings)
    }

    /// A word token for `text` replacing `token`, keeping its provenance.
    pub(crate) fn replace(&self, token: &Token, text: &str, at_sentence_start: bool) -> Token {
        let (word, meanings) = self.lexicon.lookup(text, at_sentence_start);
        token.replaced(word, meanings)
    }

    /// Looks up every word which has no meanings yet.
    pub fn annotate_meanings(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut at_sentence_start = false;

        tokens
            .into_iter()
            .map(|mut token| {
                match token.kind {
                    TokenKind::SentenceBegin => at_sentence_start = true,
                    TokenKind::Punctuation | TokenKind::Ordinal => {}
                    TokenKind::Word => {
                        if !token.has_meanings() {
                            token.meanings = self.lexicon.lookup(&token.text, at_sentence_start).1;
                        }
                        at_sentence_start = false;
                    }
                    _ => at_sentence_start = false,
                }
                token
            })
            .collect()
    }

    /// Runs all stages on the tokens of one sentence. A sentence begin token is added if
    /// missing. The returned tokens contain no sentence begin and end tokens.
    pub fn run(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        if tokens.first().map(|x| x.kind) != Some(TokenKind::SentenceBegin) {
            tokens.insert(0, Token::sentence_begin());
        }

        let tokens = compound::parse_errors(self, tokens);
        let tokens = self.annotate_meanings(tokens);
        let tokens = compound::fix_compound_words(self, tokens);
        let tokens = if self.only_ci {
            tokens
        } else {
            multiword::fix_phrases(self, tokens)
        };
        let tokens = unknown::fix_unknown_words(self, tokens);
        let tokens = capitalization::fix_capitalization(self, tokens);
        let tokens = if self.only_ci {
            tokens
        } else {
            taboo::check_taboo_words(self, tokens)
        };
        let tokens = capitalization::late_fix_capitalization(tokens);

        let tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|x| !x.kind.is_sentence_boundary())
            .collect();
        debug!(
            "pipeline: {} tokens, {} with errors",
            tokens.len(),
            tokens.iter().filter(|x| x.error().is_some()).count()
        );
        tokens
    }
}

/// Names a set of lexicon categories in Icelandic, e. g. "lýsingarorð eða nafnorð".
pub(crate) fn describe_categories<'c, I: IntoIterator<Item = &'c str>>(categories: I) -> String {
    let mut names: Vec<&str> = Vec::new();
    for category in categories {
        let name = match category {
            "lo" => "lýsingarorð",
            "ao" => "atviksorð",
            "kk" | "hk" | "kvk" => "nafnorð",
            "so" => "sagnorð",
            _ => continue,
        };
        if !names.contains(&name) {
            names.push(name);
        }
    }

    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} eða {}", rest.join(", "), last),
    }
}
