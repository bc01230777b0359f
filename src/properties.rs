//! The collaborator traits the checker is built on.
//!
//! Tokenization, morphological lookup, n-gram statistics and parsing are provided from
//! outside the checker. In-memory implementations of the first three live in
//! [components][crate::components].

use crate::{
    tree::Tree,
    types::{Meaning, Token, WordForm},
};

pub use lexicon::Lexicon;
pub use ngram::NgramModel;
pub use parse::Parser;
pub use tokenize::Tokenize;

pub mod tokenize {
    use super::*;

    /// Splits a text into sentences of tokens.
    pub trait Tokenize {
        /// Returns one vector of tokens per sentence. Sentences may, but need not, be
        /// delimited by [SentenceBegin][crate::types::TokenKind::SentenceBegin] and
        /// [SentenceEnd][crate::types::TokenKind::SentenceEnd] tokens.
        fn tokenize(&self, text: &str) -> Vec<Vec<Token>>;
    }

    impl<'a, T> Tokenize for &'a T
    where
        T: Tokenize,
    {
        fn tokenize(&self, text: &str) -> Vec<Vec<Token>> {
            (*self).tokenize(text)
        }
    }
}

pub mod lexicon {
    use super::*;

    /// Morphological lookup of word forms.
    pub trait Lexicon: Send + Sync {
        /// Returns the normalized word and its meanings. An empty vector means the word is
        /// unknown. At the start of a sentence a capitalized word may be found in lowercase.
        fn lookup(&self, word: &str, at_sentence_start: bool) -> (String, Vec<Meaning>);

        /// Inflects the word form `word` of category `category`: returns the forms of the same
        /// lemma whose variants equal those of `word` with the given variants swapped in.
        /// `gr` requests the definite form and `nogr` the indefinite one.
        fn lookup_variants(&self, word: &str, category: &str, variants: &[&str]) -> Vec<WordForm>;

        fn meanings(&self, word: &str) -> Vec<Meaning> {
            self.lookup(word, false).1
        }

        fn contains(&self, word: &str) -> bool {
            !self.meanings(word).is_empty()
        }
    }

    impl<'a, T> Lexicon for &'a T
    where
        T: Lexicon,
    {
        fn lookup(&self, word: &str, at_sentence_start: bool) -> (String, Vec<Meaning>) {
            (*self).lookup(word, at_sentence_start)
        }

        fn lookup_variants(&self, word: &str, category: &str, variants: &[&str]) -> Vec<WordForm> {
            (*self).lookup_variants(word, category, variants)
        }
    }
}

pub mod ngram {
    /// Statistics over word n-grams.
    pub trait NgramModel: Send + Sync {
        /// The natural log probability of the last word given the preceding ones.
        fn logprob(&self, ngram: &[&str]) -> f64;

        /// The absolute frequency of the n-gram.
        fn freq(&self, ngram: &[&str]) -> u64;
    }

    impl<'a, T> NgramModel for &'a T
    where
        T: NgramModel,
    {
        fn logprob(&self, ngram: &[&str]) -> f64 {
            (*self).logprob(ngram)
        }

        fn freq(&self, ngram: &[&str]) -> u64 {
            (*self).freq(ngram)
        }
    }
}

pub mod parse {
    use super::*;

    /// A constituency parser. Returns `None` if the sentence could not be parsed.
    pub trait Parser: Send + Sync {
        fn parse(&self, tokens: &[Token]) -> Option<Tree>;
    }

    impl<F> Parser for F
    where
        F: Fn(&[Token]) -> Option<Tree> + Send + Sync,
    {
        fn parse(&self, tokens: &[Token]) -> Option<Tree> {
            self(tokens)
        }
    }
}
