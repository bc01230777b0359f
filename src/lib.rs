//! Rule-based spelling and grammar checking for Icelandic.
//! # Overview
//!
//! malrynir has the following core abstractions:
//! - A [Pipeline][pipeline::Pipeline] of token-level corrections: duplicated words, wrongly
//!   split and joined compounds, error phrases, unknown words, capitalization and taboo words.
//! - A [Corrector][spell::Corrector] for spelling errors, ranking candidates with an n-gram model.
//! - The [ErrorFinder][errfinder::ErrorFinder] and the tree [Rules][rules::Rules], which find
//!   grammatical errors in the parse tree of a sentence.
//! - A [Checker][checker::Checker] which runs all of the above for each sentence and returns
//!   [Annotation][annotation::Annotation]s.
//!
//! Tokenization, morphological lookup, n-gram statistics and parsing are not part of this
//! crate, the checker consumes them through the traits in [properties]. Simple in-memory
//! implementations live in [components].
//!
//! # Examples
//!
//! Check a sentence:
//!
//! ```
//! use std::sync::Arc;
//! use malrynir::{
//!     checker::{CheckOptions, Checker},
//!     components::{lexicon::MemoryLexicon, ngram::MemoryNgrams, tokenizer::SimpleTokenizer},
//!     config::RuleTables,
//!     tree::Tree,
//!     types::{Meaning, Token},
//! };
//!
//! let lexicon = MemoryLexicon::from_meanings(vec![
//!     Meaning::new("ég", "ég", "pfn", "nf_et"),
//!     Meaning::new("mér", "ég", "pfn", "þgf_et"),
//!     Meaning::new("vantar", "vanta", "so", "fh_nt_p3_et"),
//!     Meaning::new("bók", "bók", "kvk", "þf_et"),
//! ]);
//! let tables = RuleTables::from_str("[verb_subjects]\nvanta nf þgf\n")?;
//! let parser = |_: &[Token]| {
//!     Tree::from_bracketed(
//!         "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_1_þf_et_p3 vantar 'vanta') \
//!          (NP-OBJ (no_et_þf_kvk bók 'bók')))))",
//!     )
//!     .ok()
//! };
//!
//! let checker = Checker::new(
//!     Arc::new(tables),
//!     Arc::new(lexicon),
//!     Arc::new(MemoryNgrams::from_counts(vec![])),
//!     Arc::new(parser),
//!     CheckOptions { correct_spelling: false, ..CheckOptions::default() },
//! )?;
//!
//! let sentences = checker.check(&SimpleTokenizer::default(), "Ég vantar bók");
//! let annotation = &sentences[0].annotations()[0];
//! assert_eq!(annotation.code(), "P_WRONG_CASE_nf_þgf");
//! assert_eq!(annotation.suggest(), Some("Mér"));
//! assert_eq!(sentences[0].corrected(), "Mér vantar bók");
//! # Ok::<(), malrynir::Error>(())
//! ```

use std::io;

use thiserror::Error;

pub mod annotation;
pub mod checker;
pub mod components;
pub mod config;
pub mod correct;
pub mod errfinder;
pub mod pipeline;
pub mod properties;
pub mod rules;
pub mod spell;
pub mod tree;
pub mod types;
pub mod utils;

#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// (De)serialization error. Can have occured during deserialization or during serialization.
    #[error(transparent)]
    Serialization(#[from] bincode::Error),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Pattern(#[from] tree::pattern::Error),
    #[error(transparent)]
    Tree(#[from] tree::Error),
    #[error("malformed lexicon line {line}: {message}")]
    Lexicon { line: usize, message: String },
    #[error("malformed n-gram line {line}: {message}")]
    Ngram { line: usize, message: String },
}
