//! Checking sentences from start to end: the token pipeline, parsing, the error finder
//! and the tree rules.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    annotation::{self, Annotation, Precedence},
    config::RuleTables,
    correct::apply_corrections,
    errfinder::ErrorFinder,
    pipeline::Pipeline,
    properties::{Lexicon, NgramModel, Parser, Tokenize},
    rules::Rules,
    spell::{Corrector, SpellOptions},
    tree::Tree,
    types::Token,
    utils, Error,
};

/// Options for a [Checker].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Whether to correct rare and unknown words with the spelling corrector.
    pub correct_spelling: bool,
    /// Whether to apply spelling corrections the corrector is not confident about.
    /// If `false`, those are only suggested (W001/w).
    pub apply_suggestions: bool,
    /// Only make corrections which do not depend on the surrounding words.
    pub only_ci: bool,
    pub spell: SpellOptions,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            correct_spelling: true,
            apply_suggestions: false,
            only_ci: false,
            spell: SpellOptions::default(),
        }
    }
}

/// A checked sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    tokens: Vec<Token>,
    tree: Option<Tree>,
    annotations: Vec<Annotation>,
}

impl Sentence {
    /// The tokens after the correction pipeline. Annotation spans index into these.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The parse tree, `None` if the sentence could not be parsed.
    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// The annotations in the order they were found.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The annotations sorted by start and then by decreasing end.
    pub fn sorted_annotations(&self) -> Vec<Annotation> {
        let mut annotations = self.annotations.clone();
        annotation::sort_for_display(&mut annotations);
        annotations
    }

    /// The text as it was before any correction.
    pub fn original(&self) -> String {
        let texts: Vec<&str> = self
            .tokens
            .iter()
            .filter(|x| x.consumed > 0)
            .map(|x| x.original_text())
            .collect();
        utils::detokenize(&texts)
    }

    /// The text after the correction pipeline.
    pub fn text(&self) -> String {
        utils::detokenize(&self.tokens)
    }

    /// The text with the suggestions of all errors applied. Warnings are not applied.
    pub fn corrected(&self) -> String {
        let errors: Vec<Annotation> = self
            .annotations
            .iter()
            .filter(|x| x.is_error())
            .cloned()
            .collect();
        utils::detokenize(&apply_corrections(&self.tokens, &errors))
    }

    /// The character offset of each token in [text][Sentence::text], followed by the length
    /// of the text.
    pub fn char_offsets(&self) -> Vec<usize> {
        let (text, mut offsets) = utils::detokenize_with_offsets(&self.tokens);
        offsets.push(text.chars().count());
        offsets
    }

    /// The sentence in the JSON format of the command line tool.
    #[cfg(feature = "serde_json")]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let offsets = self.char_offsets();
        let end_char = |end: usize| {
            let length = self.tokens.get(end).map_or(0, |x| x.text.chars().count());
            offsets.get(end).copied().unwrap_or(0) + length.saturating_sub(1)
        };

        let tokens: Vec<serde_json::Value> = self
            .tokens
            .iter()
            .map(|x| json!({ "k": x.kind, "x": x.text, "o": x.original_text() }))
            .collect();
        let annotations: Vec<serde_json::Value> = self
            .sorted_annotations()
            .iter()
            .map(|x| {
                json!({
                    "start": x.start(),
                    "end": x.end(),
                    "start_char": offsets.get(x.start()).copied().unwrap_or(0),
                    "end_char": end_char(x.end()),
                    "code": x.code(),
                    "text": x.text(),
                    "detail": x.detail(),
                    "suggest": x.suggest(),
                    "original": x.original(),
                })
            })
            .collect();

        json!({
            "original": self.original(),
            "corrected": self.corrected(),
            "tokens": tokens,
            "annotations": annotations,
        })
    }
}

/// Annotations for the errors the pipeline attached to tokens.
fn token_annotations(tokens: &[Token]) -> Vec<Annotation> {
    let last = tokens.len().saturating_sub(1);

    tokens
        .iter()
        .enumerate()
        .filter_map(|(i, token)| {
            let error = token.error()?;
            let end = (i + error.span() - 1).min(last);
            let mut annotation = Annotation::new(i, end, error.code(), error.text())
                .with_optional_suggestion(error.suggest().map(String::from));
            if let Some(original) = &token.original {
                annotation = annotation.with_original(original.as_str());
            }
            Some(annotation)
        })
        .collect()
}

/// Checks sentences for spelling and grammar errors.
pub struct Checker {
    tables: Arc<RuleTables>,
    lexicon: Arc<dyn Lexicon>,
    parser: Arc<dyn Parser>,
    corrector: Option<Corrector>,
    rules: Rules,
    precedence: Precedence,
    options: CheckOptions,
}

impl Checker {
    /// Creates a checker. The tree rules are built from `tables`.
    pub fn new(
        tables: Arc<RuleTables>,
        lexicon: Arc<dyn Lexicon>,
        ngrams: Arc<dyn NgramModel>,
        parser: Arc<dyn Parser>,
        options: CheckOptions,
    ) -> Result<Self, Error> {
        let rules = Rules::new(&tables)?;
        let corrector = if options.correct_spelling {
            Some(Corrector::new(
                lexicon.clone(),
                ngrams,
                options.spell.clone(),
            ))
        } else {
            None
        };
        info!("checker ready with {} tree rules", rules.rules().len());

        Ok(Checker {
            tables,
            lexicon,
            parser,
            corrector,
            rules,
            precedence: Precedence::default(),
            options,
        })
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Replaces the order in which annotations at the same span supersede each other.
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    fn pipeline(&self) -> Pipeline {
        let pipeline = Pipeline::new(&self.tables, self.lexicon.as_ref())
            .apply_suggestions(self.options.apply_suggestions)
            .only_ci(self.options.only_ci);
        match &self.corrector {
            Some(corrector) => pipeline.with_corrector(corrector),
            None => pipeline,
        }
    }

    /// Checks the tokens of one sentence.
    pub fn check_tokens(&self, tokens: Vec<Token>) -> Sentence {
        let tokens = self.pipeline().run(tokens);
        let mut annotations = token_annotations(&tokens);

        let tree = if tokens.is_empty() {
            None
        } else {
            self.parser.parse(&tokens)
        };
        match &tree {
            Some(tree) => {
                annotations.extend(ErrorFinder::new(tree, self.lexicon.as_ref(), &self.tables).run());
                annotations.extend(self.rules.apply(tree, self.lexicon.as_ref()));
            }
            None if !tokens.is_empty() => {
                debug!("no parse for '{}'", utils::detokenize(&tokens));
                annotations.push(Annotation::new(
                    0,
                    tokens.len() - 1,
                    "E001",
                    "Ekki tókst að þátta setninguna",
                ));
            }
            None => {}
        }

        Sentence {
            annotations: self.precedence.resolve(annotations),
            tokens,
            tree,
        }
    }

    /// Splits `text` into sentences and checks each of them.
    pub fn check<T: Tokenize>(&self, tokenizer: &T, text: &str) -> Vec<Sentence> {
        tokenizer
            .tokenize(text)
            .into_iter()
            .map(|tokens| self.check_tokens(tokens))
            .collect()
    }
}
