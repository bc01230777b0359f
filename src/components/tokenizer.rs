//! A simple tokenizer based on Unicode segmentation rules.
//!
//! Tokens carry no meanings, the checker looks every word up in its lexicon.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    properties::Tokenize,
    types::{Token, TokenKind},
};

/// Options for the [SimpleTokenizer].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    /// Whether to delimit sentences with sentence begin and end tokens.
    pub sentence_markers: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        TokenizerOptions {
            sentence_markers: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleTokenizer {
    options: TokenizerOptions,
}

fn kind_of(text: &str) -> Option<TokenKind> {
    if text.chars().all(char::is_whitespace) {
        None
    } else if text.chars().any(char::is_alphabetic) {
        Some(TokenKind::Word)
    } else if text.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        Some(TokenKind::Number)
    } else if text.chars().all(|c| !c.is_alphanumeric()) {
        Some(TokenKind::Punctuation)
    } else {
        Some(TokenKind::Other)
    }
}

// runs like `..`, `?!` and `,,` are kept together
fn joins(previous: &str, next: &str) -> bool {
    let (a, b) = match (previous.chars().last(), next.chars().next()) {
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };
    let terminal = |c: char| matches!(c, '.' | '?' | '!');

    (terminal(a) && terminal(b)) || (a == b && matches!(a, ',' | '\''))
}

impl SimpleTokenizer {
    pub fn new(options: TokenizerOptions) -> Self {
        SimpleTokenizer { options }
    }

    fn tokenize_sentence(&self, sentence: &str) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();
        // end byte offset of the last token, to detect adjacency
        let mut last_end = None;

        for (start, part) in sentence.split_word_bound_indices() {
            let kind = match kind_of(part) {
                Some(kind) => kind,
                None => continue,
            };

            let adjacent = last_end == Some(start);
            last_end = Some(start + part.len());

            if let Some(previous) = tokens.last_mut() {
                if adjacent
                    && kind == TokenKind::Punctuation
                    && previous.kind == TokenKind::Punctuation
                    && joins(&previous.text, part)
                {
                    previous.text.push_str(part);
                    continue;
                }
                // `3.` followed by more words is an ordinal
                if adjacent && part == "." && previous.kind == TokenKind::Number {
                    let rest = &sentence[start + 1..];
                    if rest.chars().any(char::is_alphanumeric) {
                        previous.text.push('.');
                        previous.kind = TokenKind::Ordinal;
                        continue;
                    }
                }
            }

            tokens.push(Token::new(kind, part));
        }

        if self.options.sentence_markers && !tokens.is_empty() {
            tokens.insert(0, Token::sentence_begin());
            tokens.push(Token::sentence_end());
        }
        tokens
    }
}

impl Tokenize for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Vec<Token>> {
        text.unicode_sentences()
            .map(|sentence| self.tokenize_sentence(sentence))
            .filter(|tokens| !tokens.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|x| x.text.as_str()).collect()
    }

    #[test]
    fn splits_sentences_and_words() {
        let tokenizer = SimpleTokenizer::default();
        let sentences = tokenizer.tokenize("Ég fer heim. Hún kemur á 3. degi.");

        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0][0].kind, TokenKind::SentenceBegin);
        assert_eq!(texts(&sentences[0][1..4]), vec!["Ég", "fer", "heim"]);
        assert_eq!(sentences[1][4].kind, TokenKind::Ordinal);
        assert_eq!(sentences[1][4].text, "3.");
    }

    #[test]
    fn keeps_punctuation_runs() {
        let tokenizer = SimpleTokenizer::new(TokenizerOptions {
            sentence_markers: false,
        });
        let tokens = tokenizer.tokenize("Hvað??!").remove(0);
        assert_eq!(texts(&tokens), vec!["Hvað", "??!"]);
    }
}
