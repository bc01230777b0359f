//! Multiword phrases which are wrong as a whole.

use log::debug;

use super::Pipeline;
use crate::{
    config::MultiwordError,
    types::{ErrorKind, Token, TokenError},
    utils,
};

/// The longest phrase of `multiword_errors` starting at `tokens[0]`.
fn longest_match<'t>(pipeline: &Pipeline<'t>, tokens: &[Token]) -> Option<&'t MultiwordError> {
    let tables = pipeline.tables();
    let first = tokens.first().filter(|x| x.is_word())?;
    let candidates = tables.multiword_index.get(&first.text.to_lowercase())?;

    candidates
        .iter()
        .map(|i| &tables.multiword_errors[*i])
        .filter(|phrase| {
            phrase.phrase.len() <= tokens.len()
                && phrase
                    .phrase
                    .iter()
                    .zip(tokens)
                    .all(|(word, token)| token.is_word() && token.text.to_lowercase() == *word)
        })
        .max_by_key(|phrase| phrase.phrase.len())
}

/// The third correction stage: replaces phrases of `multiword_errors`.
///
/// The first replacement token carries the error, spanning the whole replacement.
/// The others are marked as pending so later stages leave them alone.
pub fn fix_phrases(pipeline: &Pipeline, tokens: Vec<Token>) -> Vec<Token> {
    if pipeline.tables().multiword_errors.is_empty() {
        return tokens;
    }

    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let phrase = match longest_match(pipeline, &tokens[i..]) {
            Some(phrase) => phrase,
            None => {
                out.push(tokens[i].clone());
                i += 1;
                continue;
            }
        };

        let matched = &tokens[i..i + phrase.phrase.len()];
        let original = matched
            .iter()
            .map(|x| x.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let replacement = phrase.replacement.join(" ");
        debug!("phrase '{}' replaced by '{}'", original, replacement);

        for (j, word) in phrase.replacement.iter().enumerate() {
            let (mut word, meanings) = pipeline.lexicon().lookup(word, false);

            if j == 0 {
                if utils::is_title_case(&matched[0].text) {
                    word = utils::title(&word);
                }
                let message = format!(
                    "Orðasambandið '{}' var leiðrétt í '{}'",
                    original, replacement
                );
                let error = TokenError::new(ErrorKind::Phrase, &phrase.code, message)
                    .with_span(phrase.replacement.len());
                out.push(Token::merged(matched, word, meanings).with_error(error));
            } else {
                let mut token = Token::word(word, meanings);
                token.consumed = 0;
                token.set_pending(original.as_str());
                out.push(token);
            }
        }

        i += phrase.phrase.len();
    }

    out
}
