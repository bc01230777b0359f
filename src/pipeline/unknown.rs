//! Unknown and rare words: known misspellings, spelling correction and unknown word flags.

use log::debug;

use super::Pipeline;
use crate::{
    types::{ErrorKind, Meaning, Provenance, Token, TokenError, TokenKind},
    utils,
};

/// Letters which do not occur in Icelandic words.
const NON_ICELANDIC_LETTERS: &str = "cwqøâãäçĉčêëîïñôõûüÿßĳ";

/// The only allowed corrections of single letter words, by sentence start and letter.
const SINGLE_LETTER: &[(bool, &str, &str)] = &[
    (false, "a", "á"),
    (false, "i", "í"),
    (true, "A", "Á"),
    (true, "I", "Í"),
];

fn closing_bracket(text: &str) -> Option<&'static str> {
    match text {
        "(" => Some(")"),
        "[" => Some("]"),
        "{" => Some("}"),
        _ => None,
    }
}

fn spelling_message(original: &str, corrected: &str) -> String {
    if corrected.contains('.') {
        format!("Skammstöfunin '{}' var leiðrétt í '{}'", original, corrected)
    } else {
        format!("Orðið '{}' var leiðrétt í '{}'", original, corrected)
    }
}

/// Words which must not be corrected: abbreviations without inflection and all uppercase words.
fn is_immune(token: &Token) -> bool {
    (token.meanings.len() == 1 && token.meanings[0].inflection == "-")
        || utils::is_uppercase(&token.text)
}

/// Whether a correction of `token` to a word with `meanings` should only be suggested.
fn only_suggest(token: &Token, meanings: &[Meaning]) -> bool {
    let length = token.text.chars().count();
    if (2..=4).contains(&length) && utils::is_uppercase(&token.text) {
        return true;
    }
    if token
        .text
        .to_lowercase()
        .chars()
        .any(|c| NON_ICELANDIC_LETTERS.contains(c))
    {
        return true;
    }

    match token.meanings.first() {
        None => false,
        Some(meaning) if !meaning.is_compound() => true,
        Some(_) => meanings.first().map_or(true, |x| x.is_compound()),
    }
}

/// Whether `corrected` is an acceptable correction of `word`.
fn is_acceptable(word: &str, corrected: &str, meanings: &[Meaning], at_sentence_start: bool) -> bool {
    let mut chars = word.chars();
    let first = chars.next();

    if matches!(first, Some('ó') | Some('Ó')) && corrected == chars.as_str() {
        return false;
    }
    if meanings.is_empty() && utils::starts_uppercase(word) {
        return false;
    }
    if word.chars().count() == 1 {
        return SINGLE_LETTER
            .iter()
            .any(|(start, from, to)| *start == at_sentence_start && *from == word && *to == corrected);
    }
    true
}

/// The sliding window of preceding words.
#[derive(Default)]
struct Context {
    words: Vec<String>,
}

impl Context {
    fn push(&mut self, text: &str) {
        self.words.extend(text.split_whitespace().map(String::from));
        let excess = self.words.len().saturating_sub(2);
        self.words.drain(..excess);
    }

    fn as_slice(&self) -> Vec<&str> {
        self.words.iter().map(|x| x.as_str()).collect()
    }
}

/// The fourth correction stage.
///
/// Applies `unique_errors` (S001) and context-independent error forms (S002). Unknown or
/// rare words are handed to the spelling corrector: a correction is applied (S004) or only
/// suggested (W001). Words which remain unknown are flagged (U001), as warnings if they
/// start with an uppercase letter or are inside brackets. In context-independent mode
/// the spelling corrector is not consulted.
pub fn fix_unknown_words(pipeline: &Pipeline, tokens: Vec<Token>) -> Vec<Token> {
    let tables = pipeline.tables();
    let sentence_upper = tokens
        .iter()
        .filter(|x| x.is_word())
        .all(|x| utils::is_uppercase(&x.text));

    let mut out = Vec::with_capacity(tokens.len());
    let mut at_sentence_start = false;
    let mut context = Context::default();
    let mut brackets: Vec<&'static str> = Vec::new();

    for mut token in tokens {
        match token.kind {
            TokenKind::SentenceBegin => {
                at_sentence_start = true;
                context = Context::default();
                brackets.clear();
                out.push(token);
                continue;
            }
            TokenKind::Punctuation | TokenKind::Ordinal => {
                if let Some(closing) = closing_bracket(&token.text) {
                    brackets.push(closing);
                } else if brackets.last() == Some(&token.text.as_str()) {
                    brackets.pop();
                }
                context.push(&token.text);
                out.push(token);
                continue;
            }
            TokenKind::Word if !token.text.contains(' ') => {}
            _ => {
                context.push(&token.text);
                at_sentence_start = false;
                out.push(token);
                continue;
            }
        }

        if let Some(corrected) = tables.unique_errors.get(&token.text) {
            let display = corrected.join(" ");
            for (i, word) in corrected.iter().enumerate() {
                let new = if i == 0 {
                    let message = spelling_message(&token.text, &display);
                    pipeline
                        .replace(&token, word, at_sentence_start)
                        .with_error(TokenError::new(ErrorKind::Spelling, "001", message))
                } else {
                    let mut new = pipeline.word(word, false);
                    new.consumed = 0;
                    new.set_pending(token.text.as_str());
                    new
                };
                context.push(&new.text);
                out.push(new);
                at_sentence_start = false;
            }
            continue;
        }

        if token.error().is_some() {
            context.push(&token.text);
            out.push(token);
            at_sentence_start = false;
            continue;
        }

        if !token.has_meanings() {
            if let Some(corrected) = tables.correct_error_form(&token.text) {
                let message = spelling_message(&token.text, &corrected);
                let new = pipeline
                    .replace(&token, &corrected, at_sentence_start)
                    .with_error(TokenError::new(ErrorKind::Spelling, "002", message));
                context.push(&new.text);
                out.push(new);
                at_sentence_start = false;
                continue;
            }
        }

        if let Some(corrector) = pipeline.corrector().filter(|_| !pipeline.is_only_ci()) {
            if !is_immune(&token)
                && !token.is_pending()
                && (!token.has_meanings() || corrector.is_rare(&token.text, sentence_upper))
            {
                let corrected = corrector.correct(&token.text, &context.as_slice(), at_sentence_start);

                if corrected != token.text {
                    let (word, meanings) = pipeline.lexicon().lookup(&corrected, at_sentence_start);

                    if is_acceptable(&token.text, &corrected, &meanings, at_sentence_start) {
                        if !pipeline.apply_suggestions && only_suggest(&token, &meanings) {
                            debug!("suggested '{}' instead of '{}'", corrected, token.text);
                            let message =
                                format!("Orðið '{}' gæti átt að vera '{}'", token.text, corrected);
                            let error =
                                TokenError::new(ErrorKind::SpellingSuggestion, "001", message)
                                    .with_suggestion(corrected);
                            context.push(&token.text);
                            out.push(token.with_error(error));
                        } else {
                            debug!("corrected '{}' to '{}'", token.text, corrected);
                            let message = spelling_message(&token.text, &corrected);
                            let new = token
                                .replaced(word, meanings)
                                .with_error(TokenError::new(ErrorKind::Spelling, "004", message));
                            context.push(&new.text);
                            out.push(new);
                        }
                        at_sentence_start = false;
                        continue;
                    }
                }
            }
        }

        if !token.has_meanings() {
            let message = format!("Óþekkt orð: '{}'", token.text);
            let is_warning = utils::starts_uppercase(&token.text) || !brackets.is_empty();
            token.set_error(TokenError::new(ErrorKind::UnknownWord, "001", message).warning(is_warning));
        }
        if token.is_pending() {
            token.provenance = Provenance::NoError;
        }

        context.push(&token.text);
        out.push(token);
        at_sentence_start = false;
    }

    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        components::{lexicon::MemoryLexicon, ngram::MemoryNgrams},
        config::RuleTables,
        pipeline::tests::{texts, words},
        spell::{Corrector, SpellOptions},
    };

    fn lexicon() -> MemoryLexicon {
        MemoryLexicon::from_meanings(vec![
            Meaning::new("hvenær", "hvenær", "ao", "-"),
            Meaning::new("kemur", "koma", "so", "fh_nt_p3_et"),
            Meaning::new("hann", "hann", "pfn", "kk_nf_et"),
            Meaning::new("heim", "heim", "ao", "-"),
            Meaning::new("kvenmaður", "kven-maður", "kk", "nf_et"),
            Meaning::new("á", "á", "fs", "þgf"),
            Meaning::new("á", "eiga", "so", "fh_nt_p3_et"),
        ])
    }

    fn corrector(lexicon: &MemoryLexicon) -> Corrector {
        let sentences = vec![
            vec!["hvenær", "kemur", "hann", "heim"],
            vec!["hann", "kemur", "heim"],
            vec!["hvenær", "á", "hann"],
        ];
        let ngrams = MemoryNgrams::from_sentences(&sentences, 2);
        let options = SpellOptions {
            accept_threshold: -3.0,
            min_freq: 1,
            ..SpellOptions::default()
        };
        Corrector::new(Arc::new(lexicon.clone()), Arc::new(ngrams), options)
    }

    fn tables() -> RuleTables {
        RuleTables::from_str(
            "[unique_errors]\n\"afþví\", \"af því\"\n\n\
             [error_forms]\nkvennmaður;kvenmaður;kvenmaður;1;kk;nf_et;cid\n",
        )
        .unwrap()
    }

    fn run(texts: &[&str], apply_suggestions: bool) -> Vec<Token> {
        run_with(texts, apply_suggestions, false)
    }

    fn run_with(texts: &[&str], apply_suggestions: bool, only_ci: bool) -> Vec<Token> {
        let tables = tables();
        let lexicon = lexicon();
        let corrector = corrector(&lexicon);
        let pipeline = Pipeline::new(&tables, &lexicon)
            .with_corrector(&corrector)
            .apply_suggestions(apply_suggestions)
            .only_ci(only_ci);

        let tokens = pipeline.annotate_meanings(words(texts));
        fix_unknown_words(&pipeline, tokens)
    }

    #[test]
    fn applies_unique_errors() {
        let tokens = run(&["hann", "kemur", "afþví"], false);

        assert_eq!(texts(&tokens), vec!["hann", "kemur", "af", "því"]);
        assert_eq!(tokens[3].error_code(), "S001");
        assert_eq!(
            tokens[3].error().unwrap().text(),
            "Orðið 'afþví' var leiðrétt í 'af því'"
        );
        assert!(tokens[4].is_pending());
    }

    #[test]
    fn applies_error_forms() {
        let tokens = run(&["kvennmaður"], false);

        assert_eq!(texts(&tokens), vec!["kvenmaður"]);
        assert_eq!(tokens[1].error_code(), "S002");
        assert!(tokens[1].has_meanings());
    }

    #[test]
    fn corrects_unknown_words() {
        let tokens = run(&["hann", "kemr", "heim"], false);

        assert_eq!(texts(&tokens), vec!["hann", "kemur", "heim"]);
        assert_eq!(tokens[2].error_code(), "S004");
        assert_eq!(tokens[2].original_text(), "kemr");
    }

    #[test]
    fn only_flags_unknown_words_without_context() {
        let tokens = run_with(&["hann", "kemr", "heim"], false, true);

        assert_eq!(texts(&tokens), vec!["hann", "kemr", "heim"]);
        assert_eq!(tokens[2].error_code(), "U001");

        // error forms do not depend on context
        let tokens = run_with(&["kvennmaður"], false, true);
        assert_eq!(tokens[1].error_code(), "S002");
    }

    #[test]
    fn flags_unknown_words() {
        let tokens = run(&["hann", "xqzzy", "(", "Blöbb", ")"], false);

        assert_eq!(tokens[2].error_code(), "U001");
        assert_eq!(tokens[4].error_code(), "U001/w");
        assert!(tokens[1].error().is_none());
    }

    #[test]
    fn leaves_single_letters() {
        // only a -> á and i -> í are allowed
        let tokens = run(&["hann", "e", "heim"], false);
        assert_eq!(texts(&tokens), vec!["hann", "e", "heim"]);
        assert_eq!(tokens[2].error_code(), "U001");
    }

    #[test]
    fn suggests_for_foreign_letters() {
        let tokens = run(&["hvenær", "kemcr", "hann"], false);
        assert_eq!(texts(&tokens), vec!["hvenær", "kemcr", "hann"]);
        assert_eq!(tokens[2].error_code(), "W001/w");
        assert_eq!(tokens[2].error().unwrap().suggest(), Some("kemur"));

        let tokens = run(&["hvenær", "kemcr", "hann"], true);
        assert_eq!(texts(&tokens), vec!["hvenær", "kemur", "hann"]);
        assert_eq!(tokens[2].error_code(), "S004");
    }

    #[test]
    fn checks_acceptable_corrections() {
        assert!(!is_acceptable("ófoo", "foo", &[], false));
        assert!(!is_acceptable("Xyz", "xy", &[], false));
        assert!(is_acceptable("a", "á", &[], false));
        assert!(!is_acceptable("a", "á", &[], true));
    }
}
