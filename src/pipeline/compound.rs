//! Errors found before lexicon annotation (duplicated words, wrongly joined and split
//! compounds, abbreviations, punctuation) and compound words with invalid prefixes.

use std::collections::VecDeque;

use super::{describe_categories, Pipeline};
use crate::{
    types::{ErrorKind, Token, TokenError, TokenKind},
    utils,
};

/// Prefixes which are not valid as the first part of a compound.
const NOT_FORMERS: &[&str] = &["allra", "alhliða", "fjölnota", "margnota", "ótal"];

/// Wrong compound prefixes, corrected in any context.
const WRONG_FORMERS_CI: &[(&str, &str)] = &[
    ("akríl", "akrýl"),
    ("dísel", "dísil"),
    ("eyrnar", "eyrna"),
    ("feykna", "feikna"),
    ("fjarskiptar", "fjarskipta"),
    ("fyrna", "firna"),
    ("griðar", "griða"),
    ("kvenn", "kven"),
    ("Lundúnar", "Lundúna"),
    ("öldungar", "öldunga"),
];

/// Wrong compound prefixes.
const WRONG_FORMERS: &[(&str, &str)] = &[
    ("akstur", "aksturs"),
    ("athugana", "athugunar"),
    ("ferminga", "fermingar"),
    ("fjárfestinga", "fjárfestingar"),
    ("forvarna", "forvarnar"),
    ("heyrna", "heyrnar"),
    ("kvartana", "kvörtunar"),
    ("loftlags", "loftslags"),
    ("næringa", "næringar"),
    ("pantana", "pöntunar"),
    ("ráðninga", "ráðningar"),
    ("skráninga", "skráningar"),
    ("Vestfjarðar", "Vestfjarða"),
    ("ábendinga", "ábendingar"),
];

fn wrong_former(prefix: &str, only_ci: bool) -> Option<&'static str> {
    WRONG_FORMERS_CI
        .iter()
        .chain(WRONG_FORMERS.iter().filter(|_| !only_ci))
        .find(|(wrong, _)| *wrong == prefix)
        .map(|(_, right)| *right)
}

/// `text` without its first `n` characters.
fn skip_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((i, _)) => &text[i..],
        None => "",
    }
}

fn duplicate_warning(token: &Token) -> TokenError {
    TokenError::new(
        ErrorKind::Compound,
        "004",
        format!("'{}' er að öllum líkindum ofaukið", token.text),
    )
}

fn merged_error(first: &str, second: &str) -> TokenError {
    TokenError::new(
        ErrorKind::Compound,
        "003",
        format!("Orðin '{} {}' voru sameinuð í eitt", first, second),
    )
}

fn split_error(text: &str, span: usize) -> TokenError {
    TokenError::new(
        ErrorKind::Compound,
        "002",
        format!("Orðinu '{}' var skipt upp", text),
    )
    .with_span(span)
}

/// Flags informal punctuation. Runs of `?` and `!` are normalized to `?!`.
fn fix_punctuation(token: &mut Token) {
    let text = token.text.clone();
    let error = match text.as_str() {
        ",," => Some(("001", "Gæsalappirnar ,, ættu að vera „".to_string())),
        "''" => Some(("001", "Gæsalappirnar '' ættu að vera “".to_string())),
        ".." => Some(("002", "Gæti átt að vera einn punktur (.)".to_string())),
        text if text.chars().count() > 3 && text.chars().all(|c| c == '.') => Some((
            "002",
            "Óformlegt; gæti átt að vera þrípunktur (…)".to_string(),
        )),
        text if text.chars().count() > 1
            && text.chars().all(|c| c == '?' || c == '!')
            && text != "?!" =>
        {
            let message = format!("'{}' er óformlegt, breytt í '?!'", text);
            token.original = Some(text.to_string());
            token.text = "?!".into();
            Some(("003", message))
        }
        _ => None,
    };

    if let Some((code, message)) = error {
        token.set_error(TokenError::new(ErrorKind::Punctuation, code, message));
    }
}

enum Joined {
    Merge,
    Hint(String),
    No,
}

/// Whether `token` and `next` are the parts of a wrongly split compound.
fn split_compound(pipeline: &Pipeline, token: &Token, next: &Token) -> Joined {
    let tables = pipeline.tables();
    let lower = token.text.to_lowercase();

    let stems = tables.split_compounds.get(&lower);
    let bound = tables
        .morphemes
        .get(&lower)
        .map(|x| &x.bound)
        .filter(|x| !x.is_empty());
    if stems.is_none() && bound.is_none() {
        return Joined::No;
    }

    if !next.is_word()
        || utils::is_title_case(&next.text)
        || utils::is_uppercase(&next.text) != utils::is_uppercase(&token.text)
    {
        return Joined::No;
    }

    let meanings = pipeline
        .lexicon()
        .lookup(&next.text.to_lowercase(), false)
        .1;
    if meanings.is_empty() {
        return Joined::No;
    }

    if let Some(stems) = stems {
        if meanings.iter().any(|m| stems.contains(&m.plain_lemma())) {
            return Joined::Merge;
        }
    }

    if let Some(bound) = bound {
        let (allowed, other): (Vec<_>, Vec<_>) = meanings
            .iter()
            .map(|m| m.category.as_str())
            .partition(|c| bound.iter().any(|x| x == c));

        if allowed.is_empty() {
            return Joined::No;
        }
        if other.is_empty() {
            return Joined::Merge;
        }
        return Joined::Hint(format!(
            "Ef '{}' er {} á að sameina það '{}'",
            token.text,
            describe_categories(allowed),
            next.text
        ));
    }

    Joined::No
}

/// Splits a word which should be written as several words.
fn split_wrong_compound(token: &Token, parts: &[String]) -> Vec<Token> {
    let parts: Vec<String> = if utils::is_uppercase(&token.text) {
        parts.iter().map(|x| x.to_uppercase()).collect()
    } else {
        parts
            .iter()
            .enumerate()
            .map(|(i, x)| {
                if i == 0 {
                    utils::emulate_case(x, &token.text)
                } else {
                    x.clone()
                }
            })
            .collect()
    };

    let span = parts.len();
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            let new = Token::word(part, Vec::new());
            if i == 0 {
                new.with_error(split_error(&token.text, span))
            } else {
                new
            }
        })
        .collect()
}

/// The first correction stage. Works on the raw tokens with one token of lookahead.
///
/// Exact duplicates of a word are dropped (C001) unless the word may legitimately be
/// repeated, in which case the repetition is flagged (C004). Duplicates differing only in case
/// are flagged (C004).
pub fn parse_errors(pipeline: &Pipeline, tokens: Vec<Token>) -> Vec<Token> {
    let tables = pipeline.tables();
    let mut queue: VecDeque<Token> = tokens.into();
    let mut out = Vec::with_capacity(queue.len());
    let mut at_sentence_start = false;

    while let Some(mut token) = queue.pop_front() {
        match token.kind {
            TokenKind::SentenceBegin => {
                at_sentence_start = true;
                out.push(token);
                continue;
            }
            TokenKind::Punctuation => {
                fix_punctuation(&mut token);
                out.push(token);
                continue;
            }
            TokenKind::Word => {}
            TokenKind::Ordinal => {
                out.push(token);
                continue;
            }
            _ => {
                at_sentence_start = false;
                out.push(token);
                continue;
            }
        }

        let only_ci = pipeline.is_only_ci();

        if let Some(corrected) = tables.abbreviations.get(&token.text).filter(|_| !only_ci) {
            let meanings = pipeline.lexicon().lookup(&token.text, at_sentence_start).1;
            if !meanings.is_empty() {
                let message = format!(
                    "Skammstöfunin '{}' var leiðrétt í '{}'",
                    token.text, corrected
                );
                let new = token
                    .replaced(corrected.as_str(), meanings)
                    .with_error(TokenError::new(ErrorKind::Abbreviation, "001", message));
                out.push(new);
                at_sentence_start = false;
                continue;
            }
        }

        if let Some(next) = queue.front_mut().filter(|_| !only_ci) {
            if next.is_word() && next.text == token.text {
                if tables.allowed_multiples.contains(&token.text.to_lowercase()) {
                    let error = duplicate_warning(next);
                    next.set_error(error);
                    out.push(token);
                } else {
                    // the repetition takes the place of the first word and is checked again
                    let message = format!("Endurtekið orð ('{}') var fellt burt", token.text);
                    let text = token.text.clone();
                    *next = Token::merged(&[token, next.clone()], text, Vec::new())
                        .with_error(TokenError::new(ErrorKind::Compound, "001", message));
                }
                at_sentence_start = false;
                continue;
            }

            if next.is_word() && next.text.to_lowercase() == token.text.to_lowercase() {
                let error = duplicate_warning(next);
                next.set_error(error);
                out.push(token);
                at_sentence_start = false;
                continue;
            }
        }

        if let Some(parts) = tables.wrong_compounds.get(&token.text.to_lowercase()) {
            out.extend(split_wrong_compound(&token, parts));
            at_sentence_start = false;
            continue;
        }

        if only_ci {
            let lower = token.text.to_lowercase();
            let is_bound = tables
                .morphemes
                .get(&lower)
                .map_or(false, |x| !x.bound.is_empty());
            if !tables.split_compounds.contains_key(&lower) && is_bound {
                let message = format!("Orðhlutinn '{}' á ekki að standa stakur", token.text);
                token.set_error(TokenError::new(ErrorKind::Spelling, "007", message));
            }
        } else if let Some(next) = queue.front() {
            match split_compound(pipeline, &token, next) {
                Joined::Merge => {
                    let text = format!("{}{}", token.text, next.text);
                    let error = merged_error(&token.text, &next.text);
                    let merged = Token::merged(&[token, next.clone()], text, Vec::new());
                    queue.pop_front();
                    out.push(merged.with_error(error));
                    at_sentence_start = false;
                    continue;
                }
                Joined::Hint(message) => {
                    token.set_error(TokenError::new(ErrorKind::Compound, "005", message));
                }
                Joined::No => {}
            }
        }

        out.push(token);
        at_sentence_start = false;
    }

    out
}

/// The second correction stage: compounds whose first part is not a valid prefix.
///
/// Needs lexicon meanings, the compound parts are taken from the lemma of the first meaning.
pub fn fix_compound_words(pipeline: &Pipeline, tokens: Vec<Token>) -> Vec<Token> {
    let tables = pipeline.tables();
    let mut out = Vec::with_capacity(tokens.len());
    let mut at_sentence_start = false;

    for token in tokens {
        match token.kind {
            TokenKind::SentenceBegin => {
                at_sentence_start = true;
                out.push(token);
                continue;
            }
            TokenKind::Punctuation | TokenKind::Ordinal => {
                out.push(token);
                continue;
            }
            _ => {}
        }

        let lemma = match token.meanings.first() {
            Some(meaning) if token.is_word() && meaning.is_compound() => meaning.lemma.clone(),
            _ => {
                out.push(token);
                at_sentence_start = false;
                continue;
            }
        };

        let mut parts: Vec<&str> = lemma.split('-').collect();
        // the compounder splits "ótal" in two
        if parts.len() >= 3 && parts[0] == "ó" && parts[1] == "tal" {
            parts.splice(0..2, std::iter::once("ótal"));
        }
        let prefix = parts[0];
        let suffix = skip_chars(&token.text, prefix.chars().count());

        if NOT_FORMERS.contains(&prefix) {
            let first = pipeline
                .replace(&token, &utils::emulate_case(prefix, &token.text), at_sentence_start)
                .with_error(split_error(&token.text, 2));
            let second = pipeline.replace(&token, suffix, false);
            out.push(first);
            out.push(second);
        } else if let Some(free) = tables
            .morphemes
            .get(prefix)
            .map(|x| &x.free)
            .filter(|x| !x.is_empty())
        {
            let (word, meanings) = pipeline.lexicon().lookup(suffix, false);
            let (allowed, other): (Vec<_>, Vec<_>) = meanings
                .iter()
                .map(|m| m.category.as_str())
                .partition(|c| free.iter().any(|x| x == c));

            if allowed.is_empty() || (!other.is_empty() && pipeline.is_only_ci()) {
                out.push(token);
            } else if other.is_empty() {
                let first = pipeline
                    .replace(&token, &utils::emulate_case(prefix, &token.text), false)
                    .with_error(split_error(&token.text, 2));
                let second = token.replaced(word, meanings.clone());
                out.push(first);
                out.push(second);
            } else {
                let message = format!(
                    "Ef '{}' er {} á að skipta orðinu upp",
                    token.text,
                    describe_categories(allowed)
                );
                let error = TokenError::new(ErrorKind::Compound, "005", message).with_span(2);
                out.push(token.with_error(error));
            }
        } else if let Some(right) = wrong_former(prefix, pipeline.is_only_ci()) {
            let corrected = utils::emulate_case(&format!("{}{}", right, suffix), &token.text);
            let message = format!(
                "Samsetta orðinu '{}' var breytt í '{}'",
                token.text, corrected
            );
            let new = pipeline
                .replace(&token, &corrected, at_sentence_start)
                .with_error(TokenError::new(ErrorKind::Compound, "006", message));
            out.push(new);
        } else {
            out.push(token);
        }
        at_sentence_start = false;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::lexicon::MemoryLexicon,
        config::RuleTables,
        pipeline::tests::{texts, words},
        types::Meaning,
    };

    fn tables() -> RuleTables {
        RuleTables::from_str(
            "[allowed_multiples]\nhana\n\n\
             [wrong_compounds]\nafhverju, af hverju\n\n\
             [split_compounds]\nafar langur\n\n\
             [morphemes]\nofur +lo -so\n\n\
             [abbreviations]\nt.d t.d.\n",
        )
        .unwrap()
    }

    fn lexicon() -> MemoryLexicon {
        MemoryLexicon::from_meanings(vec![
            Meaning::new("löngum", "langur", "lo", "þgf_ft"),
            Meaning::new("löngum", "löngum", "ao", "-"),
            Meaning::new("stór", "stór", "lo", "nf_et"),
            Meaning::new("kvennmaður", "kvenn-maður", "kk", "nf_et"),
            Meaning::new("kvenmaður", "kven-maður", "kk", "nf_et"),
            Meaning::new("ótalmargir", "ó-tal-margur", "lo", "nf_ft"),
            Meaning::new("ótal", "ótal", "lo", "-"),
            Meaning::new("margir", "margur", "lo", "nf_ft"),
            Meaning::new("t.d.", "til dæmis", "ao", "-"),
            Meaning::new("t.d", "til dæmis", "ao", "-"),
        ])
    }

    fn run(tokens: Vec<Token>) -> Vec<Token> {
        run_with(tokens, false)
    }

    fn run_with(tokens: Vec<Token>, only_ci: bool) -> Vec<Token> {
        let tables = tables();
        let lexicon = lexicon();
        let pipeline = Pipeline::new(&tables, &lexicon).only_ci(only_ci);
        let tokens = parse_errors(&pipeline, tokens);
        let tokens = pipeline.annotate_meanings(tokens);
        fix_compound_words(&pipeline, tokens)
    }

    #[test]
    fn drops_duplicate_runs() {
        let tokens = run(words(&["mér", "mér", "mér", "fast"]));

        assert_eq!(texts(&tokens), vec!["mér", "fast"]);
        assert_eq!(tokens[1].error_code(), "C001");
    }

    #[test]
    fn flags_allowed_and_case_duplicates() {
        let tokens = run(words(&["hana", "hana"]));
        assert_eq!(texts(&tokens), vec!["hana", "hana"]);
        assert_eq!(tokens[2].error_code(), "C004/w");

        let tokens = run(words(&["Það", "það"]));
        assert_eq!(tokens[2].error_code(), "C004/w");
    }

    #[test]
    fn splits_wrong_compounds() {
        let tokens = run(words(&["Afhverju", "ekki"]));

        assert_eq!(texts(&tokens), vec!["Af", "hverju", "ekki"]);
        assert_eq!(tokens[1].error_code(), "C002");
        assert_eq!(tokens[1].error_span(), 2);
    }

    #[test]
    fn joins_split_compounds() {
        let tokens = run(words(&["afar", "löngum"]));
        assert_eq!(texts(&tokens), vec!["afarlöngum"]);
        assert_eq!(tokens[1].error_code(), "C003");
        assert_eq!(tokens[1].original_text(), "afar löngum");

        // all meanings of "stór" are adjectives
        let tokens = run(words(&["ofur", "stór"]));
        assert_eq!(texts(&tokens), vec!["ofurstór"]);

        // "löngum" may be an adverb
        let tokens = run(words(&["ofur", "löngum"]));
        assert_eq!(texts(&tokens), vec!["ofur", "löngum"]);
        assert_eq!(tokens[1].error_code(), "C005");
        assert!(tokens[1].error().unwrap().text().contains("lýsingarorð"));
    }

    #[test]
    fn ignores_title_case_continuations() {
        let tokens = run(words(&["afar", "Löngum"]));
        assert_eq!(texts(&tokens), vec!["afar", "Löngum"]);
    }

    #[test]
    fn fixes_abbreviations() {
        let tokens = run(words(&["t.d", "stór"]));

        assert_eq!(texts(&tokens), vec!["t.d.", "stór"]);
        assert_eq!(tokens[1].error_code(), "A001");
    }

    #[test]
    fn fixes_punctuation() {
        let tokens = run(words(&["stór", "??!", ",,", "....."]));

        assert_eq!(texts(&tokens), vec!["stór", "?!", ",,", "....."]);
        assert_eq!(tokens[2].error_code(), "N003");
        assert_eq!(tokens[2].original_text(), "??!");
        assert_eq!(tokens[3].error_code(), "N001");
        assert_eq!(tokens[4].error_code(), "N002");
    }

    #[test]
    fn fixes_wrong_formers() {
        let tokens = run(words(&["Kvennmaður"]));

        assert_eq!(texts(&tokens), vec!["Kvenmaður"]);
        assert_eq!(tokens[1].error_code(), "C006");
        assert!(tokens[1].has_meanings());
    }

    #[test]
    fn splits_invalid_prefixes() {
        let tokens = run(words(&["ótalmargir"]));

        assert_eq!(texts(&tokens), vec!["ótal", "margir"]);
        assert_eq!(tokens[1].error_code(), "C002");
        assert_eq!(tokens[1].error_span(), 2);
        assert!(tokens[2].has_meanings());
    }

    #[test]
    fn makes_only_context_independent_corrections() {
        let tokens = run_with(words(&["hana", "hana", "afar", "löngum"]), true);
        assert_eq!(texts(&tokens), vec!["hana", "hana", "afar", "löngum"]);
        assert!(tokens.iter().all(|x| x.error().is_none()));

        // a bound morpheme is flagged, but not joined
        let tokens = run_with(words(&["ofur", "stór"]), true);
        assert_eq!(texts(&tokens), vec!["ofur", "stór"]);
        assert_eq!(tokens[1].error_code(), "S007");

        let tokens = run_with(words(&["Afhverju", "kvennmaður"]), true);
        assert_eq!(texts(&tokens), vec!["Af", "hverju", "kvenmaður"]);
        assert_eq!(tokens[3].error_code(), "C006");
    }
}
