//! Words written in the wrong case.

use super::Pipeline;
use crate::{
    types::{ErrorKind, Meaning, Token, TokenError, TokenKind},
    utils,
};

const NOUNS: &[&str] = &["kk", "kvk", "hk"];

const MONTH_NAMES: &[&str] = &[
    "Janúar",
    "Febrúar",
    "Mars",
    "Apríl",
    "Maí",
    "Júní",
    "Júlí",
    "Ágúst",
    "September",
    "Október",
    "Nóvember",
    "Desember",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    SentenceStart,
    /// Only ordinals seen so far, both cases are fine.
    AfterOrdinal,
    InSentence,
}

fn is_wrong(pipeline: &Pipeline, token: &Token, state: State) -> bool {
    let word = token.text.as_str();
    if word.contains(' ') {
        return false;
    }

    let (reversed, lower) = if utils::is_title_case(word) {
        if state != State::InSentence {
            return false;
        }
        (word.to_lowercase(), false)
    } else if utils::is_lowercase(word) {
        let mut chars = word.chars();
        let first = chars.next();
        if word.chars().count() >= 3
            && chars.next() == Some('-')
            && first.map_or(false, |c| c.is_ascii_lowercase())
        {
            // "b-deildin"
            return true;
        }
        if state == State::SentenceStart {
            return true;
        }
        (utils::capitalize(word), true)
    } else {
        return false;
    };

    let meanings = pipeline.lexicon().meanings(&reversed);

    // "ástralía": only the reversed case is a proper word
    if lower
        && meanings
            .iter()
            .any(|m| !m.is_compound() && m.domain != "ism" && m.domain != "erm")
        && token
            .meanings
            .iter()
            .all(|m| utils::is_lowercase(&m.lemma) != lower || m.is_compound())
    {
        return true;
    }

    let stems = &pipeline.tables().capitalization_errors_rev;
    if meanings.iter().all(|m| !stems.contains(&m.lemma)) {
        return false;
    }

    let not_noun = |m: &Meaning| !NOUNS.contains(&m.category.as_str());
    if lower {
        // "finni" is also a verb
        !token.meanings.iter().any(not_noun)
    } else {
        // the lowercase form may be a common word of another class
        !meanings.iter().any(|m| not_noun(m) && m.category != "lo")
    }
}

/// The fifth correction stage.
///
/// A lowercase word which should be capitalized is tagged Z002, a capitalized word which
/// should be lowercase Z001. Capitalized words are fine at the start of a sentence.
pub fn fix_capitalization(pipeline: &Pipeline, tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut state = State::SentenceStart;

    for mut token in tokens {
        if token.kind == TokenKind::SentenceBegin {
            state = State::SentenceStart;
            out.push(token);
            continue;
        }

        if token.is_word() && is_wrong(pipeline, &token, state) {
            let original = token.text.clone();
            token = if utils::is_lowercase(&original) {
                let message = format!("Orð á að byrja á hástaf: '{}'", original);
                pipeline
                    .replace(&token, &utils::capitalize(&original), true)
                    .with_error(TokenError::new(ErrorKind::Capitalization, "002", message))
            } else {
                let message = format!("Orð á að byrja á lágstaf: '{}'", original);
                pipeline
                    .replace(&token, &original.to_lowercase(), false)
                    .with_error(TokenError::new(ErrorKind::Capitalization, "001", message))
            };
        }

        if token.kind == TokenKind::Date {
            fix_month_name(&mut token, state);
        }

        if state == State::SentenceStart && token.kind == TokenKind::Ordinal {
            state = State::AfterOrdinal;
        } else if token.kind != TokenKind::Punctuation {
            state = State::InSentence;
        }
        out.push(token);
    }

    out
}

/// Replaces the text of a token which is not a word, keeping the original.
fn recase(token: &mut Token, text: String, code: &str, message: String) {
    if token.original.is_none() {
        token.original = Some(token.text.clone());
    }
    token.text = text;
    token.set_error(TokenError::new(ErrorKind::Capitalization, code, message));
}

/// Month names in dates are lowercase, except at the start of a sentence (Z003).
fn fix_month_name(token: &mut Token, state: State) {
    let text = token.text.clone();
    if utils::is_uppercase(&text) || !MONTH_NAMES.iter().any(|x| text.contains(x)) {
        return;
    }
    // after an ordinal ("1. Maí") the month is still wrong
    if state == State::SentenceStart && MONTH_NAMES.iter().any(|x| text.starts_with(x)) {
        return;
    }

    let corrected = if state == State::SentenceStart {
        utils::capitalize(&text)
    } else {
        text.to_lowercase()
    };
    let message = format!(
        "Í dagsetningunni '{}' á mánaðarnafnið að byrja á lágstaf",
        text
    );
    recase(token, corrected, "003", message);
}

fn number_error(token: &mut Token, corrected: String, code: &str, instruction: &str) {
    let message = format!(
        "Töluna eða fjárhæðina '{}' á að rita {}",
        token.text, instruction
    );
    recase(token, corrected, code, message);
}

fn fix_number(token: &mut Token, at_sentence_start: bool) {
    let text = token.text.clone();
    if !text.chars().any(char::is_alphabetic) || utils::is_uppercase(&text) {
        return;
    }

    let mut chars = text.chars();
    let first = match chars.next() {
        Some(first) => first,
        None => return,
    };
    let rest = chars.as_str();

    if !at_sentence_start {
        if !utils::is_lowercase(&text) {
            number_error(token, text.to_lowercase(), "004", "með lágstöfum");
        }
    } else if first.is_numeric() && !utils::is_lowercase(rest) {
        // "500 Milljónir"
        number_error(token, text.to_lowercase(), "004", "með lágstöfum");
    } else if first.is_uppercase() && !utils::is_lowercase(rest) {
        // "Fimm Hundruð milljónir"
        number_error(token, utils::capitalize(&text), "005", "með hástaf aðeins í upphafi");
    } else if first.is_lowercase() {
        number_error(token, utils::capitalize(&text), "006", "með hástaf");
    }
}

fn fix_amount(token: &mut Token) {
    let text = token.text.clone();
    if !text.chars().any(char::is_alphabetic)
        || utils::is_lowercase(&text)
        || utils::is_uppercase(&text)
    {
        return;
    }
    let message = format!("Fjárhæðina '{}' á að rita með lágstöfum", text);
    recase(token, text.to_lowercase(), "005", message);
}

/// The last correction stage, on numbers and amounts which the tokenizer has joined
/// with their words, e. g. `24 Milljónir`.
///
/// Numbers written in words should be lowercase (Z004), or capitalized at the start of a
/// sentence (Z005, Z006). Amounts in mixed case are lowercased (Z005). Numbers in digits
/// and all uppercase text are fine.
pub fn late_fix_capitalization(tokens: Vec<Token>) -> Vec<Token> {
    let mut at_sentence_start = false;

    tokens
        .into_iter()
        .map(|mut token| {
            match token.kind {
                TokenKind::SentenceBegin => {
                    at_sentence_start = true;
                    return token;
                }
                TokenKind::Number => fix_number(&mut token, at_sentence_start),
                TokenKind::Amount => fix_amount(&mut token),
                _ => {}
            }

            if token.kind != TokenKind::Punctuation && token.kind != TokenKind::Ordinal {
                at_sentence_start = false;
            }
            token
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::lexicon::MemoryLexicon,
        config::RuleTables,
        pipeline::tests::{texts, words},
    };

    fn run(tokens: Vec<Token>) -> Vec<Token> {
        let tables = RuleTables::from_str(
            "[capitalization_errors]\níslendingur\nfinni\nDanskur\nÞýskur\n",
        )
        .unwrap();
        let lexicon = MemoryLexicon::from_meanings(vec![
            Meaning::new("Íslendingur", "Íslendingur", "kk", "nf_et"),
            Meaning::new("Finni", "Finni", "kk", "nf_et"),
            Meaning::new("finni", "finna", "so", "vh_nt_p1_et"),
            Meaning::new("danskur", "danskur", "lo", "kk_nf_et_sb"),
            Meaning::new("þýskur", "þýskur", "lo", "kk_nf_et_sb"),
            Meaning::new("þýskur", "þýska", "so", "lhþt"),
            Meaning::new("Ástralía", "Ástralía", "kvk", "nf_et").with_domain("lönd"),
            Meaning::new("hann", "hann", "pfn", "kk_nf_et"),
            Meaning::new("er", "vera", "so", "fh_nt_p3_et"),
        ]);
        let pipeline = Pipeline::new(&tables, &lexicon);
        let tokens = pipeline.annotate_meanings(tokens);
        fix_capitalization(&pipeline, tokens)
    }

    #[test]
    fn capitalizes_proper_nouns() {
        let tokens = run(words(&["hann", "er", "íslendingur"]));

        assert_eq!(texts(&tokens), vec!["Hann", "er", "Íslendingur"]);
        assert_eq!(tokens[1].error_code(), "Z002");
        assert_eq!(tokens[3].error_code(), "Z002");
        assert!(tokens[3].has_meanings());
    }

    #[test]
    fn lowercases_common_words() {
        let tokens = run(words(&["Hann", "er", "Danskur"]));

        assert_eq!(texts(&tokens), vec!["Hann", "er", "danskur"]);
        assert_eq!(tokens[3].error_code(), "Z001");
        assert_eq!(
            tokens[3].error().unwrap().text(),
            "Orð á að byrja á lágstaf: 'Danskur'"
        );
    }

    #[test]
    fn keeps_homographs() {
        let tokens = run(words(&["Hann", "er", "finni"]));
        assert_eq!(texts(&tokens), vec!["Hann", "er", "finni"]);

        let tokens = run(words(&["Hann", "er", "Þýskur"]));
        assert_eq!(texts(&tokens), vec!["Hann", "er", "Þýskur"]);
    }

    #[test]
    fn capitalizes_unknown_lowercase_names() {
        let tokens = run(words(&["Hann", "er", "ástralía"]));
        assert_eq!(texts(&tokens), vec!["Hann", "er", "Ástralía"]);
    }

    #[test]
    fn allows_capitals_at_sentence_start() {
        let tokens = run(words(&["Danskur"]));
        assert!(tokens[1].error().is_none());

        let mut tokens = words(&["Danskur"]);
        tokens.insert(1, Token::new(TokenKind::Ordinal, "1."));
        let tokens = run(tokens);
        assert!(tokens[2].error().is_none());
    }

    #[test]
    fn capitalizes_letter_prefixes() {
        let tokens = run(words(&["Hann", "er", "b-deildin"]));
        assert_eq!(texts(&tokens), vec!["Hann", "er", "B-deildin"]);
    }

    #[test]
    fn lowercases_month_names() {
        let mut tokens = words(&["Hann", "kom", "12. Nóvember"]);
        tokens[3].kind = TokenKind::Date;
        let tokens = run(tokens);

        assert_eq!(texts(&tokens), vec!["Hann", "kom", "12. nóvember"]);
        assert_eq!(tokens[3].error_code(), "Z003");
        assert_eq!(tokens[3].original_text(), "12. Nóvember");

        let mut tokens = words(&["Nóvember 2020", "var", "kaldur"]);
        tokens[1].kind = TokenKind::Date;
        let tokens = run(tokens);
        assert!(tokens[1].error().is_none());
    }

    fn numbers(texts: &[&str], kind: TokenKind) -> Vec<Token> {
        let mut tokens = words(texts);
        for token in tokens.iter_mut().filter(|x| !x.kind.is_sentence_boundary()) {
            if token.text.chars().any(char::is_numeric) || token.text.contains(' ') {
                token.kind = kind;
            }
        }
        late_fix_capitalization(tokens)
    }

    #[test]
    fn fixes_case_of_numbers() {
        let tokens = numbers(&["Hann", "fékk", "24 Milljónir"], TokenKind::Number);
        assert_eq!(texts(&tokens), vec!["Hann", "fékk", "24 milljónir"]);
        assert_eq!(tokens[3].error_code(), "Z004");
        assert_eq!(
            tokens[3].error().unwrap().text(),
            "Töluna eða fjárhæðina '24 Milljónir' á að rita með lágstöfum"
        );

        let tokens = numbers(&["Fimm Hundruð", "komu"], TokenKind::Number);
        assert_eq!(texts(&tokens), vec!["Fimm hundruð", "komu"]);
        assert_eq!(tokens[1].error_code(), "Z005");

        let tokens = numbers(&["fimm hundruð", "komu"], TokenKind::Number);
        assert_eq!(texts(&tokens), vec!["Fimm hundruð", "komu"]);
        assert_eq!(tokens[1].error_code(), "Z006");

        let tokens = numbers(&["5%", "eða", "1.234,56", "24 MILLJÓNIR"], TokenKind::Number);
        assert!(tokens.iter().all(|x| x.error().is_none()));
    }

    #[test]
    fn lowercases_amounts() {
        let tokens = numbers(&["Hann", "fékk", "3 Þúsund Dollara"], TokenKind::Amount);
        assert_eq!(texts(&tokens), vec!["Hann", "fékk", "3 þúsund dollara"]);
        assert_eq!(tokens[3].error_code(), "Z005");
    }
}
