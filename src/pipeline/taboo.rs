//! Taboo words.

use super::Pipeline;
use crate::types::{ErrorKind, Token, TokenError};

/// The last correction stage: tags words whose lemma is a taboo word with a warning (T001/w)
/// naming a better word. The text is left unchanged.
pub fn check_taboo_words(pipeline: &Pipeline, mut tokens: Vec<Token>) -> Vec<Token> {
    let taboo_words = &pipeline.tables().taboo_words;
    if taboo_words.is_empty() {
        return tokens;
    }

    for token in tokens.iter_mut().filter(|x| x.is_word()) {
        let replacement = token
            .meanings
            .iter()
            .find_map(|m| taboo_words.get(&m.plain_lemma()));

        if let Some(replacement) = replacement {
            let suggested = replacement.split('_').next().unwrap_or(replacement);
            let message = format!(
                "Óheppilegt eða óviðurkvæmilegt orð, skárra væri t.d. '{}'",
                suggested
            );
            token.set_error(TokenError::new(ErrorKind::Taboo, "001", message));
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::lexicon::MemoryLexicon, config::RuleTables, pipeline::tests::words,
        types::Meaning,
    };

    #[test]
    fn warns_about_taboo_words() {
        let tables = RuleTables::from_str("[taboo_words]\nhelvíti fjandi_kk\n").unwrap();
        let lexicon = MemoryLexicon::from_meanings(vec![
            Meaning::new("helvítis", "helvíti", "hk", "ef_et"),
            Meaning::new("bílhelvíti", "bíl-helvíti", "hk", "nf_et"),
        ]);
        let pipeline = Pipeline::new(&tables, &lexicon);

        let tokens = pipeline.annotate_meanings(words(&["helvítis", "bílhelvíti", "bíll"]));
        let tokens = check_taboo_words(&pipeline, tokens);

        assert_eq!(tokens[1].error_code(), "T001/w");
        assert_eq!(
            tokens[1].error().unwrap().text(),
            "Óheppilegt eða óviðurkvæmilegt orð, skárra væri t.d. 'fjandi'"
        );
        assert_eq!(tokens[1].text, "helvítis");
        // "bíl-helvíti" without hyphens is not listed
        assert!(tokens[2].error().is_none());
        assert!(tokens[3].error().is_none());
    }
}
