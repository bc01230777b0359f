//! A demonstrative pronoun in front of a noun with the definite article, e. g.
//! *"þessi hundurinn"*.

use super::{rewrite_span, Annotate, Match, Rule};
use crate::{
    annotation::Annotation,
    tree::pattern::{self, Context, Pattern},
    utils,
};

#[derive(Debug)]
pub struct DoubleDefiniteness {
    demonstrative: Pattern,
    noun: Pattern,
}

impl DoubleDefiniteness {
    pub fn new() -> Result<Self, pattern::Error> {
        Ok(DoubleDefiniteness {
            demonstrative: Pattern::new("('þessi' | 'sá')")?,
            noun: Pattern::new("no_gr")?,
        })
    }
}

impl Annotate for DoubleDefiniteness {
    fn annotate(&self, m: &Match) -> Option<Annotation> {
        let demonstrative = m.first(&self.demonstrative)?.terminal_info()?;
        let noun = m.first(&self.noun)?.terminal_info()?;

        let form = m
            .lexicon
            .lookup_variants(&noun.text, &noun.word_category, &["nogr"])
            .into_iter()
            .next()?;
        let correct = utils::emulate_case(&form.form, &noun.text);

        let span = (
            demonstrative.index.min(noun.index),
            demonstrative.index.max(noun.index),
        );
        let original = rewrite_span(m.tree, span, |_, text| text.to_string());
        let suggestion = rewrite_span(m.tree, span, |i, text| {
            if i == noun.index {
                correct.clone()
            } else {
                text.to_string()
            }
        });

        Some(
            Annotation::new(
                span.0,
                span.1,
                "P_DEF",
                format!("'{}' á sennilega að vera '{}'", original, suggestion),
            )
            .with_detail("Ábendingarfornafn og greinir eru sjaldnast notuð saman.")
            .with_suggestion(suggestion),
        )
    }
}

pub(crate) fn rules() -> Result<Vec<Rule>, pattern::Error> {
    Ok(vec![Rule::new(
        &["þessi", "sá"],
        "NP > { ('þessi' | 'sá') no_gr }",
        Context::new(),
        DoubleDefiniteness::new()?,
    )?])
}
