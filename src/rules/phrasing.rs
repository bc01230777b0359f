//! Phrasings which are correct but have better alternatives. These are warnings (V002/w).

use super::{Annotate, Match, Rule};
use crate::{
    annotation::Annotation,
    tree::{
        pattern::{self, Context, Pattern},
        Node,
    },
    utils,
};

#[derive(Debug, Clone, Copy)]
enum Advice {
    /// A remark on the whole phrase, there is no word for word replacement.
    Text(&'static str),
    Replace(&'static str),
}

#[derive(Debug)]
pub struct PreferredPhrasing {
    /// Locates the annotated node within a match.
    target: Pattern,
    advice: Advice,
}

impl PreferredPhrasing {
    fn new(target: &str, advice: Advice) -> Result<Self, pattern::Error> {
        Ok(PreferredPhrasing {
            target: Pattern::new(target)?,
            advice,
        })
    }
}

impl Annotate for PreferredPhrasing {
    fn annotate(&self, m: &Match) -> Option<Annotation> {
        let target = m.first(&self.target)?;
        let original = target.tidy_text();
        let (start, end) = target.span();

        let annotation = match self.advice {
            Advice::Text(text) => Annotation::new(start, end, "V002", text),
            Advice::Replace(replacement) => {
                let suggestion = utils::emulate_case(replacement, &original);
                Annotation::new(
                    start,
                    end,
                    "V002",
                    format!(
                        "Betra er að tala um '{}' en '{}'.",
                        replacement,
                        original.to_lowercase()
                    ),
                )
                .with_suggestion(suggestion)
            }
        };

        Some(annotation.warning(true).with_original(original))
    }
}

fn plural_context(lemma: &'static str) -> Context {
    Context::new().with("plural", move |node: &Node| {
        node.terminal_info()
            .map_or(false, |x| x.lemma == lemma && x.has_variant("ft"))
    })
}

pub(crate) fn rules() -> Result<Vec<Rule>, pattern::Error> {
    Ok(vec![
        Rule::new(
            &["ferli"],
            "IP > { VP > { VP > { 'koma' } PP > { P > { 'í' } NP > { 'ferli' } } } }",
            Context::new(),
            PreferredPhrasing::new(
                "PP > 'í'",
                Advice::Text(
                    "Betra er að tala um að 'leysa úr málunum' heldur en að 'koma í ferli'.",
                ),
            )?,
        )?,
        Rule::new(
            &["skoðun"],
            "PP > { 'til' NP > { 'skoðun' } }",
            Context::new(),
            PreferredPhrasing::new(
                "PP > 'til'",
                Advice::Text(
                    "Betra er að tala um að 'leysa úr málunum' heldur en að 'taka til skoðunar'.",
                ),
            )?,
        )?,
        Rule::new(
            &["starfsmaður"],
            "NP >> { %plural }",
            plural_context("starfsmaður"),
            PreferredPhrasing::new("%plural", Advice::Replace("starfsfólk"))?,
        )?,
        Rule::new(
            &["greiðslubyrði"],
            "NP >> { 'greiðslubyrði' }",
            Context::new(),
            PreferredPhrasing::new("'greiðslubyrði'", Advice::Replace("mánaðarlegar greiðslur"))?,
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::super::{tests::apply, Rules};
    use crate::config::RuleTables;

    fn rules() -> Rules {
        Rules::new(&RuleTables::default()).unwrap()
    }

    #[test]
    fn prefers_collective_noun() {
        let annotations = apply(
            &rules(),
            "(S0 (IP (NP-SUBJ (no_ft_nf_kk Starfsmenn 'starfsmaður' nf_ft)) \
             (VP (so_0_ft_p3 mættu 'mæta' fh_þt_p3_ft))))",
        );

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].code(), "V002/w");
        assert_eq!(annotations[0].span(), (0, 0));
        assert_eq!(annotations[0].suggest(), Some("Starfsfólk"));
        assert_eq!(annotations[0].original(), Some("Starfsmenn"));

        let annotations = apply(
            &rules(),
            "(S0 (IP (NP-SUBJ (no_et_nf_kk Starfsmaðurinn 'starfsmaður' nf_et_gr)) \
             (VP (so_0_et_p3 mætti 'mæta' fh_þt_p3_et))))",
        );
        assert!(annotations.is_empty());
    }

    #[test]
    fn advises_on_phrases() {
        let annotations = apply(
            &rules(),
            "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_1_þf_et_p1 tek 'taka') \
             (NP-OBJ (no_et_þf_hk málið 'mál' þf_et_gr)) \
             (PP (P (fs_ef til 'til')) (NP (no_et_ef_kvk skoðunar 'skoðun' ef_et))))))",
        );

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].code(), "V002/w");
        assert_eq!(annotations[0].span(), (3, 4));
        assert_eq!(annotations[0].suggest(), None);
    }
}
