//! The mood of verbs in adverbial clauses.

use super::{
    agreement::{finite_verb, main_verb_phrase},
    Annotate, Match, Rule,
};
use crate::{
    annotation::Annotation,
    tree::pattern::{self, Context},
    utils,
};

#[derive(Debug)]
pub struct Mood {
    code: &'static str,
    /// `vh` for subjunctive, `fh` for indicative.
    required: &'static str,
    detail: &'static str,
}

impl Annotate for Mood {
    fn annotate(&self, m: &Match) -> Option<Annotation> {
        let ip = m.node.child_with_tag("IP")?;
        let verb = finite_verb(main_verb_phrase(ip)?)?;
        if verb.has_variant(self.required) {
            return None;
        }

        let form = m
            .lexicon
            .lookup_variants(&verb.text, "so", &[self.required])
            .into_iter()
            .next()?;
        let correct = utils::emulate_case(&form.form, &verb.text);
        let name = if self.required == "vh" {
            "viðtengingarhætti"
        } else {
            "framsöguhætti"
        };

        Some(
            Annotation::new(
                verb.index,
                verb.index,
                self.code,
                format!("Sögnin '{}' á sennilega að vera í {}", verb.text, name),
            )
            .with_detail(self.detail)
            .with_suggestion(correct),
        )
    }
}

pub(crate) fn rules() -> Result<Vec<Rule>, pattern::Error> {
    let clauses = [
        (
            "CP-ADV-ACK",
            "P_MOOD_ACK",
            "vh",
            "Í viðurkenningarsetningum, t.d. á eftir 'þótt', er sögnin yfirleitt í viðtengingarhætti.",
        ),
        (
            "CP-ADV-PURP",
            "P_MOOD_PURP",
            "vh",
            "Í tilgangssetningum, t.d. á eftir 'til þess að', er sögnin yfirleitt í viðtengingarhætti.",
        ),
        (
            "CP-ADV-CAUSE",
            "P_MOOD_CAUSE",
            "fh",
            "Í orsakarsetningum, t.d. á eftir 'af því að', er sögnin yfirleitt í framsöguhætti.",
        ),
    ];

    clauses
        .iter()
        .map(|&(tag, code, required, detail)| {
            Rule::new(
                &[],
                &format!("{} > IP", tag),
                Context::new(),
                Mood {
                    code,
                    required,
                    detail,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::{tests::apply, Rules};
    use crate::config::RuleTables;

    fn tree(tag: &str, verb: &str) -> String {
        format!(
            "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_et_p1 fer 'fara') \
             ({} (C (st þótt 'þótt')) (IP (NP-SUBJ (pfn_et_nf hann 'hann')) \
             (VP (so_0_et_p3 {})))))))",
            tag, verb
        )
    }

    #[test]
    fn requires_subjunctive_in_concessive_clauses() {
        let rules = Rules::new(&RuleTables::default()).unwrap();
        let annotations = apply(&rules, &tree("CP-ADV-ACK", "kemur 'koma' fh_nt_p3_et"));

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].code(), "P_MOOD_ACK");
        assert_eq!(annotations[0].span(), (4, 4));
        assert_eq!(annotations[0].suggest(), Some("komi"));

        let annotations = apply(&rules, &tree("CP-ADV-ACK", "komi 'koma' vh_nt_p3_et"));
        assert!(annotations.is_empty());
    }

    #[test]
    fn requires_indicative_in_causal_clauses() {
        let rules = Rules::new(&RuleTables::default()).unwrap();
        let annotations = apply(&rules, &tree("CP-ADV-CAUSE", "komi 'koma' vh_nt_p3_et"));

        assert_eq!(annotations[0].code(), "P_MOOD_CAUSE");
        assert_eq!(annotations[0].suggest(), Some("kemur"));
    }
}
