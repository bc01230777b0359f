//! Subject-verb agreement in number.

use super::{rewrite_span, Annotate, Match, Rule};
use crate::{
    annotation::Annotation,
    tree::{
        pattern::{self, Context},
        Node, Terminal,
    },
    utils,
};

const NUMBERS: &[&str] = &["et", "ft"];

fn number(terminal: &Terminal) -> Option<&str> {
    terminal.all_variants().find(|x| NUMBERS.contains(x))
}

/// The main verb phrase of a clause, the inner one if verb phrases are nested.
pub(crate) fn main_verb_phrase(clause: &Node) -> Option<&Node> {
    let vp = clause.child_with_tag("VP")?;
    Some(vp.child_with_tag("VP").unwrap_or(vp))
}

/// The finite verb directly below a verb phrase.
pub(crate) fn finite_verb(vp: &Node) -> Option<&Terminal> {
    vp.children()
        .into_iter()
        .filter_map(|x| x.terminal_info())
        .find(|x| x.category == "so" && (x.has_variant("fh") || x.has_variant("vh")))
}

#[derive(Debug, Default)]
pub struct NumberAgreement;

impl Annotate for NumberAgreement {
    fn annotate(&self, m: &Match) -> Option<Annotation> {
        let subject = m.node.child_with_tag("NP-SUBJ")?;
        let terminals = subject.terminals();
        if terminals.iter().any(|x| x.category == "st") {
            // "Jón og Gunna" is plural although both are singular
            return None;
        }
        let head = terminals
            .iter()
            .find(|x| matches!(x.category.as_str(), "no" | "pfn" | "person"))?;
        let expected = number(head)?;

        let vp = main_verb_phrase(m.node)?;
        let verb = finite_verb(vp)?;
        if number(verb)? == expected {
            return None;
        }

        let form = m
            .lexicon
            .lookup_variants(&verb.text, &verb.word_category, &[expected])
            .into_iter()
            .next()?;
        let correct = utils::emulate_case(&form.form, &verb.text);
        let suggestion = rewrite_span(m.tree, vp.span(), |i, text| {
            if i == verb.index {
                correct.clone()
            } else {
                text.to_string()
            }
        });

        let name = if expected == "et" {
            "eintölu"
        } else {
            "fleirtölu"
        };
        let (start, end) = vp.span();
        Some(
            Annotation::new(
                start,
                end,
                "P_NUMBER",
                format!(
                    "Sögnin '{}' á sennilega að vera í {} eins og frumlagið '{}'",
                    verb.text,
                    name,
                    subject.tidy_text()
                ),
            )
            .with_suggestion(suggestion),
        )
    }
}

pub(crate) fn rules() -> Result<Vec<Rule>, pattern::Error> {
    Ok(vec![Rule::new(
        &[],
        "IP > { NP-SUBJ VP }",
        Context::new(),
        NumberAgreement,
    )?])
}

#[cfg(test)]
mod tests {
    use super::super::{tests::apply, Rules};
    use crate::config::RuleTables;

    fn rules() -> Rules {
        Rules::new(&RuleTables::default()).unwrap()
    }

    #[test]
    fn suggests_verb_in_subject_number() {
        let annotations = apply(
            &rules(),
            "(S0 (IP (NP-SUBJ (no_ft_nf_kk Hundarnir 'hundur' nf_ft_gr)) \
             (VP (so_0_et_p3 geltir 'gelta' fh_nt_p3_et))))",
        );

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].code(), "P_NUMBER");
        assert_eq!(annotations[0].span(), (1, 1));
        assert_eq!(annotations[0].suggest(), Some("gelta"));
        assert_eq!(
            annotations[0].text(),
            "Sögnin 'geltir' á sennilega að vera í fleirtölu eins og frumlagið 'Hundarnir'"
        );
    }

    #[test]
    fn accepts_agreeing_verbs() {
        let annotations = apply(
            &rules(),
            "(S0 (IP (NP-SUBJ (no_et_nf_kk Hundurinn 'hundur' nf_et_gr)) \
             (VP (so_0_et_p3 geltir 'gelta' fh_nt_p3_et))))",
        );
        assert!(annotations.is_empty());
    }

    #[test]
    fn skips_coordinated_subjects() {
        let annotations = apply(
            &rules(),
            "(S0 (IP (NP-SUBJ (no_et_nf_kk Hundurinn 'hundur' nf_et_gr) (st og 'og') \
             (no_et_nf_kk kötturinn 'köttur' nf_et_gr)) (VP (so_0_ft_p3 gelta 'gelta' fh_nt_p3_ft))))",
        );
        assert!(annotations.is_empty());
    }
}
