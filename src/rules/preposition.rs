//! Verbs used with the wrong preposition, e. g. *"leita af"* instead of *"leita að"*.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::{rewrite_span, Annotate, Match, Rule};
use crate::{
    annotation::Annotation,
    config::RuleTables,
    tree::{
        case_name,
        pattern::{self, Context, Pattern},
        Node,
    },
    utils,
};

/// The verb of a verb phrase with a preposition of its own.
const VERB_SHAPE: &str = "VP > { VP >> { %verb } PP >> { P > { \"{wrong}\" } } }";
/// A verb in a predicate or an infinitive clause, e. g. *"hægt að brosa af þessu"*.
const PREDICATE_SHAPE: &str =
    ". > { (NP-PRD | IP-INF) > { VP > { %verb } } PP >> { P > { \"{wrong}\" } } }";

/// The `verb` macro accepts verbs from `verbs` which take no arguments.
fn verb_context(verbs: HashSet<String>) -> Context {
    Context::new().with("verb", move |node: &Node| {
        node.terminal_info().map_or(false, |terminal| {
            verbs.contains(&terminal.lemma_mm())
                && !terminal.variants.iter().any(|x| x == "1" || x == "2")
        })
    })
}

#[derive(Debug)]
pub struct WrongPreposition {
    wrong: String,
    right: String,
    case: String,
    verb: Pattern,
    nested_verb: Pattern,
    bare_verb: Pattern,
    preposition: Pattern,
}

impl WrongPreposition {
    pub fn new(wrong: &str, right: &str, case: &str) -> Result<Self, pattern::Error> {
        Ok(WrongPreposition {
            wrong: wrong.to_string(),
            right: right.to_string(),
            case: case.to_string(),
            verb: Pattern::new("VP > { %verb }")?,
            nested_verb: Pattern::new("VP >> { %verb }")?,
            bare_verb: Pattern::new("%verb")?,
            preposition: Pattern::new(&format!("P > {{ \"{}\" }}", wrong))?,
        })
    }
}

impl Annotate for WrongPreposition {
    fn annotate(&self, m: &Match) -> Option<Annotation> {
        let preposition = m.first(&self.preposition)?;
        let vp = m.first(&self.verb).or_else(|| m.first(&self.nested_verb));

        let (start, end) = match vp {
            Some(vp) => (
                vp.start().min(preposition.start()),
                vp.end().max(preposition.end()),
            ),
            None => m.node.span(),
        };
        let verb = vp.or_else(|| m.first(&self.bare_verb))?.tidy_text();

        let index = preposition.first_terminal()?.index;
        let suggestion = rewrite_span(m.tree, (start, end), |i, text| {
            if i == index {
                utils::emulate_case(&self.right, text)
            } else {
                text.to_string()
            }
        });

        let case = case_name(&self.case).map_or_else(String::new, |x| format!(" með {}falli", x));
        Some(
            Annotation::new(
                start,
                end,
                "P001",
                format!(
                    "'{0} {1}' á sennilega að vera '{0} {2}'",
                    verb, self.wrong, self.right
                ),
            )
            .with_detail(format!(
                "Sögnin '{}' tekur yfirleitt með sér forsetninguna '{}'{}, ekki '{}'.",
                verb, self.right, case, self.wrong
            ))
            .with_suggestion(suggestion),
        )
    }
}

/// One pair of rules for each wrong preposition on record, covering all verbs it is
/// wrongly used with.
pub(crate) fn rules(tables: &RuleTables) -> Result<Vec<Rule>, pattern::Error> {
    let mut groups: IndexMap<(&str, &str, &str), HashSet<String>> = IndexMap::new();
    for (verb, entries) in &tables.verb_prepositions {
        if verb.contains('_') {
            // reflexive frames such as "birgja_sig" are not covered
            continue;
        }
        for entry in entries {
            groups
                .entry((entry.wrong.as_str(), entry.right.as_str(), entry.case.as_str()))
                .or_default()
                .insert(verb.clone());
        }
    }

    let mut rules = Vec::new();
    for ((wrong, right, case), verbs) in groups {
        for shape in &[VERB_SHAPE, PREDICATE_SHAPE] {
            rules.push(Rule::new(
                &[wrong],
                &shape.replace("{wrong}", wrong),
                verb_context(verbs.clone()),
                WrongPreposition::new(wrong, right, case)?,
            )?);
        }
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::super::{tests::apply, Rules};
    use crate::config::RuleTables;

    fn rules() -> Rules {
        let tables = RuleTables::from_str("[verb_prepositions]\nleita af að þgf\n").unwrap();
        Rules::new(&tables).unwrap()
    }

    #[test]
    fn corrects_preposition() {
        let annotations = apply(
            &rules(),
            "(S0 (IP (NP-SUBJ (person_nf_kk Jón 'Jón')) (VP (VP (so_0_et_p3 leitaði 'leita')) \
             (PP (P (fs_þgf af 'af')) (NP (no_et_þgf_kk kettinum 'köttur'))))))",
        );

        assert_eq!(annotations.len(), 1);
        let annotation = &annotations[0];
        assert_eq!(annotation.code(), "P001");
        assert_eq!(annotation.span(), (1, 2));
        assert_eq!(annotation.text(), "'leitaði af' á sennilega að vera 'leitaði að'");
        assert_eq!(
            annotation.detail(),
            Some("Sögnin 'leitaði' tekur yfirleitt með sér forsetninguna 'að' með þágufalli, ekki 'af'.")
        );
        assert_eq!(annotation.suggest(), Some("leitaði að"));
    }

    #[test]
    fn ignores_verbs_with_arguments() {
        let annotations = apply(
            &rules(),
            "(S0 (IP (NP-SUBJ (person_nf_kk Jón 'Jón')) (VP (VP (so_1_þgf_et_p3 leitaði 'leita')) \
             (PP (P (fs_þgf af 'af')) (NP (no_et_þgf_kk kettinum 'köttur'))))))",
        );
        assert!(annotations.is_empty());
    }

    #[test]
    fn ignores_other_verbs() {
        let annotations = apply(
            &rules(),
            "(S0 (IP (NP-SUBJ (person_nf_kk Jón 'Jón')) (VP (VP (so_0_et_p3 hló 'hlæja')) \
             (PP (P (fs_þgf af 'af')) (NP (no_et_þgf_kk kettinum 'köttur'))))))",
        );
        assert!(annotations.is_empty());
    }
}
