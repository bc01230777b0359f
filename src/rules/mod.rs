//! Declarative rules matched against parse trees.
//!
//! A [Rule] pairs a [Pattern] with a [Handler]. Rules can have trigger lemmas, in which case
//! the pattern is only matched if one of them occurs in the sentence. The handler inspects
//! each match and returns at most one [Annotation].

use std::collections::HashSet;

use enum_dispatch::enum_dispatch;
use itertools::Itertools;
use log::debug;

use crate::{
    annotation::{Annotation, Precedence},
    config::RuleTables,
    properties::Lexicon,
    tree::{
        pattern::{self, Context, Pattern},
        Node, Tree,
    },
    Error,
};

mod agreement;
mod definiteness;
mod mood;
mod phrasing;
mod preposition;

pub use agreement::NumberAgreement;
pub use definiteness::DoubleDefiniteness;
pub use mood::Mood;
pub use phrasing::PreferredPhrasing;
pub use preposition::WrongPreposition;

/// A node matched by a rule, along with everything a handler needs to inspect it.
pub struct Match<'a> {
    pub node: &'a Node,
    pub tree: &'a Tree,
    pub lexicon: &'a dyn Lexicon,
    pub context: &'a Context,
}

impl<'a> Match<'a> {
    /// The first node in pre-order, starting with the matched node, matching `pattern`.
    pub fn first(&self, pattern: &Pattern) -> Option<&'a Node> {
        pattern.first_match(self.node, self.context)
    }
}

/// The texts of the tokens in `start..=end`, with `replace` applied to each token.
pub(crate) fn rewrite_span<F>(tree: &Tree, (start, end): (usize, usize), replace: F) -> String
where
    F: Fn(usize, &str) -> String,
{
    tree.terminals()
        .into_iter()
        .filter(|x| x.index >= start && x.index <= end)
        .map(|x| replace(x.index, &x.text))
        .join(" ")
}

#[enum_dispatch]
#[derive(Debug)]
pub enum Handler {
    WrongPreposition,
    NumberAgreement,
    Mood,
    DoubleDefiniteness,
    PreferredPhrasing,
}

#[enum_dispatch(Handler)]
pub trait Annotate {
    /// Returns an annotation for the match, if it is an error.
    fn annotate(&self, m: &Match) -> Option<Annotation>;
}

#[derive(Debug)]
pub struct Rule {
    triggers: Vec<String>,
    pattern: Pattern,
    context: Context,
    handler: Handler,
}

impl Rule {
    /// Creates a new rule.
    ///
    /// Every macro in the pattern must be defined in `context`, and a pattern without
    /// macros takes an empty context.
    pub fn new<H: Into<Handler>>(
        triggers: &[&str],
        pattern: &str,
        context: Context,
        handler: H,
    ) -> Result<Self, pattern::Error> {
        let pattern = Pattern::new(pattern)?;
        let macros = pattern.macros();
        if let Some(name) = macros.iter().find(|x| !context.contains(x)) {
            return Err(pattern::Error::UndefinedMacro(name.to_string()));
        }
        if macros.is_empty() && !context.is_empty() {
            return Err(pattern::Error::UnusedContext);
        }

        Ok(Rule {
            triggers: triggers.iter().map(|x| x.to_string()).collect(),
            pattern,
            context,
            handler: handler.into(),
        })
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    fn is_triggered(&self, lemmas: &HashSet<String>) -> bool {
        self.triggers.is_empty() || self.triggers.iter().any(|x| lemmas.contains(x))
    }

    /// Annotates every match of this rule in the tree.
    pub fn apply(&self, tree: &Tree, lexicon: &dyn Lexicon) -> Vec<Annotation> {
        self.pattern
            .all_matches(tree, &self.context)
            .into_iter()
            .filter_map(|node| {
                self.handler.annotate(&Match {
                    node,
                    tree,
                    lexicon,
                    context: &self.context,
                })
            })
            .collect()
    }
}

/// A set of tree rules.
#[derive(Debug, Default)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    /// Creates the rules, taking the verb frames from `tables`.
    pub fn new(tables: &RuleTables) -> Result<Self, Error> {
        let mut rules = Vec::new();
        rules.extend(preposition::rules(tables)?);
        rules.extend(agreement::rules()?);
        rules.extend(mood::rules()?);
        rules.extend(definiteness::rules()?);
        rules.extend(phrasing::rules()?);

        debug!("created {} tree rules", rules.len());
        Ok(Rules { rules })
    }

    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Rules { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Applies all triggered rules to the tree.
    ///
    /// Annotations suggesting the text they already cover are dropped, as are duplicates.
    pub fn apply(&self, tree: &Tree, lexicon: &dyn Lexicon) -> Vec<Annotation> {
        let lemmas: HashSet<String> = tree
            .terminals()
            .into_iter()
            .flat_map(|x| vec![x.lemma.replace('-', ""), x.lemma_mm().replace('-', "")])
            .collect();

        let mut annotations = Vec::new();
        for rule in self.rules.iter().filter(|x| x.is_triggered(&lemmas)) {
            for annotation in rule.apply(tree, lexicon) {
                if let Some(suggest) = annotation.suggest() {
                    if suggest == rewrite_span(tree, annotation.span(), |_, text| text.into()) {
                        debug!("dropping no-op suggestion of {}", annotation.code());
                        continue;
                    }
                }
                annotations.push(annotation);
            }
        }

        Precedence::empty().resolve(annotations)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{components::lexicon::MemoryLexicon, types::Meaning};

    pub fn lexicon() -> MemoryLexicon {
        MemoryLexicon::from_meanings(vec![
            Meaning::new("hundurinn", "hundur", "kk", "nf_et_gr"),
            Meaning::new("hundur", "hundur", "kk", "nf_et"),
            Meaning::new("hundarnir", "hundur", "kk", "nf_ft_gr"),
            Meaning::new("hundar", "hundur", "kk", "nf_ft"),
            Meaning::new("geltir", "gelta", "so", "fh_nt_p3_et"),
            Meaning::new("gelta", "gelta", "so", "fh_nt_p3_ft"),
            Meaning::new("gelti", "gelta", "so", "vh_nt_p3_et"),
            Meaning::new("kemur", "koma", "so", "fh_nt_p3_et"),
            Meaning::new("komi", "koma", "so", "vh_nt_p3_et"),
            Meaning::new("leitaði", "leita", "so", "fh_þt_p3_et"),
        ])
    }

    pub fn apply(rules: &Rules, tree: &str) -> Vec<Annotation> {
        let tree = Tree::from_bracketed(tree).unwrap();
        rules.apply(&tree, &lexicon())
    }

    #[test]
    fn rejects_undefined_macros() {
        let rule = Rule::new(
            &[],
            "NP > { %nothing }",
            Context::new(),
            DoubleDefiniteness::new().unwrap(),
        );
        assert!(matches!(rule, Err(pattern::Error::UndefinedMacro(name)) if name == "nothing"));
    }

    #[test]
    fn rejects_unused_contexts() {
        let rule = Rule::new(
            &[],
            "NP > { 'maður' }",
            Context::new().with("verb", |_: &Node| true),
            DoubleDefiniteness::new().unwrap(),
        );
        assert!(matches!(rule, Err(pattern::Error::UnusedContext)));
    }

    #[test]
    fn rewrites_spans() {
        let tree =
            Tree::from_bracketed("(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_et_p1 fer 'fara'))))")
                .unwrap();
        assert_eq!(rewrite_span(&tree, (0, 1), |_, x| x.into()), "Ég fer");
        assert_eq!(
            rewrite_span(&tree, (0, 1), |i, x| if i == 1 { "kem".into() } else { x.into() }),
            "Ég kem"
        );
    }

    #[test]
    fn skips_untriggered_rules() {
        let tables = RuleTables::from_str("[verb_prepositions]\nleita af að þgf\n").unwrap();
        let rules = Rules::new(&tables).unwrap();
        assert!(!rules.rules().is_empty());

        let annotations = apply(
            &rules,
            "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_et_p1 fer 'fara'))))",
        );
        assert!(annotations.is_empty());
    }
}
