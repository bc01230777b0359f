//! Finds errors which the parser has marked in a tree.
//!
//! Two kinds of errors are found here: grammar nonterminals whose name starts with `Villa`
//! (an error) or `Aðvörun` (a warning), which the grammar uses to recognize common mistakes,
//! and verbs whose subject is in the wrong case, e. g. *"Ég vantar bók"*.

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;

use crate::{
    annotation::Annotation,
    config::RuleTables,
    properties::Lexicon,
    tree::{case_name, GrammarInfo, Node, Terminal, Tree, CASES},
    utils,
};

/// What a handler has to say about a grammar nonterminal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Finding {
    pub text: String,
    pub detail: Option<String>,
    pub suggestion: Option<String>,
    /// Overrides the span of the nonterminal.
    pub span: Option<(usize, usize)>,
}

impl Finding {
    fn new<S: Into<String>>(text: S) -> Self {
        Finding {
            text: text.into(),
            ..Finding::default()
        }
    }

    fn detail<S: Into<String>>(mut self, detail: S) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn suggest<S: Into<String>>(mut self, suggestion: S) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    fn at(mut self, span: (usize, usize)) -> Self {
        self.span = Some(span);
        self
    }
}

/// Receives the finder, the text of the node, the variants of the nonterminal name
/// (everything after the first underscore) and the node itself.
type Handler = fn(&ErrorFinder<'_>, &str, &str, &Node) -> Option<Finding>;

lazy_static! {
    static ref HANDLERS: HashMap<&'static str, Handler> = {
        let mut map: HashMap<&'static str, Handler> = HashMap::new();
        map.insert("AðvörunHeldur", heldur);
        map.insert("AðvörunSíðan", sidan);
        map.insert("VillaVístAð", vist_ad);
        map.insert("VillaFráÞvíAð", fra_thvi_ad);
        map.insert("VillaAnnaðhvort", annadhvort);
        map.insert("VillaAnnaðHvort", annad_hvort);
        map.insert("VillaFjöldiHluti", fjoldi_hluti);
        map.insert("VillaEinnAf", einn_af);
        map.insert("VillaEinkunn", einkunn);
        map.insert("AðvörunSem", superfluous);
        map.insert("AðvörunAð", superfluous);
        map.insert("AðvörunKomma", komma);
        map.insert("VillaNé", ne);
        map.insert("VillaÞóAð", tho_ad);
        map.insert("VillaÍTölu", i_tolu);
        map.insert("VillaFsMeðFallstjórn", fs_med_fallstjorn);
        map.insert("SvigaInnihaldNl", sviga_innihald);
        map.insert("VillaEndingIR", ending_ir);
        map.insert("VillaEndingANA", ending_ana);
        map
    };
}

/// The text of a node for use in messages. Words are lowercased unless they are acronyms
/// or proper names, or `original_case` is set.
fn node_text(node: &Node, original_case: bool) -> String {
    let words: Vec<String> = node
        .terminals()
        .iter()
        .map(|terminal| {
            let keep = original_case
                || (terminal.text.chars().count() > 1 && utils::is_uppercase(&terminal.text))
                || utils::starts_uppercase(&terminal.lemma);
            if keep {
                terminal.text.clone()
            } else {
                terminal.text.to_lowercase()
            }
        })
        .collect();

    utils::correct_spaces(&words.join(" "))
}

fn heldur(_: &ErrorFinder, txt: &str, _: &str, _: &Node) -> Option<Finding> {
    Some(
        Finding::new(format!("'{}' er sennilega ofaukið", txt))
            .detail("Yfirleitt nægir að nota 'en' í þessu samhengi."),
    )
}

fn sidan(_: &ErrorFinder, _: &str, _: &str, _: &Node) -> Option<Finding> {
    Some(Finding::new("'síðan' er sennilega ofaukið").suggest(""))
}

fn vist_ad(_: &ErrorFinder, txt: &str, _: &str, _: &Node) -> Option<Finding> {
    Some(Finding::new(format!("'{}' á sennilega að vera 'fyrst að'", txt)).suggest("fyrst að"))
}

fn fra_thvi_ad(_: &ErrorFinder, txt: &str, _: &str, _: &Node) -> Option<Finding> {
    let suggestion = format!("{} að", txt);
    Some(
        Finding::new(format!("'{}' á sennilega að vera '{}'", txt, suggestion))
            .suggest(suggestion),
    )
}

fn annadhvort(_: &ErrorFinder, txt: &str, _: &str, _: &Node) -> Option<Finding> {
    Some(
        Finding::new(format!("'{}' á sennilega að vera 'annað hvort'", txt))
            .detail("Rita á 'annað hvort' þegar átt er við annan af tveimur kostum.")
            .suggest("annað hvort"),
    )
}

fn annad_hvort(_: &ErrorFinder, txt: &str, _: &str, _: &Node) -> Option<Finding> {
    Some(
        Finding::new(format!("'{}' á sennilega að vera 'annaðhvort'", txt))
            .detail("Rita á 'annaðhvort' í samtengingunni 'annaðhvort ... eða'.")
            .suggest("annaðhvort"),
    )
}

/// A plural verb belonging to a singular noun phrase.
fn singular_error(finder: &ErrorFinder, txt: &str, node: &Node, detail: String) -> Finding {
    let tree = finder.tree;
    let verb = tree
        .terminal_node(node.start())
        .and_then(|terminal| tree.enclosing(terminal, "IP"))
        .and_then(|ip| {
            let vp = ip.child_with_tag("VP")?;
            Some(vp.child_with_tag("VP").unwrap_or(vp))
        });

    match verb {
        Some(verb) => Finding::new(format!(
            "Sögnin '{}' á sennilega að vera í eintölu, ekki fleirtölu",
            verb.tidy_text()
        ))
        .detail(detail)
        .at(verb.span()),
        None => Finding::new(format!(
            "Sögn sem á við '{}' á sennilega að vera í eintölu, ekki fleirtölu",
            txt
        )),
    }
}

fn fjoldi_hluti(finder: &ErrorFinder, txt: &str, _: &str, node: &Node) -> Option<Finding> {
    let detail = format!(
        "Nafnliðurinn '{}' er í eintölu og með honum á því að vera sögn í eintölu.",
        txt
    );
    Some(singular_error(finder, txt, node, detail))
}

fn einn_af(finder: &ErrorFinder, txt: &str, _: &str, node: &Node) -> Option<Finding> {
    let detail = format!(
        "Nafnliðurinn '{}' er í eintölu og með honum á því að vera sögn í eintölu, \
         þótt nafnliðurinn á eftir 'af' sé í fleirtölu.",
        txt
    );
    Some(singular_error(finder, txt, node, detail))
}

/// A pronoun in front of a noun phrase should have the same case.
fn einkunn(finder: &ErrorFinder, _: &str, variants: &str, node: &Node) -> Option<Finding> {
    let case = variants.split('_').next()?;
    let name = case_name(case)?;
    let pronoun = node.children().into_iter().next()?;

    let wrong = node_text(pronoun, true);
    let correct = pronoun.cast_to_case(finder.lexicon, case);
    Some(
        Finding::new(format!("'{}' á sennilega að vera '{}'", wrong, correct))
            .detail(format!(
                "Fornafnið '{}' á að vera í {}falli, eins og nafnliðurinn sem fylgir á eftir.",
                wrong, name
            ))
            .suggest(correct)
            .at(pronoun.span()),
    )
}

fn superfluous(_: &ErrorFinder, txt: &str, _: &str, _: &Node) -> Option<Finding> {
    Some(Finding::new(format!("'{}' er að öllum líkindum ofaukið", txt)).suggest(""))
}

fn komma(_: &ErrorFinder, _: &str, _: &str, _: &Node) -> Option<Finding> {
    Some(Finding::new("Komma er líklega óþörf").suggest(""))
}

fn ne(_: &ErrorFinder, _: &str, _: &str, _: &Node) -> Option<Finding> {
    Some(
        Finding::new("'né' gæti átt að vera 'eða'")
            .detail("'né' er aðeins notað í neitandi samhengi.")
            .suggest("eða"),
    )
}

fn tho_ad(_: &ErrorFinder, txt: &str, _: &str, _: &Node) -> Option<Finding> {
    Some(
        Finding::new(format!(
            "'{0}' á sennilega að vera '{0} að' (eða 'þótt')",
            txt
        ))
        .suggest(format!("{} að", txt)),
    )
}

fn i_tolu(_: &ErrorFinder, _: &str, variants: &str, node: &Node) -> Option<Finding> {
    let children = node.children();
    if children.len() != 2 {
        return None;
    }

    let number = if variants.split('_').any(|x| x == "et") {
        "eintölu"
    } else {
        "fleirtölu"
    };
    let subject = node_text(children[0], false);
    Some(
        Finding::new(format!(
            "Sögn á sennilega að vera í {} eins og frumlagið '{}'",
            number, subject
        ))
        .at(children[1].span()),
    )
}

/// A preposition followed by a noun phrase in the wrong case.
fn fs_med_fallstjorn(finder: &ErrorFinder, txt: &str, variants: &str, node: &Node) -> Option<Finding> {
    let case = variants.split('_').next()?;
    let name = case_name(case)?;
    let tree = finder.tree;

    let pp = tree
        .terminal_node(node.start())
        .and_then(|terminal| tree.enclosing(terminal, "PP"));
    if let Some((p, np)) = pp.and_then(|pp| Some((pp.child_with_tag("P")?, pp.child_with_tag("NP")?))) {
        let preposition = p.tidy_text();
        let suggestion = utils::correct_spaces(&format!(
            "{} {}",
            preposition,
            np.cast_to_case(finder.lexicon, case)
        ));
        return Some(
            Finding::new(format!("Á sennilega að vera '{}'", suggestion))
                .detail(format!(
                    "Forsetningin '{}' stýrir {}falli.",
                    preposition.to_lowercase(),
                    name
                ))
                .suggest(suggestion)
                .at((p.start(), np.end())),
        );
    }

    let preposition = txt.split_whitespace().next().unwrap_or(txt);
    Some(Finding::new(format!(
        "Forsetningin '{}' stýrir {}falli.",
        preposition, name
    )))
}

fn sviga_innihald(finder: &ErrorFinder, _: &str, variants: &str, node: &Node) -> Option<Finding> {
    let case = variants.split('_').next()?;
    case_name(case)?;
    let correct = node.cast_to_case(finder.lexicon, case);
    Some(Finding::new(format!("Gæti átt að vera '{}'", correct)).suggest(correct))
}

fn ending(finder: &ErrorFinder, node: &Node, case: &str, detail: fn(&str, &str, &str) -> String) -> Option<Finding> {
    let terminal_node = finder.tree.terminal_node(node.start())?;
    let terminal = terminal_node.terminal_info()?;

    let suggestion = terminal_node.cast_to_case(finder.lexicon, case);
    let article = if terminal.has_variant("gr") {
        " með greini"
    } else {
        ""
    };
    Some(
        Finding::new(format!("Á sennilega að vera '{}'", suggestion))
            .detail(detail(&terminal.lemma, &suggestion, article))
            .suggest(suggestion)
            .at(terminal_node.span()),
    )
}

fn ending_ir(finder: &ErrorFinder, _: &str, _: &str, node: &Node) -> Option<Finding> {
    ending(finder, node, "þf", |lemma, correct, article| {
        format!(
            "Karlkyns orð sem enda á '-ir' í nefnifalli eintölu, eins og '{}', \
             eru rituð '{}' í þolfalli{}.",
            lemma, correct, article
        )
    })
}

fn ending_ana(finder: &ErrorFinder, _: &str, _: &str, node: &Node) -> Option<Finding> {
    ending(finder, node, "ef", |lemma, correct, article| {
        format!(
            "Kvenkyns orð sem enda á '-ana' í nefnifalli fleirtölu, eins og '{}', \
             eru rituð '{}' í eignarfalli fleirtölu{}.",
            lemma, correct, article
        )
    })
}

/// Walks a tree and collects the errors marked in it.
pub struct ErrorFinder<'a> {
    tree: &'a Tree,
    lexicon: &'a dyn Lexicon,
    tables: &'a RuleTables,
}

impl<'a> ErrorFinder<'a> {
    pub fn new(tree: &'a Tree, lexicon: &'a dyn Lexicon, tables: &'a RuleTables) -> Self {
        ErrorFinder {
            tree,
            lexicon,
            tables,
        }
    }

    /// Visits every node in pre-order and returns the annotations found.
    pub fn run(&self) -> Vec<Annotation> {
        let mut annotations = Vec::new();

        for node in self.tree.root().raw_nodes() {
            let annotation = if let Some(info) = node.grammar_info() {
                self.visit_nonterminal(node, info)
            } else if let Some(terminal) = node.terminal_info() {
                if terminal.category == "so" {
                    self.visit_verb(node, terminal)
                } else {
                    None
                }
            } else {
                None
            };

            if let Some(annotation) = annotation {
                debug!("tree error: {}", annotation);
                annotations.push(annotation);
            }
        }

        annotations
    }

    fn visit_nonterminal(&self, node: &Node, info: &GrammarInfo) -> Option<Annotation> {
        if !info.error || info.optional || info.interior {
            return None;
        }

        let mut parts = info.name.splitn(2, '_');
        let name = parts.next().unwrap_or("");
        let variants = parts.next().unwrap_or("");

        let (is_warning, stem) = if let Some(stem) = name.strip_prefix("Aðvörun") {
            (true, stem)
        } else if let Some(stem) = name.strip_prefix("Villa") {
            (false, stem)
        } else {
            (false, name)
        };
        let code = format!("P_NT_{}", stem);

        let txt = node_text(node, false);
        let finding = match HANDLERS.get(name) {
            Some(handler) => handler(self, &txt, variants, node)?,
            None => Finding::new(format!("'{}' er líklega rangt", txt))
                .detail(format!("Regla {}", info.name)),
        };

        let (start, end) = finding.span.unwrap_or_else(|| node.span());
        if finding.suggestion.as_deref() == Some(self.span_text(start, end).as_str()) {
            debug!("{} suggests the text it annotates, skipping", info.name);
            return None;
        }
        let mut annotation = Annotation::new(start, end, code, finding.text)
            .warning(is_warning)
            .with_optional_suggestion(finding.suggestion);
        if let Some(detail) = finding.detail {
            annotation = annotation.with_detail(detail);
        }
        Some(annotation)
    }

    /// The text of the tokens from `start` to `end`, inclusive.
    fn span_text(&self, start: usize, end: usize) -> String {
        let words: Vec<&str> = self
            .tree
            .terminals()
            .into_iter()
            .filter(|x| x.index >= start && x.index <= end)
            .map(|x| x.text.as_str())
            .collect();
        utils::correct_spaces(&words.join(" "))
    }

    /// Checks the case of the subject of verbs with a known wrong subject case.
    fn visit_verb(&self, node: &Node, terminal: &Terminal) -> Option<Annotation> {
        let entry = self.tables.verb_subjects.get(&terminal.lemma)?;
        let variants = &terminal.variants;

        if !variants.iter().any(|x| x == "subj") {
            // a verb with a nominative subject
            if entry.wrong == "nf" {
                return self.wrong_subject_case(node, terminal, &entry.wrong, &entry.right);
            }
            return None;
        }

        if !variants
            .iter()
            .any(|x| x == "op" || x == "sagnb" || x == "nh")
        {
            return None;
        }

        let case = variants.last().map(|x| x.as_str()).unwrap_or("");
        if case == "none" {
            return None;
        }
        if !CASES.contains(&case) {
            debug!("unexpected subject case '{}' in '{}'", case, terminal.name);
            return None;
        }

        if entry.wrong == case {
            self.wrong_subject_case(node, terminal, &entry.wrong, &entry.right)
        } else {
            None
        }
    }

    fn find_subject(&self, verb: &Node) -> Option<&'a Node> {
        let tree = self.tree;
        tree.enclosing(verb, "VP")
            .and_then(|vp| tree.enclosing(vp, "VP"))
            .and_then(|vp| vp.child_with_tag("NP-SUBJ"))
            .or_else(|| {
                tree.enclosing(verb, "IP")
                    .and_then(|ip| ip.child_with_tag("NP-SUBJ"))
            })
    }

    fn wrong_subject_case(
        &self,
        node: &Node,
        terminal: &Terminal,
        wrong: &str,
        right: &str,
    ) -> Option<Annotation> {
        let code = format!("P_WRONG_CASE_{}_{}", wrong, right);
        let wrong_name = case_name(wrong)?;
        let right_name = case_name(right)?;
        let verb = &terminal.lemma;

        match self.find_subject(node) {
            Some(subject) => {
                let subject_text = subject.tidy_text();
                let suggestion = subject.cast_to_case(self.lexicon, right);
                let correct = utils::emulate_case(&suggestion, &subject_text);
                if correct == subject_text {
                    return None;
                }

                let personal = if right == "nf" {
                    "persónuleg"
                } else {
                    "ópersónuleg"
                };
                let (start, end) = subject.span();
                Some(
                    Annotation::new(start, end, code, format!("Á líklega að vera '{}'", correct))
                        .with_detail(format!(
                            "Sögnin 'að {}' er {}. Frumlag hennar á að vera í {}falli í stað {}falls.",
                            verb, personal, right_name, wrong_name
                        ))
                        .with_suggestion(correct),
                )
            }
            None => Some(Annotation::new(
                terminal.index,
                terminal.index,
                code,
                format!(
                    "Frumlag sagnarinnar 'að {}' á að vera í {}falli",
                    verb, right_name
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{components::lexicon::MemoryLexicon, types::Meaning};

    fn lexicon() -> MemoryLexicon {
        MemoryLexicon::from_meanings(vec![
            Meaning::new("ég", "ég", "pfn", "nf_et"),
            Meaning::new("mig", "ég", "pfn", "þf_et"),
            Meaning::new("mér", "ég", "pfn", "þgf_et"),
            Meaning::new("mann", "maður", "kk", "þf_et"),
            Meaning::new("manni", "maður", "kk", "þgf_et"),
        ])
    }

    fn find(tree: &str, tables: &str) -> Vec<Annotation> {
        let tree = Tree::from_bracketed(tree).unwrap();
        let tables = RuleTables::from_str(tables).unwrap();
        let lexicon = lexicon();
        ErrorFinder::new(&tree, &lexicon, &tables).run()
    }

    #[test]
    fn suggests_for_known_nonterminals() {
        let annotations = find(
            "(S0 (CP-ADV-CAUSE (@VillaVístAð:error (ao Víst 'víst') (st að 'að')) \
             (IP (NP-SUBJ (pfn_et_nf ég 'ég')) (VP (so_et_p1 fer 'fara')))))",
            "",
        );

        assert_eq!(annotations.len(), 1);
        let annotation = &annotations[0];
        assert_eq!(annotation.code(), "P_NT_VístAð");
        assert_eq!(annotation.span(), (0, 1));
        assert_eq!(annotation.text(), "'víst að' á sennilega að vera 'fyrst að'");
        assert_eq!(annotation.suggest(), Some("fyrst að"));
    }

    #[test]
    fn describes_unknown_nonterminals() {
        let annotations = find(
            "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (@VillaEitthvað:error (so_et_p1 fer 'fara')))))",
            "",
        );

        assert_eq!(annotations[0].code(), "P_NT_Eitthvað");
        assert_eq!(annotations[0].text(), "'fer' er líklega rangt");
        assert_eq!(annotations[0].detail(), Some("Regla VillaEitthvað"));
    }

    #[test]
    fn marks_warnings() {
        let annotations = find(
            "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_et_p1 fer 'fara') \
             (@AðvörunSíðan:error (ao síðan 'síðan')))))",
            "",
        );

        assert_eq!(annotations[0].code(), "P_NT_Síðan/w");
        assert!(annotations[0].is_warning());
        assert_eq!(annotations[0].suggest(), Some(""));
    }

    #[test]
    fn skips_optional_and_interior_nonterminals() {
        let annotations = find(
            "(S0 (IP (@VillaA:error:optional (pfn_et_nf Ég 'ég')) \
             (@VillaB:error:interior (so_et_p1 fer 'fara')) (@VillaC (ao heim 'heim'))))",
            "",
        );
        assert!(annotations.is_empty());
    }

    #[test]
    fn corrects_case_after_preposition() {
        let annotations = find(
            "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_et_p1 fer 'fara') \
             (PP (@VillaFsMeðFallstjórn_þgf:error (P (fs_þgf frá 'frá')) \
             (NP (no_et_þf_kk mann 'maður' þf_et)))))))",
            "",
        );

        assert_eq!(annotations[0].code(), "P_NT_FsMeðFallstjórn");
        assert_eq!(annotations[0].span(), (2, 3));
        assert_eq!(annotations[0].suggest(), Some("frá manni"));
        assert_eq!(
            annotations[0].detail(),
            Some("Forsetningin 'frá' stýrir þágufalli.")
        );
    }

    #[test]
    fn skips_suggestions_equal_to_the_text() {
        let annotations = find(
            "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_et_p1 fer 'fara') \
             (PP (@VillaFsMeðFallstjórn_þgf:error (P (fs_þgf frá 'frá')) \
             (NP (no_et_þgf_kk manni 'maður' þgf_et)))))))",
            "",
        );

        assert!(annotations.is_empty());
    }

    #[test]
    fn suggests_tho_ad() {
        let annotations = find(
            "(S0 (CP-ADV-CONC (@VillaÞóAð:error (st Þó 'þó')) \
             (IP (NP-SUBJ (pfn_et_nf ég 'ég')) (VP (so_et_p1 fer 'fara')))))",
            "",
        );

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].code(), "P_NT_ÞóAð");
        assert_eq!(annotations[0].span(), (0, 0));
        assert_eq!(annotations[0].suggest(), Some("þó að"));
    }

    #[test]
    fn finds_wrong_subject_case() {
        let annotations = find(
            "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_1_þf_et_p3 vantar 'vanta') \
             (NP-OBJ (no_et_þf_kvk bók 'bók')))))",
            "[verb_subjects]\nvanta nf þgf\n",
        );

        assert_eq!(annotations.len(), 1);
        let annotation = &annotations[0];
        assert_eq!(annotation.code(), "P_WRONG_CASE_nf_þgf");
        assert_eq!(annotation.span(), (0, 0));
        assert_eq!(annotation.suggest(), Some("Mér"));
        assert_eq!(annotation.text(), "Á líklega að vera 'Mér'");
    }

    #[test]
    fn finds_wrong_case_of_impersonal_subject() {
        let annotations = find(
            "(S0 (IP (NP-SUBJ (pfn_et_þf Mig 'ég')) (VP (so_subj_op_þf langar 'langa'))))",
            "[verb_subjects]\nlanga þf þgf\n",
        );
        assert_eq!(annotations[0].suggest(), Some("Mér"));

        let annotations = find(
            "(S0 (IP (NP-SUBJ (pfn_et_þgf Mér 'ég')) (VP (so_subj_op_þgf langar 'langa'))))",
            "[verb_subjects]\nlanga þf þgf\n",
        );
        assert!(annotations.is_empty());
    }

    #[test]
    fn annotates_verb_without_subject() {
        let annotations = find(
            "(S0 (IP (VP (so_1_þf_et_p3 vantar 'vanta') (NP-OBJ (no_et_þf_kvk bók 'bók')))))",
            "[verb_subjects]\nvanta nf þgf\n",
        );

        assert_eq!(annotations[0].span(), (0, 0));
        assert_eq!(
            annotations[0].text(),
            "Frumlag sagnarinnar 'að vanta' á að vera í þágufalli"
        );
        assert_eq!(annotations[0].suggest(), None);
    }
}
