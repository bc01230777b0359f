use std::{collections::HashMap, sync::Arc};

use lazy_static::lazy_static;
use malrynir::{
    annotation::Annotation,
    checker::{CheckOptions, Checker, Sentence},
    components::{lexicon::MemoryLexicon, ngram::MemoryNgrams, tokenizer::SimpleTokenizer},
    config::RuleTables,
    correct::apply_corrections,
    properties::Tokenize,
    tree::Tree,
    types::{Meaning, Token},
};
use quickcheck_macros::quickcheck;

const CONFIG: &str = "
[allowed_multiples]
sem
[verb_subjects]
vanta nf þgf
";

const TREES: &[&str] = &[
    "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_0_et_p1 fer 'fara') (ADVP (ao heim 'heim')))))",
    "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég')) (VP (so_1_þf_et_p3 vantar 'vanta') \
     (NP-OBJ (no_et_þf_kvk bók 'bók')))))",
];

fn lexicon() -> MemoryLexicon {
    MemoryLexicon::from_meanings(vec![
        Meaning::new("ég", "ég", "pfn", "nf_et"),
        Meaning::new("mér", "ég", "pfn", "þgf_et"),
        Meaning::new("fer", "fara", "so", "fh_nt_p1_et"),
        Meaning::new("heim", "heim", "ao", "-"),
        Meaning::new("vantar", "vanta", "so", "fh_nt_p3_et"),
        Meaning::new("bók", "bók", "kvk", "þf_et"),
    ])
}

fn checker(options: CheckOptions) -> Checker {
    let trees: HashMap<String, Tree> = TREES
        .iter()
        .map(|x| {
            let tree = Tree::from_bracketed(x).unwrap();
            (tree.root().text(), tree)
        })
        .collect();
    let parser = move |tokens: &[Token]| {
        let key = tokens
            .iter()
            .map(|x| x.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        trees.get(&key).cloned()
    };

    Checker::new(
        Arc::new(RuleTables::from_str(CONFIG).unwrap()),
        Arc::new(lexicon()),
        Arc::new(MemoryNgrams::from_counts(vec![])),
        Arc::new(parser),
        options,
    )
    .unwrap()
}

lazy_static! {
    static ref CHECKER: Checker = checker(CheckOptions {
        correct_spelling: false,
        ..CheckOptions::default()
    });
    static ref TOKENIZER: SimpleTokenizer = SimpleTokenizer::default();
}

fn check(text: &str) -> Sentence {
    let mut sentences = CHECKER.check(&*TOKENIZER, text);
    assert_eq!(sentences.len(), 1);
    sentences.remove(0)
}

#[test]
fn can_check_empty_text() {
    assert!(CHECKER.check(&*TOKENIZER, "").is_empty());
}

#[quickcheck]
fn can_tokenize_anything(text: String) -> bool {
    TOKENIZER.tokenize(&text);
    true
}

#[test]
fn drops_repeated_words() {
    let sentence = check("Ég fer fer heim");

    assert_eq!(sentence.text(), "Ég fer heim");
    assert_eq!(sentence.original(), "Ég fer fer heim");
    assert!(sentence.tree().is_some());

    let annotations = sentence.annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].code(), "C001");
    assert_eq!(annotations[0].span(), (1, 1));
    assert_eq!(sentence.char_offsets(), vec![0, 3, 7, 11]);
}

#[test]
fn keeps_repeated_words_without_context() {
    let checker = checker(CheckOptions {
        correct_spelling: false,
        only_ci: true,
        ..CheckOptions::default()
    });
    let sentences = checker.check(&*TOKENIZER, "Ég fer fer heim");
    assert_eq!(sentences.len(), 1);

    assert_eq!(sentences[0].text(), "Ég fer fer heim");
    assert!(sentences[0]
        .annotations()
        .iter()
        .all(|x| x.code() != "C001"));
}

#[test]
fn corrects_case_of_subject() {
    let sentence = check("Ég vantar bók");

    let annotations = sentence.annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].code(), "P_WRONG_CASE_nf_þgf");
    assert_eq!(annotations[0].span(), (0, 0));
    assert_eq!(annotations[0].suggest(), Some("Mér"));
    assert_eq!(sentence.corrected(), "Mér vantar bók");
}

#[test]
fn flags_unknown_words_and_unparsable_sentences() {
    let sentence = check("Ég fer glompsk");

    assert!(sentence.tree().is_none());
    let annotations = sentence.sorted_annotations();
    assert_eq!(annotations.len(), 2);

    assert_eq!(annotations[0].code(), "E001");
    assert_eq!(annotations[0].span(), (0, 2));
    assert_eq!(annotations[1].code(), "U001");
    assert_eq!(annotations[1].span(), (2, 2));
    assert!(annotations[1].is_error());

    // nothing to apply
    assert_eq!(sentence.corrected(), "Ég fer glompsk");
}

#[test]
fn checks_each_sentence() {
    let sentences = CHECKER.check(&*TOKENIZER, "Ég fer heim. Ég vantar bók.");
    assert_eq!(sentences.len(), 2);
}

#[test]
fn applies_corrections_from_the_end() {
    let tokens = ["Ég", "vantar", "bók", "bók"];
    let annotations = vec![
        Annotation::new(0, 0, "P_WRONG_CASE_nf_þgf", "x").with_suggestion("Mér"),
        Annotation::new(2, 3, "C001", "x").with_suggestion("bók"),
    ];

    assert_eq!(
        apply_corrections(&tokens, &annotations),
        vec!["Mér", "vantar", "bók"]
    );
}

#[quickcheck]
fn warnings_are_marked_in_the_code(code: String, warning: bool) -> bool {
    let annotation = Annotation::new(0, 0, code.as_str(), "x").warning(warning);
    annotation.is_warning() == (warning || code.ends_with("/w"))
        && annotation.is_error() != annotation.is_warning()
}

#[quickcheck]
fn disjoint_corrections_shrink_the_sentence(widths: Vec<u8>) -> bool {
    let mut annotations = Vec::new();
    let mut length = 0;
    for width in widths.iter().take(32) {
        let start = length;
        let end = start + (*width % 4) as usize;
        annotations.push(Annotation::new(start, end, "X", "x").with_suggestion("y"));
        // one untouched token between annotations
        length = end + 2;
    }

    let tokens = vec!["t"; length];
    let removed: usize = annotations.iter().map(|x| x.end() - x.start()).sum();
    apply_corrections(&tokens, &annotations).len() == length - removed
}
