use std::{
    collections::HashMap,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::Parser;
use fs_err::File;
use log::{info, warn};
use malrynir::{
    checker::{CheckOptions, Checker, Sentence},
    components::{
        lexicon::MemoryLexicon, ngram::MemoryNgrams, tokenizer::SimpleTokenizer, Component,
    },
    config::RuleTables,
    tree::Tree,
    types::Token,
    utils, Error,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Text,
    Json,
    M2,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            "m2" => Ok(Format::M2),
            x => Err(format!("unknown format '{}', expected text, json or m2", x)),
        }
    }
}

#[derive(Parser)]
#[clap(version = "0.1", about = "Checks Icelandic text for spelling and grammar errors")]
struct Opts {
    /// The text to check. Read from stdin if not given.
    text: Option<String>,
    /// The rule tables.
    #[clap(long, short)]
    config: PathBuf,
    /// The lexicon, either a binary or in the `lemma;id;category;domain;form;inflection` format.
    #[clap(long, short)]
    lexicon: PathBuf,
    /// N-gram counts for spelling correction, either a binary or `count<TAB>ngram` lines.
    /// Without them words are only flagged as unknown.
    #[clap(long, short)]
    ngrams: Option<PathBuf>,
    /// Bracketed parse trees, one per line, matched to sentences by their tokens.
    /// Sentences without a tree are reported as unparsable (E001).
    #[clap(long)]
    trees: Option<PathBuf>,
    /// Apply spelling corrections which would otherwise only be suggested.
    #[clap(long)]
    apply_suggestions: bool,
    /// Only make corrections which do not depend on context.
    #[clap(long)]
    only_ci: bool,
    /// Output format: text, json or m2.
    #[clap(long, short, default_value = "text")]
    format: Format,
}

fn is_binary(path: &Path) -> bool {
    path.extension().map_or(false, |x| x == "bin")
}

fn load_lexicon(path: &Path) -> Result<MemoryLexicon, Error> {
    if is_binary(path) {
        MemoryLexicon::new(path)
    } else {
        MemoryLexicon::from_csv(BufReader::new(File::open(path)?))
    }
}

fn load_ngrams(path: &Path) -> Result<MemoryNgrams, Error> {
    if is_binary(path) {
        MemoryNgrams::new(path)
    } else {
        MemoryNgrams::from_tsv(BufReader::new(File::open(path)?))
    }
}

/// Parse trees keyed by the space-joined texts of their terminals.
fn load_trees(path: &Path) -> Result<HashMap<String, Tree>, Error> {
    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;

    let mut trees = HashMap::new();
    for line in text.lines().map(str::trim).filter(|x| !x.is_empty()) {
        let tree = Tree::from_bracketed(line)?;
        trees.insert(tree.root().text(), tree);
    }
    info!("read {} parse trees", trees.len());
    Ok(trees)
}

fn print_text(sentence: &Sentence) {
    println!("{}", sentence.original());
    for annotation in sentence.sorted_annotations() {
        println!("  {}", annotation);
    }
    println!("{}", sentence.corrected());
    println!();
}

fn print_m2(sentence: &Sentence) {
    let texts: Vec<&str> = sentence.tokens().iter().map(|x| x.text.as_str()).collect();
    println!("S {}", texts.join(" "));
    for annotation in sentence.sorted_annotations() {
        println!(
            "A {} {}|||{}|||{}|||REQUIRED|||-NONE-|||0",
            annotation.start(),
            annotation.end() + 1,
            annotation.code(),
            annotation.suggest().unwrap_or("-NONE-")
        );
    }
    println!();
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = Opts::parse();

    let text = match opts.text {
        Some(text) => text,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let tables = RuleTables::load(&opts.config)?;
    let lexicon = load_lexicon(&opts.lexicon)?;
    let (ngrams, correct_spelling) = match &opts.ngrams {
        Some(path) => (load_ngrams(path)?, true),
        None => (MemoryNgrams::from_counts(vec![]), false),
    };
    let trees = match &opts.trees {
        Some(path) => Some(load_trees(path)?),
        None => None,
    };
    let has_trees = trees.is_some();
    let trees = trees.unwrap_or_default();

    let parser = move |tokens: &[Token]| {
        let key = tokens
            .iter()
            .map(|x| x.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let tree = trees.get(&key).cloned();
        if tree.is_none() && has_trees {
            warn!("no parse tree for '{}'", utils::detokenize(tokens));
        }
        tree
    };

    let checker = Checker::new(
        Arc::new(tables),
        Arc::new(lexicon),
        Arc::new(ngrams),
        Arc::new(parser),
        CheckOptions {
            correct_spelling,
            apply_suggestions: opts.apply_suggestions,
            only_ci: opts.only_ci,
            ..CheckOptions::default()
        },
    )?;

    for sentence in checker.check(&SimpleTokenizer::default(), &text) {
        match opts.format {
            Format::Text => print_text(&sentence),
            Format::Json => println!("{}", sentence.to_json()),
            Format::M2 => print_m2(&sentence),
        }
    }

    Ok(())
}
