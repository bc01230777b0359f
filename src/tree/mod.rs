//! Constituency trees as delivered by a [Parser][crate::properties::Parser].
//!
//! A tree consists of nonterminals such as `IP`, `NP-SUBJ` or `VP` and terminals, each of
//! which covers exactly one token. Nonterminals can carry [GrammarInfo] if they stem from
//! a grammar nonterminal, e. g. one which recognizes a common mistake. Those are transparent
//! to [pattern matching][pattern] and only visited by the
//! [error finder][crate::errfinder].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{properties::Lexicon, utils};

pub mod pattern;

/// Terminal categories which decline by case.
const DECLINABLE: &[&str] = &[
    "no", "lo", "fn", "pfn", "gr", "to", "töl", "abfn", "person", "kk", "kvk", "hk",
];

pub const CASES: &[&str] = &["nf", "þf", "þgf", "ef"];

/// The stem of the name of a case as used in messages, e. g. "þágu" for "þgf"
/// as in "þágufalli".
pub fn case_name(case: &str) -> Option<&'static str> {
    match case {
        "nf" => Some("nefni"),
        "þf" => Some("þol"),
        "þgf" => Some("þágu"),
        "ef" => Some("eignar"),
        _ => None,
    }
}

const GENDERS: &[&str] = &["kk", "kvk", "hk"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unexpected end of tree")]
    UnexpectedEnd,
    #[error("unexpected '{0}' in tree")]
    Unexpected(String),
    #[error("terminal '{0}' needs a text and a quoted lemma")]
    IncompleteTerminal(String),
}

/// Information on a grammar nonterminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarInfo {
    pub name: String,
    /// Whether the nonterminal recognizes an error.
    pub error: bool,
    pub optional: bool,
    pub interior: bool,
}

/// A terminal of the tree, i. e. a token matched by a grammar terminal such as
/// `so_1_þgf_subj_op_et_þf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminal {
    /// The full terminal name.
    pub name: String,
    /// The first part of the name, e. g. `so` or `no`.
    pub category: String,
    /// The remaining parts of the name.
    pub variants: Vec<String>,
    /// The category of the word in the lexicon, e. g. `kk` for a masculine noun.
    pub word_category: String,
    pub lemma: String,
    pub text: String,
    /// The index of the token in the sentence.
    pub index: usize,
    /// The inflection tags of the matched meaning.
    pub inflection: Vec<String>,
}

impl Terminal {
    pub fn new<S: Into<String>>(name: S, text: S, lemma: S, index: usize) -> Self {
        let name = name.into();
        let mut parts = name.split('_');
        let category = parts.next().unwrap_or("").to_string();
        let variants: Vec<String> = parts.map(String::from).collect();

        let word_category = if category == "no" {
            variants
                .iter()
                .find(|x| GENDERS.contains(&x.as_str()))
                .cloned()
                .unwrap_or_else(|| category.clone())
        } else {
            category.clone()
        };

        Terminal {
            name,
            category,
            variants,
            word_category,
            lemma: lemma.into(),
            text: text.into(),
            index,
            inflection: Vec::new(),
        }
    }

    pub fn with_inflection(mut self, inflection: &str) -> Self {
        self.inflection = inflection
            .split('_')
            .filter(|x| !x.is_empty() && *x != "-")
            .map(String::from)
            .collect();
        // the meaning tells the gender of a noun if the terminal does not
        if self.category == "no" && self.word_category == "no" {
            if let Some(gender) = self.inflection.iter().find(|x| GENDERS.contains(&x.as_str())) {
                self.word_category = gender.clone();
            }
        }
        self
    }

    pub fn with_word_category<S: Into<String>>(mut self, category: S) -> Self {
        self.word_category = category.into();
        self
    }

    /// The variants of the terminal name followed by the inflection tags of the word.
    pub fn all_variants(&self) -> impl Iterator<Item = &str> {
        self.variants
            .iter()
            .chain(self.inflection.iter())
            .map(|x| x.as_str())
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        self.all_variants().any(|x| x == variant)
    }

    /// The case of the word, if it declines.
    pub fn case(&self) -> Option<&str> {
        self.inflection
            .iter()
            .chain(self.variants.iter())
            .map(|x| x.as_str())
            .find(|x| CASES.contains(x))
    }

    /// The lemma in middle voice if the terminal is a middle voice verb.
    pub fn lemma_mm(&self) -> String {
        if self.category == "so" && self.has_variant("mm") && !self.lemma.ends_with("st") {
            format!("{}st", self.lemma)
        } else {
            self.lemma.clone()
        }
    }

    pub fn is_declinable(&self) -> bool {
        DECLINABLE.contains(&self.category.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Nonterminal {
        tag: String,
        grammar: Option<GrammarInfo>,
    },
    Terminal(Terminal),
}

/// A node of a tree. The span is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,
    children: Vec<Node>,
    start: usize,
    end: usize,
}

impl Node {
    pub fn terminal(terminal: Terminal) -> Self {
        let index = terminal.index;
        Node {
            kind: NodeKind::Terminal(terminal),
            children: Vec::new(),
            start: index,
            end: index,
        }
    }

    /// # Panics
    /// Panics if `children` is empty.
    pub fn nonterminal<S: Into<String>>(tag: S, children: Vec<Node>) -> Self {
        Node::build(
            NodeKind::Nonterminal {
                tag: tag.into(),
                grammar: None,
            },
            children,
        )
    }

    /// A nonterminal stemming from the grammar nonterminal described by `info`.
    pub fn grammar(info: GrammarInfo, children: Vec<Node>) -> Self {
        Node::build(
            NodeKind::Nonterminal {
                tag: info.name.clone(),
                grammar: Some(info),
            },
            children,
        )
    }

    fn build(kind: NodeKind, children: Vec<Node>) -> Self {
        assert!(!children.is_empty(), "nonterminals must have children");
        let start = children.iter().map(|x| x.start).min().unwrap_or(0);
        let end = children.iter().map(|x| x.end).max().unwrap_or(0);

        Node {
            kind,
            children,
            start,
            end,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// The tag of a nonterminal.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Nonterminal { tag, .. } => Some(tag),
            NodeKind::Terminal(_) => None,
        }
    }

    pub fn grammar_info(&self) -> Option<&GrammarInfo> {
        match &self.kind {
            NodeKind::Nonterminal { grammar, .. } => grammar.as_ref(),
            NodeKind::Terminal(_) => None,
        }
    }

    pub fn is_grammar(&self) -> bool {
        self.grammar_info().is_some()
    }

    pub fn terminal_info(&self) -> Option<&Terminal> {
        match &self.kind {
            NodeKind::Terminal(terminal) => Some(terminal),
            NodeKind::Nonterminal { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal_info().is_some()
    }

    /// Whether the tag is `tag` or a subcategory of it, e. g. `NP-SUBJ` for `NP`.
    pub fn matches_tag(&self, tag: &str) -> bool {
        self.tag().map_or(false, |x| {
            x == tag || (x.starts_with(tag) && x[tag.len()..].starts_with('-'))
        })
    }

    /// All children including grammar nonterminals.
    pub fn raw_children(&self) -> &[Node] {
        &self.children
    }

    /// The children with grammar nonterminals replaced by their own children.
    pub fn children(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        for child in &self.children {
            if child.is_grammar() {
                out.extend(child.children());
            } else {
                out.push(child);
            }
        }
        out
    }

    /// All descendants without grammar nonterminals, in pre-order.
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        for child in self.children() {
            out.push(child);
            out.extend(child.descendants());
        }
        out
    }

    /// This node and all its descendants, including grammar nonterminals, in pre-order.
    pub fn raw_nodes(&self) -> Vec<&Node> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.raw_nodes());
        }
        out
    }

    /// The terminals below this node, in order.
    pub fn terminals(&self) -> Vec<&Terminal> {
        match &self.kind {
            NodeKind::Terminal(terminal) => vec![terminal],
            NodeKind::Nonterminal { .. } => {
                self.children.iter().flat_map(|x| x.terminals()).collect()
            }
        }
    }

    pub fn first_terminal(&self) -> Option<&Terminal> {
        self.terminals().into_iter().next()
    }

    /// The lemma of a terminal or of a nonterminal spanning exactly one terminal.
    pub fn lemma(&self) -> Option<&str> {
        let mut terminals = self.terminals().into_iter();
        match (terminals.next(), terminals.next()) {
            (Some(terminal), None) => Some(terminal.lemma.as_str()),
            _ => None,
        }
    }

    /// The texts of the terminals, joined by spaces.
    pub fn text(&self) -> String {
        self.terminals()
            .iter()
            .map(|x| x.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The text with normalized spacing around punctuation.
    pub fn tidy_text(&self) -> String {
        utils::correct_spaces(&self.text())
    }

    /// The first child (skipping grammar nonterminals) with the given tag.
    pub fn child_with_tag(&self, tag: &str) -> Option<&Node> {
        self.children().into_iter().find(|x| x.matches_tag(tag))
    }

    /// The first descendant in pre-order with the given tag.
    pub fn descendant_with_tag(&self, tag: &str) -> Option<&Node> {
        self.descendants().into_iter().find(|x| x.matches_tag(tag))
    }

    /// The path from this node down to `target`, both included. Compares by identity.
    pub fn path_to<'a>(&'a self, target: &Node) -> Option<Vec<&'a Node>> {
        if std::ptr::eq(self, target) {
            return Some(vec![self]);
        }
        for child in &self.children {
            if let Some(mut path) = child.path_to(target) {
                path.insert(0, self);
                return Some(path);
            }
        }
        None
    }

    /// Returns the text of this node with every declinable word put into `case`.
    /// Words the lexicon cannot inflect keep their form.
    pub fn cast_to_case<L: Lexicon + ?Sized>(&self, lexicon: &L, case: &str) -> String {
        let words: Vec<String> = self
            .terminals()
            .iter()
            .map(|terminal| {
                if !terminal.is_declinable() || terminal.case().is_none() {
                    return terminal.text.clone();
                }
                lexicon
                    .lookup_variants(&terminal.text, &terminal.word_category, &[case])
                    .first()
                    .map_or_else(
                        || terminal.text.clone(),
                        |form| utils::emulate_case(&form.form, &terminal.text),
                    )
            })
            .collect();

        utils::correct_spaces(&words.join(" "))
    }
}

/// A parse tree of a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    root: Node,
}

impl Tree {
    pub fn new(root: Node) -> Self {
        Tree { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// All nodes without grammar nonterminals in pre-order, starting with the root.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut out = vec![&self.root];
        out.extend(self.root.descendants());
        out
    }

    pub fn terminals(&self) -> Vec<&Terminal> {
        self.root.terminals()
    }

    /// The terminal covering the token at `index`.
    pub fn terminal_at(&self, index: usize) -> Option<&Terminal> {
        self.terminals().into_iter().find(|x| x.index == index)
    }

    /// The ancestors of `node` without grammar nonterminals, innermost first.
    pub fn ancestors(&self, node: &Node) -> Vec<&Node> {
        let mut path = self.root.path_to(node).unwrap_or_default();
        path.pop();
        path.into_iter().rev().filter(|x| !x.is_grammar()).collect()
    }

    /// The innermost ancestor of `node` with the given tag.
    pub fn enclosing(&self, node: &Node, tag: &str) -> Option<&Node> {
        self.ancestors(node).into_iter().find(|x| x.matches_tag(tag))
    }

    /// The node of the terminal at token index `index`.
    pub fn terminal_node(&self, index: usize) -> Option<&Node> {
        self.root
            .raw_nodes()
            .into_iter()
            .find(|x| x.terminal_info().map_or(false, |t| t.index == index))
    }

    /// Reads a tree from its bracketed form.
    ///
    /// Nonterminals are written `(TAG child ...)`. Grammar nonterminals start with `@` and
    /// can have flags attached: `(@VillaVístAð:error ...)`. Terminals are written
    /// `(name text 'lemma' inflection)` where the inflection is optional. Tokens are numbered
    /// in the order of the terminals.
    ///
    /// ```
    /// use malrynir::tree::Tree;
    ///
    /// let tree = Tree::from_bracketed(
    ///     "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég' nf_et)) (VP (so_et_p1 fer 'fara'))))",
    /// )?;
    /// assert_eq!(tree.root().text(), "Ég fer");
    /// # Ok::<(), malrynir::tree::Error>(())
    /// ```
    pub fn from_bracketed(text: &str) -> Result<Tree, Error> {
        let tokens = bracket_tokens(text);
        let mut reader = BracketReader {
            tokens: &tokens,
            position: 0,
            index: 0,
        };
        let root = reader.node()?;
        if let Some(token) = tokens.get(reader.position) {
            return Err(Error::Unexpected(token.to_string()));
        }
        Ok(Tree { root })
    }
}

fn bracket_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(&text[s..i]);
            }
            if !c.is_whitespace() {
                tokens.push(&text[i..i + 1]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

struct BracketReader<'a> {
    tokens: &'a [&'a str],
    position: usize,
    index: usize,
}

impl<'a> BracketReader<'a> {
    fn next(&mut self) -> Result<&'a str, Error> {
        let token = self
            .tokens
            .get(self.position)
            .copied()
            .ok_or(Error::UnexpectedEnd)?;
        self.position += 1;
        Ok(token)
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).copied()
    }

    fn node(&mut self) -> Result<Node, Error> {
        match self.next()? {
            "(" => {}
            x => return Err(Error::Unexpected(x.to_string())),
        }
        let head = self.next()?;
        if head == "(" || head == ")" {
            return Err(Error::Unexpected(head.to_string()));
        }

        if head.chars().next().map_or(false, char::is_lowercase) {
            return self.terminal(head);
        }

        let mut children = Vec::new();
        while self.peek() == Some("(") {
            children.push(self.node()?);
        }
        match self.next()? {
            ")" => {}
            x => return Err(Error::Unexpected(x.to_string())),
        }
        if children.is_empty() {
            return Err(Error::Unexpected(")".into()));
        }

        Ok(match head.strip_prefix('@') {
            Some(grammar) => {
                let mut parts = grammar.split(':');
                let mut info = GrammarInfo {
                    name: parts.next().unwrap_or("").to_string(),
                    ..GrammarInfo::default()
                };
                for flag in parts {
                    match flag {
                        "error" => info.error = true,
                        "optional" => info.optional = true,
                        "interior" => info.interior = true,
                        x => return Err(Error::Unexpected(x.to_string())),
                    }
                }
                Node::grammar(info, children)
            }
            None => Node::nonterminal(head, children),
        })
    }

    fn terminal(&mut self, name: &'a str) -> Result<Node, Error> {
        let mut parts = Vec::new();
        loop {
            match self.next()? {
                ")" => break,
                "(" => return Err(Error::Unexpected("(".into())),
                x => parts.push(x),
            }
        }

        let (text, lemma, inflection) = match parts.as_slice() {
            [text, lemma] => (*text, *lemma, None),
            [text, lemma, inflection] => (*text, *lemma, Some(*inflection)),
            _ => return Err(Error::IncompleteTerminal(name.to_string())),
        };
        let lemma = lemma
            .strip_prefix('\'')
            .and_then(|x| x.strip_suffix('\''))
            .ok_or_else(|| Error::IncompleteTerminal(name.to_string()))?;

        let mut terminal = Terminal::new(name, text, lemma, self.index);
        if let Some(inflection) = inflection {
            terminal = terminal.with_inflection(inflection);
        }
        self.index += 1;
        Ok(Node::terminal(terminal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{components::lexicon::MemoryLexicon, types::Meaning};

    fn tree() -> Tree {
        Tree::from_bracketed(
            "(S0 (IP (NP-SUBJ (pfn_et_nf Ég 'ég' nf_et))
                     (VP (@VillaVístAð:error (so_1_þf_subj_op_et_þf vantar 'vanta' fh_nt_p3_et))
                         (NP-OBJ (no_et_þf_kvk bók 'bók' þf_et)))))",
        )
        .unwrap()
    }

    #[test]
    fn reads_bracketed_trees() {
        let tree = tree();

        assert_eq!(tree.root().span(), (0, 2));
        assert_eq!(tree.root().text(), "Ég vantar bók");
        let verb = tree.terminal_at(1).unwrap();
        assert_eq!(verb.category, "so");
        assert_eq!(verb.variants[0], "1");
        assert!(verb.has_variant("p3"));

        let noun = tree.terminal_at(2).unwrap();
        assert_eq!(noun.word_category, "kvk");
        assert_eq!(noun.case(), Some("þf"));

        assert!(Tree::from_bracketed("(S0 (IP").is_err());
        assert!(Tree::from_bracketed("(S0 (no_et_nf hestur))").is_err());
    }

    #[test]
    fn grammar_nonterminals_are_transparent() {
        let tree = tree();
        let vp = tree.root().descendant_with_tag("VP").unwrap();

        assert_eq!(vp.raw_children().len(), 2);
        assert!(vp.raw_children()[0].is_grammar());
        assert!(vp.children()[0].is_terminal());
        assert!(!tree.nodes().iter().any(|x| x.is_grammar()));
    }

    #[test]
    fn finds_ancestors() {
        let tree = tree();
        let verb = tree.terminal_node(1).unwrap();

        assert_eq!(tree.ancestors(verb)[0].tag(), Some("VP"));
        assert_eq!(tree.enclosing(verb, "IP").unwrap().span(), (0, 2));
        assert!(tree.enclosing(verb, "CP").is_none());
        assert!(tree.root().descendant_with_tag("NP").unwrap().matches_tag("NP"));
    }

    #[test]
    fn casts_noun_phrases() {
        let lexicon = MemoryLexicon::from_meanings(vec![
            Meaning::new("ég", "ég", "pfn", "nf_et"),
            Meaning::new("mér", "ég", "pfn", "þgf_et"),
        ]);
        let tree = tree();
        let subject = tree.root().descendant_with_tag("NP-SUBJ").unwrap();

        assert_eq!(subject.cast_to_case(&lexicon, "þgf"), "Mér");
        assert_eq!(subject.cast_to_case(&lexicon, "ef"), "Ég");
    }

    #[test]
    fn middle_voice_lemma() {
        let terminal = Terminal::new("so_0_mm", "kemst", "komast", 0);
        assert_eq!(terminal.lemma_mm(), "komast");
        let terminal = Terminal::new("so_0", "kemst", "koma", 0).with_inflection("mm_fh");
        assert_eq!(terminal.lemma_mm(), "komast");
    }
}
