//! A small language for matching tree shapes.
//!
//! # Items
//! - `.` matches any node.
//! - `"text"` matches a node whose text equals `text`, ignoring case.
//! - `'lemma'` matches a terminal (or a nonterminal spanning one terminal) with that lemma.
//!   Middle voice verbs also match their middle voice lemma.
//! - `Tag` matches a nonterminal with that tag or a subcategory of it (`NP` matches `NP-SUBJ`).
//! - `cat_var1_var2` matches a terminal of category `cat` having all the given variants.
//! - `%name` matches a node accepted by the predicate `name` of the [Context].
//! - `( A | B )` matches a node matched by `A` or `B`.
//!
//! # Relations
//! - `A > B` requires a child of `A` to match `B`, `A >> B` a descendant.
//! - `A > { B C }` requires distinct children matching `B` and `C` in any order.
//! - `A > [ B ... C ]` requires the children to match in order. `...` skips any number of
//!   children. Without a leading or trailing `...` the sequence must start at the first
//!   and end at the last child.
//!
//! Relations associate to the right, `A > B > C` means `A > (B > C)`.

use std::{collections::HashMap, fmt};

use thiserror::Error;

use super::{Node, Tree};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unexpected end of pattern")]
    UnexpectedEnd,
    #[error("unexpected '{token}' at position {position}")]
    Unexpected { token: String, position: usize },
    #[error("unterminated quote starting at position {0}")]
    UnterminatedQuote(usize),
    #[error("'...' is only allowed in sequences")]
    MisplacedGap,
    #[error("sequences are only allowed after '>'")]
    DescendantSequence,
    #[error("macro '%{0}' is not defined in the context")]
    UndefinedMacro(String),
    #[error("a context is given but the pattern uses no macros")]
    UnusedContext,
}

/// A predicate usable as a macro in patterns.
pub type Predicate = Box<dyn Fn(&Node) -> bool + Send + Sync>;

/// Maps macro names to predicates.
#[derive(Default)]
pub struct Context {
    macros: HashMap<String, Predicate>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("macros", &self.macros.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn with<S, F>(mut self, name: S, predicate: F) -> Self
    where
        S: Into<String>,
        F: Fn(&Node) -> bool + Send + Sync + 'static,
    {
        self.macros.insert(name.into(), Box::new(predicate));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    fn call(&self, name: &str, node: &Node) -> bool {
        self.macros.get(name).map_or(false, |predicate| predicate(node))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Any,
    Text(String),
    Lemma(String),
    Tag(String),
    Terminal {
        category: String,
        variants: Vec<String>,
    },
    Macro(String),
    Alternatives(Vec<Pattern>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Relation {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
enum Element {
    Pattern(Pattern),
    Gap,
}

#[derive(Debug, Clone, PartialEq)]
enum Target {
    Single(Box<Pattern>),
    Set(Vec<Pattern>),
    Sequence(Vec<Element>),
}

/// A compiled pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    item: Item,
    relation: Option<(Relation, Target)>,
}

impl Pattern {
    pub fn new(text: &str) -> Result<Self, Error> {
        let tokens = lex(text)?;
        let mut parser = PatternParser {
            tokens: &tokens,
            position: 0,
        };
        let pattern = parser.pattern()?;
        if let Some((token, position)) = tokens.get(parser.position) {
            return Err(Error::Unexpected {
                token: token.to_string(),
                position: *position,
            });
        }
        Ok(pattern)
    }

    /// The names of all macros referenced by the pattern.
    pub fn macros(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_macros(&mut out);
        out
    }

    fn collect_macros<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.item {
            Item::Macro(name) => out.push(name),
            Item::Alternatives(patterns) => patterns.iter().for_each(|x| x.collect_macros(out)),
            _ => {}
        }
        match &self.relation {
            Some((_, Target::Single(pattern))) => pattern.collect_macros(out),
            Some((_, Target::Set(patterns))) => patterns.iter().for_each(|x| x.collect_macros(out)),
            Some((_, Target::Sequence(elements))) => {
                for element in elements {
                    if let Element::Pattern(pattern) = element {
                        pattern.collect_macros(out);
                    }
                }
            }
            None => {}
        }
    }

    fn item_matches(&self, node: &Node, context: &Context) -> bool {
        match &self.item {
            Item::Any => true,
            Item::Text(text) => node.text().to_lowercase() == *text,
            Item::Lemma(lemma) => match node.terminal_info() {
                Some(terminal) => terminal.lemma == *lemma || terminal.lemma_mm() == *lemma,
                None => {
                    let terminals = node.terminals();
                    terminals.len() == 1
                        && (terminals[0].lemma == *lemma || terminals[0].lemma_mm() == *lemma)
                }
            },
            Item::Tag(tag) => node.matches_tag(tag),
            Item::Terminal { category, variants } => {
                node.terminal_info().map_or(false, |terminal| {
                    terminal.category == *category
                        && variants.iter().all(|x| terminal.has_variant(x))
                })
            }
            Item::Macro(name) => context.call(name, node),
            Item::Alternatives(patterns) => patterns.iter().any(|x| x.matches(node, context)),
        }
    }

    /// Whether `node` matches this pattern.
    pub fn matches(&self, node: &Node, context: &Context) -> bool {
        if !self.item_matches(node, context) {
            return false;
        }

        match &self.relation {
            None => true,
            Some((relation, target)) => {
                let candidates = match relation {
                    Relation::Child => node.children(),
                    Relation::Descendant => node.descendants(),
                };

                match target {
                    Target::Single(pattern) => candidates.iter().any(|x| pattern.matches(x, context)),
                    Target::Set(patterns) => {
                        let mut used = vec![false; candidates.len()];
                        match_set(patterns, &candidates, &mut used, context)
                    }
                    Target::Sequence(elements) => match_sequence(elements, &candidates, context),
                }
            }
        }
    }

    /// All nodes of the tree matching this pattern, in pre-order.
    pub fn all_matches<'t>(&self, tree: &'t Tree, context: &Context) -> Vec<&'t Node> {
        tree.nodes()
            .into_iter()
            .filter(|x| self.matches(x, context))
            .collect()
    }

    /// The first node in pre-order, starting with `node` itself, matching this pattern.
    pub fn first_match<'t>(&self, node: &'t Node, context: &Context) -> Option<&'t Node> {
        if self.matches(node, context) {
            return Some(node);
        }
        node.descendants()
            .into_iter()
            .find(|x| self.matches(x, context))
    }
}

fn match_set(patterns: &[Pattern], candidates: &[&Node], used: &mut [bool], context: &Context) -> bool {
    let (first, rest) = match patterns.split_first() {
        Some(x) => x,
        None => return true,
    };

    for (i, candidate) in candidates.iter().enumerate() {
        if used[i] || !first.matches(candidate, context) {
            continue;
        }
        used[i] = true;
        if match_set(rest, candidates, used, context) {
            return true;
        }
        used[i] = false;
    }
    false
}

fn match_sequence(elements: &[Element], nodes: &[&Node], context: &Context) -> bool {
    match elements.split_first() {
        None => nodes.is_empty(),
        Some((Element::Gap, rest)) => {
            (0..=nodes.len()).any(|skip| match_sequence(rest, &nodes[skip..], context))
        }
        Some((Element::Pattern(pattern), rest)) => match nodes.split_first() {
            Some((node, nodes)) => {
                pattern.matches(node, context) && match_sequence(rest, nodes, context)
            }
            None => false,
        },
    }
}

fn lex(text: &str) -> Result<Vec<(String, usize)>, Error> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (position, c) = chars[i];
        match c {
            c if c.is_whitespace() => {
                i += 1;
            }
            '{' | '}' | '[' | ']' | '(' | ')' | '|' => {
                tokens.push((c.to_string(), position));
                i += 1;
            }
            '>' => {
                if chars.get(i + 1).map(|x| x.1) == Some('>') {
                    tokens.push((">>".to_string(), position));
                    i += 2;
                } else {
                    tokens.push((">".to_string(), position));
                    i += 1;
                }
            }
            '"' | '\'' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|x| x.1 == c)
                    .ok_or(Error::UnterminatedQuote(position))?;
                // keep the opening quote to mark the kind of literal
                let literal: String = chars[i..i + 1 + end].iter().map(|x| x.1).collect();
                tokens.push((literal, position));
                i += end + 2;
            }
            _ => {
                let start = i;
                while i < chars.len() {
                    let c = chars[i].1;
                    if c.is_whitespace() || "{}[]()|>\"'".contains(c) {
                        break;
                    }
                    i += 1;
                }
                let word: String = chars[start..i].iter().map(|x| x.1).collect();
                tokens.push((word, position));
            }
        }
    }

    Ok(tokens)
}

struct PatternParser<'a> {
    tokens: &'a [(String, usize)],
    position: usize,
}

impl<'a> PatternParser<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).map(|x| x.0.as_str())
    }

    fn next(&mut self) -> Result<&'a (String, usize), Error> {
        let token = self.tokens.get(self.position).ok_or(Error::UnexpectedEnd)?;
        self.position += 1;
        Ok(token)
    }

    fn unexpected(token: &(String, usize)) -> Error {
        Error::Unexpected {
            token: token.0.clone(),
            position: token.1,
        }
    }

    fn pattern(&mut self) -> Result<Pattern, Error> {
        let item = self.item()?;

        let relation = match self.peek() {
            Some(">") => Some(Relation::Child),
            Some(">>") => Some(Relation::Descendant),
            _ => None,
        };
        let relation = match relation {
            Some(relation) => {
                self.position += 1;
                Some((relation, self.target(relation)?))
            }
            None => None,
        };

        Ok(Pattern { item, relation })
    }

    fn target(&mut self, relation: Relation) -> Result<Target, Error> {
        match self.peek() {
            Some("{") => {
                self.position += 1;
                let mut patterns = Vec::new();
                while self.peek() != Some("}") {
                    patterns.push(self.pattern()?);
                }
                self.position += 1;
                Ok(Target::Set(patterns))
            }
            Some("[") => {
                if relation == Relation::Descendant {
                    return Err(Error::DescendantSequence);
                }
                self.position += 1;
                let mut elements = Vec::new();
                loop {
                    match self.peek() {
                        Some("]") => break,
                        Some("...") => {
                            self.position += 1;
                            elements.push(Element::Gap);
                        }
                        Some(_) => elements.push(Element::Pattern(self.pattern()?)),
                        None => return Err(Error::UnexpectedEnd),
                    }
                }
                self.position += 1;
                Ok(Target::Sequence(elements))
            }
            _ => Ok(Target::Single(Box::new(self.pattern()?))),
        }
    }

    fn item(&mut self) -> Result<Item, Error> {
        let token = self.next()?;
        let text = token.0.as_str();

        Ok(match text {
            "." => Item::Any,
            "..." => return Err(Error::MisplacedGap),
            "(" => {
                let mut patterns = vec![self.pattern()?];
                loop {
                    let token = self.next()?;
                    match token.0.as_str() {
                        "|" => patterns.push(self.pattern()?),
                        ")" => break,
                        _ => return Err(Self::unexpected(token)),
                    }
                }
                Item::Alternatives(patterns)
            }
            ")" | "|" | "{" | "}" | "[" | "]" | ">" | ">>" => {
                return Err(Self::unexpected(token));
            }
            _ => {
                if let Some(literal) = text.strip_prefix('"') {
                    Item::Text(literal.to_lowercase())
                } else if let Some(literal) = text.strip_prefix('\'') {
                    Item::Lemma(literal.to_string())
                } else if let Some(name) = text.strip_prefix('%') {
                    Item::Macro(name.to_string())
                } else if text.chars().next().map_or(false, char::is_lowercase) {
                    let mut parts = text.split('_');
                    Item::Terminal {
                        category: parts.next().unwrap_or("").to_string(),
                        variants: parts.map(String::from).collect(),
                    }
                } else {
                    Item::Tag(text.to_string())
                }
            }
        })
    }
}
