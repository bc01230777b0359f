//! Sentence-level annotations and the rules for combining them.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns `true` if the code denotes a warning rather than an error.
pub fn is_warning(code: &str) -> bool {
    code.ends_with("/w")
}

/// Returns `true` if the code denotes a hard error.
pub fn is_error(code: &str) -> bool {
    !is_warning(code)
}

fn base_code(code: &str) -> &str {
    code.strip_suffix("/w").unwrap_or(code)
}

/// An annotation of a token span of a sentence.
///
/// `start` and `end` are inclusive indices into the corrected token list of the sentence.
/// `suggest`, if set, is the replacement text for the span as space-separated token texts.
/// It is not detokenized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    start: usize,
    end: usize,
    code: String,
    text: String,
    detail: Option<String>,
    original: Option<String>,
    suggest: Option<String>,
}

impl Annotation {
    /// # Panics
    /// Panics if `start > end`.
    pub fn new<C: Into<String>, T: Into<String>>(start: usize, end: usize, code: C, text: T) -> Self {
        assert!(
            start <= end,
            "annotation start {} must not exceed end {}",
            start,
            end
        );

        Annotation {
            start,
            end,
            code: code.into(),
            text: text.into(),
            detail: None,
            original: None,
            suggest: None,
        }
    }

    /// Marks the annotation as a warning, appending `/w` to the code if needed.
    pub fn warning(mut self, is_warning: bool) -> Self {
        if is_warning && !self.is_warning() {
            self.code.push_str("/w");
        }
        self
    }

    pub fn with_detail<S: Into<String>>(mut self, detail: S) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_original<S: Into<String>>(mut self, original: S) -> Self {
        self.original = Some(original.into());
        self
    }

    pub fn with_suggestion<S: Into<String>>(mut self, suggest: S) -> Self {
        self.suggest = Some(suggest.into());
        self
    }

    pub fn with_optional_suggestion(mut self, suggest: Option<String>) -> Self {
        self.suggest = suggest;
        self
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

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    pub fn suggest(&self) -> Option<&str> {
        self.suggest.as_deref()
    }

    pub fn is_warning(&self) -> bool {
        is_warning(&self.code)
    }

    pub fn is_error(&self) -> bool {
        is_error(&self.code)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:03}-{:03}: {:6} {}",
            self.start, self.end, self.code, self.text
        )?;
        if let Some(suggest) = &self.suggest {
            write!(f, " / [{}]", suggest)?;
        }
        Ok(())
    }
}

/// Sorts annotations by start index and then by decreasing end index, i. e. wider spans first.
pub fn sort_for_display(annotations: &mut [Annotation]) {
    annotations.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
}

/// Removes the first annotation with the given span and code. Returns whether one was removed.
pub fn remove(annotations: &mut Vec<Annotation>, start: usize, end: usize, code: &str) -> bool {
    match annotations
        .iter()
        .position(|x| x.start == start && x.end == end && x.code == code)
    {
        Some(index) => {
            annotations.remove(index);
            true
        }
        None => false,
    }
}

/// A declared partial order between annotation codes.
///
/// An entry `(x, y)` means that an annotation with code `x` replaces an annotation
/// with code `y` at the identical span. Codes are compared without their warning suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct Precedence {
    supersedes: Vec<(String, String)>,
}

impl Default for Precedence {
    fn default() -> Self {
        Precedence::new(&[
            ("P_NT_FjöldiHluti", "P_NUMBER"),
            ("P_NT_EinnAf", "P_NUMBER"),
            ("P_NT_ÍTölu", "P_NUMBER"),
            ("P001", "P_NT_FsMeðFallstjórn"),
        ])
    }
}

impl Precedence {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Precedence {
            supersedes: pairs
                .iter()
                .map(|(x, y)| (x.to_string(), y.to_string()))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Precedence {
            supersedes: Vec::new(),
        }
    }

    pub fn add<S: Into<String>>(&mut self, winner: S, loser: S) {
        self.supersedes.push((winner.into(), loser.into()));
    }

    /// Whether `winner` supersedes `loser`, directly or through a chain of declarations.
    pub fn supersedes(&self, winner: &str, loser: &str) -> bool {
        let (winner, loser) = (base_code(winner), base_code(loser));
        let mut frontier = vec![winner];
        let mut seen = vec![winner];

        while let Some(code) = frontier.pop() {
            for (x, y) in &self.supersedes {
                if x == code {
                    if y == loser {
                        return true;
                    }
                    if !seen.contains(&y.as_str()) {
                        seen.push(y);
                        frontier.push(y);
                    }
                }
            }
        }
        false
    }

    /// Resolves a list of candidate annotations into the final list.
    ///
    /// Drops every candidate superseded by another candidate at the identical span, and
    /// every later duplicate of an earlier candidate with the same span and code.
    /// The remaining candidates keep their order.
    pub fn resolve(&self, candidates: Vec<Annotation>) -> Vec<Annotation> {
        let mut keep = vec![true; candidates.len()];

        for (i, candidate) in candidates.iter().enumerate() {
            let superseded = candidates.iter().any(|other| {
                other.span() == candidate.span() && self.supersedes(&other.code, &candidate.code)
            });
            let duplicate = candidates[..i]
                .iter()
                .any(|other| other.span() == candidate.span() && other.code == candidate.code);

            if superseded || duplicate {
                keep[i] = false;
            }
        }

        candidates
            .into_iter()
            .zip(keep)
            .filter_map(|(x, keep)| if keep { Some(x) } else { None })
            .collect()
    }
}
