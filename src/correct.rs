//! Applying suggested corrections to the tokens of a sentence.

use std::cmp::Reverse;

use log::{debug, warn};

use crate::annotation::Annotation;

/// Replaces the tokens covered by each annotation with its suggestion.
///
/// Annotations are applied from the end of the sentence, so the spans of the remaining
/// ones stay valid. An annotation containing spans which were already rewritten replaces
/// them as a whole. One which only partially overlaps a rewritten span is skipped.
/// Annotations without a suggestion are ignored, empty suggestions leave an empty token.
pub fn apply_corrections<S: AsRef<str>>(tokens: &[S], annotations: &[Annotation]) -> Vec<String> {
    let mut out: Vec<String> = tokens.iter().map(|x| x.as_ref().to_string()).collect();

    let mut sorted: Vec<&Annotation> = annotations
        .iter()
        .filter(|x| x.suggest().is_some())
        .collect();
    sorted.sort_by_key(|x| Reverse(x.span()));

    // rewritten spans in the original indices, only the outermost ones are kept
    let mut rewritten: Vec<(usize, usize)> = Vec::new();

    for annotation in sorted {
        let (start, end) = annotation.span();
        if end >= tokens.len() {
            warn!(
                "annotation {} at {}-{} exceeds the {} tokens of the sentence",
                annotation.code(),
                start,
                end,
                tokens.len()
            );
            continue;
        }

        let mut removed = 0;
        let mut overlaps = false;
        for &(rs, re) in &rewritten {
            if end < rs || start > re {
                continue;
            }
            if start <= rs && end >= re && (start, end) != (rs, re) {
                removed += re - rs;
            } else {
                overlaps = true;
                break;
            }
        }
        if overlaps {
            warn!(
                "skipping {} at {}-{}, it overlaps a correction already made",
                annotation.code(),
                start,
                end
            );
            continue;
        }

        let suggestion = annotation.suggest().unwrap_or_default();
        debug!("{}-{}: '{}'", start, end, suggestion);
        out[start] = suggestion.to_string();
        out.drain(start + 1..=end - removed);

        rewritten.retain(|&(rs, re)| !(start <= rs && re <= end));
        rewritten.push((start, end));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<&'static str> {
        vec!["a", "b", "c", "d", "e"]
    }

    #[test]
    fn applies_disjoint_corrections() {
        let annotations = vec![
            Annotation::new(0, 0, "Z002", "x").with_suggestion("A"),
            Annotation::new(2, 3, "P001", "x").with_suggestion("c d"),
        ];
        assert_eq!(
            apply_corrections(&tokens(), &annotations),
            vec!["A", "b", "c d", "e"]
        );
    }

    #[test]
    fn ignores_annotations_without_suggestion() {
        let annotations = vec![Annotation::new(1, 2, "U001", "x")];
        assert_eq!(apply_corrections(&tokens(), &annotations), tokens());
    }

    #[test]
    fn outer_span_replaces_nested_corrections() {
        let annotations = vec![
            Annotation::new(1, 2, "P_NUMBER", "x").with_suggestion("y"),
            Annotation::new(0, 3, "P_NT_X", "x").with_suggestion("z"),
        ];
        assert_eq!(apply_corrections(&tokens(), &annotations), vec!["z", "e"]);
    }

    #[test]
    fn skips_partial_overlaps() {
        let annotations = vec![
            Annotation::new(0, 2, "P001", "x").with_suggestion("y"),
            Annotation::new(1, 3, "P002", "x").with_suggestion("z"),
        ];
        assert_eq!(
            apply_corrections(&tokens(), &annotations),
            vec!["a", "z", "e"]
        );
    }

    #[test]
    fn deletes_with_empty_suggestions() {
        let annotations = vec![Annotation::new(4, 4, "P_NT_Síðan/w", "x").with_suggestion("")];
        assert_eq!(
            apply_corrections(&tokens(), &annotations),
            vec!["a", "b", "c", "d", ""]
        );
    }

    #[test]
    fn skips_spans_out_of_range() {
        let annotations = vec![Annotation::new(4, 6, "P001", "x").with_suggestion("y")];
        assert_eq!(apply_corrections(&tokens(), &annotations), tokens());
    }
}
