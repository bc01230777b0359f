//! Structures and implementations related to spellchecking.
//!
//! The [Corrector] is a noisy channel spelling corrector: candidates are generated by
//! substituting commonly confused fragments and by single edits, kept if they are known
//! words and ranked by their n-gram probability in context plus a fixed cost per kind of edit.
use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    properties::{Lexicon, NgramModel},
    utils::{self, is_title_case, is_uppercase},
};

mod substitutions;

const ALPHABET: &str = "aábcdðeéfghiíjklmnoópqrstuúvwxyýzþæö";

// wrongly accented characters and their Icelandic counterparts
const ACCENTS: &[(char, char)] = &[
    ('à', 'á'),
    ('è', 'é'),
    ('ì', 'í'),
    ('ò', 'ó'),
    ('ô', 'ó'),
    ('ù', 'ú'),
    ('ø', 'ö'),
];

/// The kinds of candidates, from most to least likely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Identity,
    Substitution,
    Distance1,
    Distance2,
}

impl Edit {
    /// The log probability of making this kind of error.
    fn cost(&self) -> f64 {
        match self {
            Edit::Identity => 0.0,
            Edit::Substitution => (1.0f64 / 8.0).ln(),
            Edit::Distance1 => (1.0f64 / 64.0).ln(),
            Edit::Distance2 => (1.0f64 / 2048.0).ln(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Options to configure the spelling corrector. All probabilities are natural logarithms.
pub struct SpellOptions {
    /// Words with a unigram log probability above this are accepted as they are.
    pub accept_threshold: f64,
    /// Lowercase words with a unigram log probability below this are rare.
    pub rare_threshold: f64,
    /// Like `rare_threshold`, for words containing uppercase letters.
    pub rare_threshold_upper: f64,
    /// The best candidate is discarded if its score is below this and the original word
    /// is attested.
    pub min_log_probability: f64,
    /// Words with at least this frequency are known even if the lexicon does not contain them.
    pub min_freq: u64,
    /// The frequency an n-gram needs to be scored directly instead of backing off.
    pub min_count: u64,
    /// The factor applied to the score for every backoff step.
    pub backoff: f64,
    /// The maximum number of substitution candidates per word.
    pub max_substitutions: usize,
    /// Whether to consider candidates with an edit distance of 2. Slow for long words.
    pub edit_distance_2: bool,
}

impl Default for SpellOptions {
    fn default() -> Self {
        SpellOptions {
            accept_threshold: (1e-6f64).ln(),
            rare_threshold: (2.5e-7f64).ln(),
            rare_threshold_upper: (1e-8f64).ln(),
            min_log_probability: (3.65e-9f64).ln(),
            min_freq: 3,
            min_count: 1,
            backoff: 0.4,
            max_substitutions: 2048,
            edit_distance_2: false,
        }
    }
}

/// The case pattern of a word, reapplied to its correction.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Casing {
    Upper,
    Title,
    Other,
}

impl Casing {
    fn of(word: &str) -> Self {
        if is_uppercase(word) {
            Casing::Upper
        } else if is_title_case(word) {
            Casing::Title
        } else {
            Casing::Other
        }
    }

    fn apply(&self, word: &str) -> String {
        match self {
            Casing::Upper => word.to_uppercase(),
            Casing::Title => utils::title(word),
            Casing::Other => word.to_string(),
        }
    }
}

/// All positions at which a word can be split, at character boundaries.
fn splits(word: &str) -> Vec<(&str, &str)> {
    word.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(word.len()))
        .map(|i| word.split_at(i))
        .collect()
}

/// All strings one deletion, transposition, replacement or insertion away from `word`.
fn edits1(word: &str) -> IndexSet<String> {
    let mut out = IndexSet::new();
    let pairs = splits(word);

    for (a, b) in &pairs {
        let mut rest = b.chars();
        if let Some(first) = rest.next() {
            let rest = rest.as_str();
            out.insert(format!("{}{}", a, rest));

            let mut after = rest.chars();
            if let Some(second) = after.next() {
                out.insert(format!("{}{}{}{}", a, second, first, after.as_str()));
            }
            for c in ALPHABET.chars() {
                out.insert(format!("{}{}{}", a, c, rest));
            }
        }
        for c in ALPHABET.chars() {
            out.insert(format!("{}{}{}", a, c, b));
        }
    }

    out
}

/// Lowercases the word and replaces wrongly accented characters.
fn cast(word: &str) -> String {
    word.to_lowercase()
        .chars()
        .map(|c| {
            ACCENTS
                .iter()
                .find(|(wrong, _)| *wrong == c)
                .map_or(c, |(_, right)| *right)
        })
        .collect()
}

/// A spelling corrector over a lexicon and an n-gram model.
#[derive(Clone)]
pub struct Corrector {
    lexicon: Arc<dyn Lexicon>,
    ngrams: Arc<dyn NgramModel>,
    options: SpellOptions,
}

impl Corrector {
    pub fn new(lexicon: Arc<dyn Lexicon>, ngrams: Arc<dyn NgramModel>, options: SpellOptions) -> Self {
        Corrector {
            lexicon,
            ngrams,
            options,
        }
    }

    pub fn options(&self) -> &SpellOptions {
        &self.options
    }

    pub fn lexicon(&self) -> &dyn Lexicon {
        self.lexicon.as_ref()
    }

    fn unigram_logprob(&self, word: &str) -> f64 {
        if self.ngrams.freq(&[word]) == 0 {
            f64::NEG_INFINITY
        } else {
            self.ngrams.logprob(&[word])
        }
    }

    /// Whether `word` is rare enough to be considered for correction.
    ///
    /// Words containing uppercase letters are never rare if the lexicon knows them, nor if
    /// they are all uppercase in a sentence which is not (i. e. they look like acronyms).
    pub fn is_rare(&self, word: &str, sentence_upper: bool) -> bool {
        if !word.chars().any(char::is_uppercase) {
            return self.unigram_logprob(word) < self.options.rare_threshold;
        }
        if self.lexicon.contains(word) {
            return false;
        }
        if is_uppercase(word) && !sentence_upper {
            return false;
        }
        self.unigram_logprob(word) < self.options.rare_threshold_upper
    }

    /// Whether `word` (in lowercase) is known, i. e. in the lexicon in lower or title case
    /// or frequent enough.
    fn is_known(&self, word: &str) -> bool {
        self.lexicon.contains(word)
            || self.lexicon.contains(&utils::capitalize(word))
            || self.ngrams.freq(&[word]) >= self.options.min_freq.max(1)
    }

    /// Stupid backoff: starts with the whole context and drops the leftmost word for as long
    /// as the n-gram is too infrequent, paying the backoff factor every time.
    fn backoff_score(&self, context: &[&str], word: &str) -> f64 {
        let mut penalty = 0.0;
        for start in 0..context.len() {
            let mut ngram: Vec<&str> = context[start..].to_vec();
            ngram.push(word);
            if self.ngrams.freq(&ngram) >= self.options.min_count.max(1) {
                return penalty + self.ngrams.logprob(&ngram);
            }
            penalty += self.options.backoff.ln();
        }
        penalty + self.ngrams.logprob(&[word])
    }

    fn score(&self, context: &[&str], word: &str, title: bool) -> f64 {
        let lower = self.backoff_score(context, word);
        if title {
            lower.max(self.backoff_score(context, &utils::capitalize(word)))
        } else {
            lower
        }
    }

    fn candidates(
        &self,
        word: &str,
        original: &str,
        edit: Edit,
        seen: &mut IndexSet<String>,
    ) -> Vec<String> {
        let generated: Vec<String> = match edit {
            Edit::Identity => vec![word.to_string(), original.to_string()],
            Edit::Substitution => substitutions::variants(word, self.options.max_substitutions),
            Edit::Distance1 => edits1(word).into_iter().collect(),
            Edit::Distance2 => edits1(word)
                .into_iter()
                .flat_map(|x| edits1(&x).into_iter())
                .collect(),
        };

        generated
            .into_iter()
            .filter(|x| seen.insert(x.clone()))
            .filter(|x| self.is_known(x))
            .collect()
    }

    /// Finds the best correction for a lowercase word. `original` is the word as written,
    /// which competes with the lowercase form as itself.
    fn correct_lower(&self, word: &str, original: &str, context: &[&str], title: bool) -> String {
        let freq = self.ngrams.freq(&[word]);
        for &form in &[word, original] {
            if self.ngrams.freq(&[form]) > 0
                && self.ngrams.logprob(&[form]) > self.options.accept_threshold
            {
                return form.to_string();
            }
        }

        let mut edits = vec![Edit::Identity, Edit::Substitution, Edit::Distance1];
        if self.options.edit_distance_2 {
            edits.push(Edit::Distance2);
        }

        let mut seen = IndexSet::new();
        let mut candidates: Vec<(String, f64)> = Vec::new();
        let mut acceptable = 0;

        'outer: for edit in edits {
            for candidate in self.candidates(word, original, edit, &mut seen) {
                let score = self.score(context, &candidate, title) + edit.cost();
                if score > self.options.accept_threshold {
                    if candidate == word || candidate == original {
                        return candidate;
                    }
                    acceptable += 1;
                }
                candidates.push((candidate, score));
                if acceptable >= 4 {
                    break 'outer;
                }
            }
        }

        // the first of equally likely candidates wins
        let mut best: Option<(String, f64)> = None;
        for (candidate, score) in candidates {
            if best.as_ref().map_or(true, |(_, x)| score > *x) {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((candidate, score)) => {
                if score < self.options.min_log_probability && freq > 0 {
                    return word.to_string();
                }
                candidate
            }
            None => word.to_string(),
        }
    }

    /// Returns the best correction for `word` given up to two preceding words.
    /// The case pattern of `word` is applied to the correction.
    pub fn correct(&self, word: &str, context: &[&str], at_sentence_start: bool) -> String {
        let casing = Casing::of(word);
        let lower = cast(word);

        let skip = context.len().saturating_sub(2);
        let context: Vec<String> = context[skip..].iter().map(|x| x.to_lowercase()).collect();
        let context: Vec<&str> = context.iter().map(|x| x.as_str()).collect();

        let title = at_sentence_start || casing == Casing::Title;
        let corrected = self.correct_lower(&lower, word, &context, title);

        let out = casing.apply(&corrected);
        if out != word {
            debug!("spelling correction '{}' -> '{}'", word, out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::{lexicon::MemoryLexicon, ngram::MemoryNgrams},
        types::Meaning,
    };

    fn corrector() -> Corrector {
        let lexicon = MemoryLexicon::from_meanings(vec![
            Meaning::new("hvenær", "hvenær", "ao", "-"),
            Meaning::new("kemur", "koma", "so", "fh_nt_p3_et"),
            Meaning::new("hann", "hann", "pfn", "nf_et_kk"),
            Meaning::new("heim", "heim", "ao", "-"),
            Meaning::new("kvenmaður", "kvenmaður", "kk", "nf_et"),
            Meaning::new("Ísland", "Ísland", "hk", "nf_et"),
        ]);
        let ngrams = MemoryNgrams::from_sentences(
            &[
                vec!["hvenær", "kemur", "hann", "heim"],
                vec!["hann", "kemur", "heim"],
                vec!["hvenær", "kemur", "hann"],
                vec!["hann", "á", "iPad"],
            ],
            2,
        );
        let options = SpellOptions {
            accept_threshold: -3.0,
            min_freq: 1,
            ..SpellOptions::default()
        };

        Corrector::new(Arc::new(lexicon), Arc::new(ngrams), options)
    }

    #[test]
    fn splits_at_char_boundaries() {
        assert_eq!(splits("þú"), vec![("", "þú"), ("þ", "ú"), ("þú", "")]);
        assert!(edits1("ab").contains("ba"));
        assert!(edits1("ab").contains("b"));
        assert!(edits1("ab").contains("aáb"));
    }

    #[test]
    fn corrects_with_substitutions() {
        let corrector = corrector();

        assert_eq!(corrector.correct("kvenær", &[], false), "hvenær");
        assert_eq!(corrector.correct("Kvenær", &[], true), "Hvenær");
        assert_eq!(corrector.correct("KVENÆR", &[], false), "HVENÆR");
    }

    #[test]
    fn corrects_single_edits() {
        let corrector = corrector();
        assert_eq!(corrector.correct("kemr", &["hvenær"], false), "kemur");
        assert_eq!(corrector.correct("heìm", &[], false), "heim");
    }

    #[test]
    fn accepts_frequent_words() {
        let corrector = corrector();

        let once = corrector.correct("hann", &[], false);
        assert_eq!(once, "hann");
        assert_eq!(corrector.correct(&once, &[], false), once);
    }

    #[test]
    fn keeps_known_mixed_case_words() {
        let corrector = corrector();
        assert_eq!(corrector.correct("iPad", &["á"], false), "iPad");
    }

    #[test]
    fn leaves_hopeless_words() {
        let corrector = corrector();
        assert_eq!(corrector.correct("xqzzy", &[], false), "xqzzy");
    }

    #[test]
    fn detects_rare_words() {
        let corrector = corrector();

        assert!(corrector.is_rare("kvenær", false));
        assert!(!corrector.is_rare("hann", false));
        // acronyms and known capitalized words
        assert!(!corrector.is_rare("RÚV", false));
        assert!(corrector.is_rare("RÚV", true));
        assert!(!corrector.is_rare("Ísland", false));
    }
}
