//! An n-gram model backed by a hash map of counts.

use std::{collections::HashMap, io::BufRead};

use log::debug;
use serde::{Deserialize, Serialize};

use super::Component;
use crate::properties::NgramModel;

#[derive(Serialize, Deserialize)]
pub(crate) struct MemoryNgramsFields {
    counts: HashMap<String, u64>,
}

impl From<MemoryNgramsFields> for MemoryNgrams {
    fn from(data: MemoryNgramsFields) -> Self {
        MemoryNgrams::from_counts(data.counts)
    }
}

impl From<MemoryNgrams> for MemoryNgramsFields {
    fn from(model: MemoryNgrams) -> Self {
        MemoryNgramsFields {
            counts: model.counts,
        }
    }
}

/// An [NgramModel] over absolute n-gram counts. Words of an n-gram are joined by a single space.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(from = "MemoryNgramsFields", into = "MemoryNgramsFields")]
pub struct MemoryNgrams {
    counts: HashMap<String, u64>,
    #[serde(skip)]
    total: u64,
}

impl Component for MemoryNgrams {
    fn name() -> &'static str {
        "ngrams"
    }
}

impl MemoryNgrams {
    pub fn from_counts<I: IntoIterator<Item = (String, u64)>>(counts: I) -> Self {
        let mut model = MemoryNgrams::default();
        for (ngram, count) in counts {
            let key = ngram.split_whitespace().collect::<Vec<_>>().join(" ");
            *model.counts.entry(key).or_insert(0) += count;
        }
        model.total = model
            .counts
            .iter()
            .filter(|(key, _)| !key.contains(' '))
            .map(|(_, count)| count)
            .sum();
        model
    }

    /// Counts all n-grams up to `order` words in the given sentences.
    pub fn from_sentences<S: AsRef<str>>(sentences: &[Vec<S>], order: usize) -> Self {
        let mut counts: HashMap<String, u64> = HashMap::new();

        for sentence in sentences {
            let words: Vec<&str> = sentence.iter().map(|x| x.as_ref()).collect();
            for n in 1..=order.max(1) {
                for window in words.windows(n) {
                    *counts.entry(window.join(" ")).or_insert(0) += 1;
                }
            }
        }

        MemoryNgrams::from_counts(counts)
    }

    /// Reads lines of the form `count<TAB>w1 w2 ...`.
    pub fn from_tsv<R: BufRead>(reader: R) -> Result<Self, crate::Error> {
        let mut counts = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.splitn(2, '\t');
            let count = parts.next().and_then(|x| x.trim().parse::<u64>().ok());
            let ngram = parts.next();

            match (count, ngram) {
                (Some(count), Some(ngram)) => counts.push((ngram.to_string(), count)),
                _ => {
                    return Err(crate::Error::Ngram {
                        line: i + 1,
                        message: "expected count<TAB>ngram".into(),
                    })
                }
            }
        }

        debug!("read {} n-gram counts", counts.len());
        Ok(MemoryNgrams::from_counts(counts))
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    fn count(&self, ngram: &[&str]) -> u64 {
        self.counts.get(&ngram.join(" ")).copied().unwrap_or(0)
    }

    fn floor(&self) -> f64 {
        -((self.total.max(1)) as f64).ln()
    }
}

impl NgramModel for MemoryNgrams {
    /// Unigrams are scored by relative frequency, longer n-grams by the frequency relative to
    /// their prefix. Unseen n-grams get the probability of a single occurrence.
    fn logprob(&self, ngram: &[&str]) -> f64 {
        match ngram {
            [] => 0.0,
            [_] => {
                let count = self.count(ngram);
                if count == 0 {
                    self.floor()
                } else {
                    (count as f64).ln() - (self.total as f64).ln()
                }
            }
            _ => {
                let count = self.count(ngram);
                let prefix = self.count(&ngram[..ngram.len() - 1]);
                if count == 0 || prefix == 0 {
                    self.floor()
                } else {
                    (count as f64).ln() - (prefix as f64).ln()
                }
            }
        }
    }

    fn freq(&self, ngram: &[&str]) -> u64 {
        self.count(ngram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_probabilities() {
        let model = MemoryNgrams::from_sentences(
            &[vec!["ég", "fer", "heim"], vec!["ég", "fer", "út"]],
            2,
        );

        assert_eq!(model.total(), 6);
        assert_eq!(model.freq(&["ég", "fer"]), 2);
        assert!((model.logprob(&["ég"]) - (2f64 / 6.).ln()).abs() < 1e-9);
        assert!((model.logprob(&["fer", "heim"]) - 0.5f64.ln()).abs() < 1e-9);
        assert!((model.logprob(&["xyz"]) - (1f64 / 6.).ln()).abs() < 1e-9);
    }

    #[test]
    fn reads_tsv() -> Result<(), crate::Error> {
        let model = MemoryNgrams::from_tsv("10\tég\n3\tég  fer\n".as_bytes())?;
        assert_eq!(model.freq(&["ég", "fer"]), 3);
        assert_eq!(model.total(), 10);

        assert!(MemoryNgrams::from_tsv("ég\n".as_bytes()).is_err());
        Ok(())
    }
}
