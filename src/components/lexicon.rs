//! A lexicon held in memory, indexed by word form and by lemma.

use std::{
    collections::{HashMap, HashSet},
    io::BufRead,
};

use log::debug;
use serde::{Deserialize, Serialize};

use super::Component;
use crate::{properties::Lexicon, types::*, utils};

// mutually exclusive inflection tags
const VARIANT_GROUPS: &[&[&str]] = &[
    &["nf", "þf", "þgf", "ef"],
    &["et", "ft"],
    &["kk", "kvk", "hk"],
    &["fh", "vh", "bh", "nh", "lh", "sagnb", "lhþt"],
    &["nt", "þt"],
    &["p1", "p2", "p3"],
    &["gm", "mm"],
    &["sb", "vb"],
    &["fst", "mst", "est"],
];

/// The variants of `source` with `requested` swapped in. `gr` and `nogr` add and remove
/// the definite article.
fn swap_variants<'a>(source: &[&'a str], requested: &[&'a str]) -> HashSet<&'a str> {
    let mut variants: HashSet<&str> = source.iter().copied().collect();

    for variant in requested {
        match *variant {
            "gr" => {
                variants.insert("gr");
            }
            "nogr" => {
                variants.remove("gr");
            }
            _ => {
                if let Some(group) = VARIANT_GROUPS.iter().find(|x| x.contains(variant)) {
                    for x in group.iter() {
                        variants.remove(x);
                    }
                }
                variants.insert(variant);
            }
        }
    }

    variants
}

#[derive(Serialize, Deserialize)]
pub(crate) struct MemoryLexiconFields {
    meanings: Vec<Meaning>,
}

impl From<MemoryLexiconFields> for MemoryLexicon {
    fn from(data: MemoryLexiconFields) -> Self {
        MemoryLexicon::from_meanings(data.meanings)
    }
}

impl From<MemoryLexicon> for MemoryLexiconFields {
    fn from(lexicon: MemoryLexicon) -> Self {
        MemoryLexiconFields {
            meanings: lexicon.meanings,
        }
    }
}

/// A [Lexicon] over a list of meanings.
#[derive(Serialize, Deserialize, Default, Clone)]
#[serde(from = "MemoryLexiconFields", into = "MemoryLexiconFields")]
pub struct MemoryLexicon {
    meanings: Vec<Meaning>,
    #[serde(skip)]
    by_form: HashMap<String, Vec<usize>>,
    #[serde(skip)]
    by_lemma: HashMap<(String, String), Vec<usize>>,
}

impl Component for MemoryLexicon {
    fn name() -> &'static str {
        "lexicon"
    }
}

impl MemoryLexicon {
    pub fn from_meanings(meanings: Vec<Meaning>) -> Self {
        let mut by_form: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_lemma: HashMap<(String, String), Vec<usize>> = HashMap::new();

        for (i, meaning) in meanings.iter().enumerate() {
            by_form.entry(meaning.form.clone()).or_default().push(i);
            by_lemma
                .entry((meaning.lemma.clone(), meaning.category.clone()))
                .or_default()
                .push(i);
        }

        MemoryLexicon {
            meanings,
            by_form,
            by_lemma,
        }
    }

    /// Reads a lexicon in the six-column format `lemma;id;category;domain;form;inflection`.
    /// Empty lines and lines starting with `#` are skipped.
    pub fn from_csv<R: BufRead>(reader: R) -> Result<Self, crate::Error> {
        let mut meanings = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split(';').map(|x| x.trim()).collect();
            if fields.len() != 6 {
                return Err(crate::Error::Lexicon {
                    line: i + 1,
                    message: format!("expected 6 fields, found {}", fields.len()),
                });
            }
            let (lemma, category, domain, form, inflection) =
                (fields[0], fields[2], fields[3], fields[4], fields[5]);
            meanings.push(Meaning::new(form, lemma, category, inflection).with_domain(domain));
        }

        debug!("read {} lexicon entries", meanings.len());
        Ok(MemoryLexicon::from_meanings(meanings))
    }

    pub fn len(&self) -> usize {
        self.meanings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meanings.is_empty()
    }

    fn exact(&self, word: &str) -> Vec<Meaning> {
        self.by_form.get(word).map_or_else(Vec::new, |indices| {
            indices.iter().map(|i| self.meanings[*i].clone()).collect()
        })
    }
}

impl Lexicon for MemoryLexicon {
    fn lookup(&self, word: &str, at_sentence_start: bool) -> (String, Vec<Meaning>) {
        let meanings = self.exact(word);
        if !meanings.is_empty() {
            return (word.to_string(), meanings);
        }

        let mut fallbacks = Vec::new();
        if at_sentence_start || utils::is_uppercase(word) {
            fallbacks.push(word.to_lowercase());
        }
        if utils::is_uppercase(word) {
            fallbacks.push(utils::capitalize(word));
        }

        for candidate in fallbacks {
            let meanings = self.exact(&candidate);
            if !meanings.is_empty() {
                // keep the surface form, only its meanings come from the fallback
                return (word.to_string(), meanings);
            }
        }

        (word.to_string(), Vec::new())
    }

    fn lookup_variants(&self, word: &str, category: &str, variants: &[&str]) -> Vec<WordForm> {
        let mut sources: Vec<Meaning> = self
            .exact(word)
            .into_iter()
            .filter(|x| x.category == category)
            .collect();
        if sources.is_empty() {
            sources = self
                .exact(&word.to_lowercase())
                .into_iter()
                .filter(|x| x.category == category)
                .collect();
        }

        let mut out: Vec<WordForm> = Vec::new();
        for source in sources {
            let source_variants: Vec<&str> = source.variants().collect();
            let target = swap_variants(&source_variants, variants);

            let candidates = match self
                .by_lemma
                .get(&(source.lemma.clone(), source.category.clone()))
            {
                Some(candidates) => candidates,
                None => continue,
            };

            for i in candidates {
                let candidate = &self.meanings[*i];
                let candidate_variants: HashSet<&str> = candidate.variants().collect();
                if candidate_variants == target && !out.contains(candidate) {
                    out.push(candidate.clone());
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> MemoryLexicon {
        MemoryLexicon::from_csv(
            "ég;1;pfn;alm;ég;nf_et
            ég;1;pfn;alm;mig;þf_et
            ég;1;pfn;alm;mér;þgf_et
            ég;1;pfn;alm;mín;ef_et
            hestur;2;kk;alm;hestur;nf_et
            hestur;2;kk;alm;hestinn;þf_et_gr
            hestur;2;kk;alm;hest;þf_et
            hestur;2;kk;alm;hestar;nf_ft"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn looks_up_at_sentence_start() {
        let lexicon = lexicon();

        assert!(lexicon.lookup("Ég", false).1.is_empty());
        let (word, meanings) = lexicon.lookup("Ég", true);
        assert_eq!(word, "Ég");
        assert_eq!(meanings[0].lemma, "ég");
        assert!(lexicon.contains("HESTUR"));
    }

    #[test]
    fn swaps_variants() {
        let lexicon = lexicon();

        let forms = lexicon.lookup_variants("ég", "pfn", &["þgf"]);
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].form, "mér");

        let forms = lexicon.lookup_variants("hestinn", "kk", &["nogr"]);
        assert_eq!(forms[0].form, "hest");

        let forms = lexicon.lookup_variants("hestur", "kk", &["ft"]);
        assert_eq!(forms[0].form, "hestar");

        assert!(lexicon.lookup_variants("hestur", "kvk", &["ft"]).is_empty());
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(MemoryLexicon::from_csv("ég;1;pfn".as_bytes()).is_err());
    }

    #[test]
    fn roundtrips_through_bincode() -> Result<(), crate::Error> {
        let lexicon = lexicon();
        let mut buffer = Vec::new();
        lexicon.to_writer(&mut buffer)?;

        let restored = MemoryLexicon::from_reader(&buffer[..])?;
        assert_eq!(restored.len(), lexicon.len());
        assert_eq!(restored.meanings("mér").len(), 1);
        Ok(())
    }
}
