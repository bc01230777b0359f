//! Loading of the rule tables from the line-oriented configuration format.
//!
//! A configuration file consists of `[section]` headers followed by lines interpreted by
//! the section's handler. `#` starts a comment. `$include name` reads another file relative
//! to the including one.

use fs_err::File;
use indexmap::{IndexMap, IndexSet};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::utils;

const MAX_INCLUDE_DEPTH: usize = 16;

const ALL_CASES: [&str; 4] = ["nf", "þf", "þgf", "ef"];

/// An error in a configuration file, positioned at the offending line.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{file}:{line}: {message}")]
pub struct ConfigError {
    pub file: String,
    pub line: usize,
    pub message: String,
}

// raised by the section handlers, positioned by the reader
type LineResult = Result<(), String>;

/// Whether an error form is context-independent (`cid`) or context-dependent (`cd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorFormKind {
    ContextIndependent,
    ContextDependent,
}

/// A known misspelled word form and its correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorForm {
    pub lemma: String,
    pub correct_form: String,
    pub id: String,
    pub category: String,
    pub tag: String,
    pub kind: ErrorFormKind,
}

/// A phrase of the `multiword_errors` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiwordError {
    pub phrase: Vec<String>,
    pub code: String,
    pub replacement: Vec<String>,
}

/// Allowed parts of speech around a morpheme.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Morpheme {
    /// Categories the morpheme attaches to as a bound prefix.
    pub bound: Vec<String>,
    /// Categories for which the morpheme should stand free.
    pub free: Vec<String>,
}

/// The preposition a verb governs in place of a commonly confused one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbPreposition {
    pub wrong: String,
    pub right: String,
    pub case: String,
}

/// The correct case of a verb's subject in place of a commonly used wrong one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbSubject {
    pub wrong: String,
    pub right: String,
}

/// All rule tables, immutable after loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTables {
    pub debug: bool,
    pub allowed_multiples: HashSet<String>,
    pub wrong_compounds: HashMap<String, Vec<String>>,
    pub split_compounds: HashMap<String, HashSet<String>>,
    pub unique_errors: HashMap<String, Vec<String>>,
    pub capitalization_errors: HashSet<String>,
    /// Every entry of `capitalization_errors` with its case reversed.
    pub capitalization_errors_rev: HashSet<String>,
    pub taboo_words: HashMap<String, String>,
    pub suggestions: HashMap<String, Vec<String>>,
    pub multiword_errors: Vec<MultiwordError>,
    /// Indices into `multiword_errors` keyed by the first word of the phrase.
    pub multiword_index: HashMap<String, Vec<usize>>,
    pub morphemes: IndexMap<String, Morpheme>,
    pub error_forms: HashMap<String, ErrorForm>,
    pub abbreviations: HashMap<String, String>,
    pub verb_prepositions: IndexMap<String, Vec<VerbPreposition>>,
    pub verb_subjects: IndexMap<String, VerbSubject>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Settings,
    AllowedMultiples,
    WrongCompounds,
    SplitCompounds,
    UniqueErrors,
    CapitalizationErrors,
    TabooWords,
    Suggestions,
    MultiwordErrors,
    Morphemes,
    ErrorForms,
    Abbreviations,
    VerbPrepositions,
    VerbSubjects,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "settings" => Section::Settings,
            "allowed_multiples" => Section::AllowedMultiples,
            "wrong_compounds" => Section::WrongCompounds,
            "split_compounds" => Section::SplitCompounds,
            "unique_errors" => Section::UniqueErrors,
            "capitalization_errors" => Section::CapitalizationErrors,
            "taboo_words" => Section::TabooWords,
            "suggestions" => Section::Suggestions,
            "multiword_errors" => Section::MultiwordErrors,
            "morphemes" => Section::Morphemes,
            "error_forms" => Section::ErrorForms,
            "abbreviations" => Section::Abbreviations,
            "verb_prepositions" => Section::VerbPrepositions,
            "verb_subjects" => Section::VerbSubjects,
            _ => return None,
        })
    }
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

impl RuleTables {
    /// Loads the tables from the configuration file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut tables = RuleTables::default();
        let mut reader = Reader::default();
        reader.read_file(&mut tables, path.as_ref(), 0)?;

        info!(
            "loaded rule tables: {} multiword phrases, {} unique errors, {} error forms",
            tables.multiword_errors.len(),
            tables.unique_errors.len(),
            tables.error_forms.len()
        );
        Ok(tables)
    }

    /// Parses the tables from a string. `$include` directives are resolved relative to
    /// the current directory.
    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        let mut tables = RuleTables::default();
        let mut reader = Reader::default();
        reader.read_lines(
            &mut tables,
            text.lines().map(|x| Ok(x.to_string())),
            "<string>",
            Path::new("."),
            0,
        )?;
        Ok(tables)
    }

    /// The length of the longest phrase in `multiword_errors`.
    pub fn max_phrase_len(&self) -> usize {
        self.multiword_errors
            .iter()
            .map(|x| x.phrase.len())
            .max()
            .unwrap_or(0)
    }

    /// Looks up an error form in its original casing, then lowercased.
    pub fn error_form(&self, word: &str) -> Option<&ErrorForm> {
        self.error_forms
            .get(word)
            .or_else(|| self.error_forms.get(&word.to_lowercase()))
    }

    /// The correction of a context-independent error form, emulating the case of `word`.
    pub fn correct_error_form(&self, word: &str) -> Option<String> {
        if let Some(form) = self.error_forms.get(word) {
            return if form.kind == ErrorFormKind::ContextIndependent {
                Some(form.correct_form.clone())
            } else {
                None
            };
        }

        let form = self.error_forms.get(&word.to_lowercase())?;
        if form.kind != ErrorFormKind::ContextIndependent {
            return None;
        }

        Some(if utils::is_title_case(word) {
            utils::title(&form.correct_form)
        } else if utils::is_uppercase(word) {
            form.correct_form.to_uppercase()
        } else {
            form.correct_form.clone()
        })
    }

    fn handle(&mut self, section: Section, line: &str) -> LineResult {
        match section {
            Section::Settings => self.handle_settings(line),
            Section::AllowedMultiples => self.handle_allowed_multiples(line),
            Section::WrongCompounds => self.handle_wrong_compounds(line),
            Section::SplitCompounds => self.handle_split_compounds(line),
            Section::UniqueErrors => self.handle_unique_errors(line),
            Section::CapitalizationErrors => self.handle_capitalization_errors(line),
            Section::TabooWords => self.handle_taboo_words(line),
            Section::Suggestions => self.handle_suggestions(line),
            Section::MultiwordErrors => self.handle_multiword_errors(line),
            Section::Morphemes => self.handle_morphemes(line),
            Section::ErrorForms => self.handle_error_forms(line),
            Section::Abbreviations => self.handle_abbreviations(line),
            Section::VerbPrepositions => self.handle_verb_prepositions(line),
            Section::VerbSubjects => self.handle_verb_subjects(line),
        }
    }

    fn handle_settings(&mut self, line: &str) -> LineResult {
        let line = line.to_lowercase();
        let mut parts = line.splitn(2, '=');
        let par = parts.next().unwrap_or("").trim();
        let val = parts
            .next()
            .ok_or_else(|| format!("Expected parameter = value, got '{}'", line))?
            .trim();

        match par {
            "debug" => {
                self.debug = matches!(val, "true" | "1" | "yes");
                Ok(())
            }
            _ => Err(format!("Unknown configuration parameter '{}'", par)),
        }
    }

    fn handle_allowed_multiples(&mut self, line: &str) -> LineResult {
        if line.split_whitespace().count() != 1 {
            return Err("Only one word per line allowed in allowed_multiples section".into());
        }
        if !self.allowed_multiples.insert(line.to_string()) {
            return Err(format!(
                "'{}' is repeated in allowed_multiples section",
                line
            ));
        }
        Ok(())
    }

    fn handle_wrong_compounds(&mut self, line: &str) -> LineResult {
        let line = line.to_lowercase();
        let mut split = line.splitn(2, ',');
        let (word, parts) = match (split.next(), split.next()) {
            (Some(word), Some(parts)) => (strip_quotes(word.trim()), strip_quotes(parts.trim())),
            _ => return Err("Expected comma between compound word and its parts".into()),
        };
        let parts: Vec<String> = parts.split_whitespace().map(String::from).collect();

        if word.is_empty() {
            return Err("Expected word before the comma in wrong_compounds section".into());
        }
        if parts.len() < 2 {
            return Err("Missing word part(s) in wrong_compounds section".into());
        }
        if word.split_whitespace().count() != 1 {
            return Err(
                "Multiple words not allowed before comma in wrong_compounds section".into(),
            );
        }
        if self.wrong_compounds.contains_key(word) {
            return Err(format!(
                "Multiple definition of '{}' in wrong_compounds section",
                word
            ));
        }
        self.wrong_compounds.insert(word.to_string(), parts);
        Ok(())
    }

    fn handle_split_compounds(&mut self, line: &str) -> LineResult {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            return Err("Missing word part(s) in split_compounds section".into());
        }
        let stems = self
            .split_compounds
            .entry(parts[0].to_string())
            .or_default();
        if !stems.insert(parts[1].to_string()) {
            return Err(format!(
                "Multiple definition of '{} {}' in split_compounds section",
                parts[0], parts[1]
            ));
        }
        Ok(())
    }

    fn handle_unique_errors(&mut self, line: &str) -> LineResult {
        let line = line.to_lowercase();
        let mut split = line.splitn(2, ',');
        let (word, corr) = match (split.next(), split.next()) {
            (Some(word), Some(corr)) => (word.trim(), corr.trim()),
            _ => return Err("Expected comma between error word and its correction".into()),
        };

        let quoted = |s: &str| s.chars().count() >= 3 && s.starts_with('"') && s.ends_with('"');
        if word.chars().count() < 3 {
            return Err("Expected nonempty word before comma in unique_errors section".into());
        }
        if !quoted(word) {
            return Err("Expected word in double quotes in unique_errors section".into());
        }
        if corr.chars().count() < 3 {
            return Err("Expected nonempty word after comma in unique_errors section".into());
        }
        if !quoted(corr) {
            return Err(
                "Expected word in double quotes after comma in unique_errors section".into(),
            );
        }

        let word = &word[1..word.len() - 1];
        let corr: Vec<String> = corr[1..corr.len() - 1]
            .split_whitespace()
            .map(String::from)
            .collect();
        if word.split_whitespace().count() != 1 {
            return Err(
                "Multiple words not allowed before the comma in unique_errors section".into(),
            );
        }
        if self.unique_errors.contains_key(word) {
            return Err(format!(
                "Multiple definition of '{}' in unique_errors section",
                word
            ));
        }
        self.unique_errors.insert(word.to_string(), corr);
        Ok(())
    }

    fn handle_capitalization_errors(&mut self, line: &str) -> LineResult {
        if self.capitalization_errors.contains(line) {
            return Err(format!(
                "Multiple definition of '{}' in capitalization_errors section",
                line
            ));
        }

        let reversed = if utils::is_lowercase(line) {
            utils::title(line)
        } else if utils::is_title_case(line) {
            line.to_lowercase()
        } else {
            return Err(format!(
                "'{}' in capitalization_errors section must be lower or title case",
                line
            ));
        };

        self.capitalization_errors.insert(line.to_string());
        self.capitalization_errors_rev.insert(reversed);
        Ok(())
    }

    fn handle_taboo_words(&mut self, line: &str) -> LineResult {
        let line = line.to_lowercase();
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            return Err("Expected taboo word and a suggested replacement".into());
        }
        if parts[1].matches('_').count() != 1 {
            return Err("Suggested replacement should include word category (_xx)".into());
        }
        if self.taboo_words.contains_key(parts[0]) {
            return Err(format!(
                "Multiple definition of '{}' in taboo_words section",
                parts[0]
            ));
        }
        self.taboo_words
            .insert(parts[0].to_string(), parts[1].to_string());
        Ok(())
    }

    fn handle_suggestions(&mut self, line: &str) -> LineResult {
        let line = line.to_lowercase();
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            return Err("Expected bad word and at least one suggested replacement".into());
        }
        if parts[1..].iter().any(|x| x.matches('_').count() != 1) {
            return Err("Suggested replacements should include word category (_xx)".into());
        }
        if self.suggestions.contains_key(parts[0]) {
            return Err(format!(
                "Multiple definition of '{}' in suggestions section",
                parts[0]
            ));
        }
        self.suggestions.insert(
            parts[0].to_string(),
            parts[1..].iter().map(|x| x.to_string()).collect(),
        );
        Ok(())
    }

    fn handle_multiword_errors(&mut self, line: &str) -> LineResult {
        let line = line.to_lowercase();
        let mut split = line.splitn(2, "$error");
        let (phrase, error) = match (split.next(), split.next()) {
            (Some(phrase), Some(error)) => (phrase, error.trim()),
            _ => return Err("Expected phrase followed by $error(...)".into()),
        };

        let phrase: Vec<String> = phrase.split_whitespace().map(String::from).collect();
        if phrase.len() < 2 {
            return Err("Multiword phrase must contain at least two words".into());
        }
        if error.chars().count() < 3 {
            return Err("Incomplete error specification for multiword phrase".into());
        }
        if !error.starts_with('(') || !error.ends_with(')') {
            return Err("Error specification should be enclosed in parentheses".into());
        }

        let args: Vec<&str> = error[1..error.len() - 1].split(',').collect();
        if args.len() != 2 {
            return Err("Expected two comma-separated parameters within $error()".into());
        }
        if self.multiword_errors.iter().any(|x| x.phrase == phrase) {
            return Err(format!(
                "Multiple definition of '{}' in multiword_errors section",
                phrase.join(" ")
            ));
        }

        let index = self.multiword_errors.len();
        self.multiword_index
            .entry(phrase[0].clone())
            .or_default()
            .push(index);
        self.multiword_errors.push(MultiwordError {
            phrase,
            // the line was lowercased, codes are upper case
            code: args[0].trim().to_uppercase(),
            replacement: args[1].split_whitespace().map(String::from).collect(),
        });
        Ok(())
    }

    fn handle_morphemes(&mut self, line: &str) -> LineResult {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            return Err("Expected at least a prefix and an attachment specification".into());
        }

        let mut morpheme = Morpheme::default();
        for pos in &parts[1..] {
            if let Some(pos) = pos.strip_prefix('+') {
                morpheme.bound.push(pos.to_string());
            } else if let Some(pos) = pos.strip_prefix('-') {
                morpheme.free.push(pos.to_string());
            } else {
                return Err("Attachment specification should start with '+' or '-'".into());
            }
        }
        if morpheme.bound.is_empty() {
            return Err("A definition of allowed PoS is necessary with morphemes".into());
        }

        self.morphemes.insert(parts[0].to_string(), morpheme);
        Ok(())
    }

    fn handle_error_forms(&mut self, line: &str) -> LineResult {
        let split: Vec<&str> = line.split(';').map(|x| x.trim()).collect();
        if split.len() != 7 {
            return Err(
                "Expected wrong form;lemma;correct form;id;category;tag;errortype".into(),
            );
        }
        if split[0] == split[2] {
            return Err(format!(
                "Wrong form identical to correct form for '{}'",
                split[0]
            ));
        }
        let kind = match split[6] {
            "cid" => ErrorFormKind::ContextIndependent,
            "cd" => ErrorFormKind::ContextDependent,
            _ => return Err("Wrong error type given, expected 'cid' or 'cd'".into()),
        };

        self.error_forms.insert(
            split[0].to_string(),
            ErrorForm {
                lemma: split[1].to_string(),
                correct_form: split[2].to_string(),
                id: split[3].to_string(),
                category: split[4].to_string(),
                tag: split[5].to_string(),
                kind,
            },
        );
        Ok(())
    }

    fn handle_abbreviations(&mut self, line: &str) -> LineResult {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            return Err("Expected wrong abbreviation and its correction".into());
        }
        if self.abbreviations.contains_key(parts[0]) {
            return Err(format!(
                "Multiple definition of '{}' in abbreviations section",
                parts[0]
            ));
        }
        self.abbreviations
            .insert(parts[0].to_string(), parts[1].to_string());
        Ok(())
    }

    fn handle_verb_prepositions(&mut self, line: &str) -> LineResult {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 4 {
            return Err("Expected verb, wrong preposition, right preposition and case".into());
        }
        if !ALL_CASES.contains(&parts[3]) {
            return Err(format!("Unknown case '{}' in verb_prepositions section", parts[3]));
        }

        let entries = self
            .verb_prepositions
            .entry(parts[0].to_string())
            .or_default();
        if entries.iter().any(|x| x.wrong == parts[1]) {
            return Err(format!(
                "Multiple definition of '{} {}' in verb_prepositions section",
                parts[0], parts[1]
            ));
        }
        entries.push(VerbPreposition {
            wrong: parts[1].to_string(),
            right: parts[2].to_string(),
            case: parts[3].to_string(),
        });
        Ok(())
    }

    fn handle_verb_subjects(&mut self, line: &str) -> LineResult {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err("Expected verb, wrong subject case and right subject case".into());
        }
        if let Some(case) = parts[1..].iter().find(|x| !ALL_CASES.contains(x)) {
            return Err(format!("Unknown case '{}' in verb_subjects section", case));
        }
        if self.verb_subjects.contains_key(parts[0]) {
            return Err(format!(
                "Multiple definition of '{}' in verb_subjects section",
                parts[0]
            ));
        }
        self.verb_subjects.insert(
            parts[0].to_string(),
            VerbSubject {
                wrong: parts[1].to_string(),
                right: parts[2].to_string(),
            },
        );
        Ok(())
    }
}

#[derive(Default)]
struct Reader {
    section: Option<Section>,
    // files currently being read, to detect include cycles
    stack: IndexSet<PathBuf>,
}

impl Reader {
    fn read_file(
        &mut self,
        tables: &mut RuleTables,
        path: &Path,
        depth: usize,
    ) -> Result<(), ConfigError> {
        let name = path.display().to_string();
        let at_start = |message: String| ConfigError {
            file: name.clone(),
            line: 0,
            message,
        };

        let file = File::open(path).map_err(|x| at_start(x.to_string()))?;
        let reader = BufReader::new(file);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        if !self.stack.insert(path.to_path_buf()) {
            return Err(at_start("Circular $include".into()));
        }
        let result = self.read_lines(
            tables,
            reader.lines().map(|x| x.map_err(|e| e.to_string())),
            &name,
            dir,
            depth,
        );
        self.stack.pop();
        result
    }

    fn read_lines<I>(
        &mut self,
        tables: &mut RuleTables,
        lines: I,
        name: &str,
        dir: &Path,
        depth: usize,
    ) -> Result<(), ConfigError>
    where
        I: Iterator<Item = Result<String, String>>,
    {
        for (i, line) in lines.enumerate() {
            let error = |message: String| ConfigError {
                file: name.to_string(),
                line: i + 1,
                message,
            };

            let line = line.map_err(error)?;
            let line = match line.find('#') {
                Some(index) => &line[..index],
                None => &line[..],
            }
            .trim();

            if line.is_empty() {
                continue;
            }

            if let Some(include) = line.strip_prefix("$include") {
                let include = include.trim();
                if include.is_empty() {
                    return Err(error("Expected file name after $include".into()));
                }
                if depth >= MAX_INCLUDE_DEPTH {
                    return Err(error("$include nested too deeply".into()));
                }
                self.read_file(tables, &dir.join(include), depth + 1)?;
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = line[1..line.len() - 1].trim().to_lowercase();
                self.section = Some(
                    Section::from_name(&name)
                        .ok_or_else(|| error(format!("Unknown section name '{}'", name)))?,
                );
                continue;
            }

            match self.section {
                Some(section) => tables.handle(section, line).map_err(error)?,
                None => {
                    return Err(error(format!("No handler for config line '{}'", line)));
                }
            }
        }

        Ok(())
    }
}
