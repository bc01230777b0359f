//! Casing and spacing helpers shared by the correction stages.
use lazy_static::lazy_static;
use onig::Regex;

// see https://stackoverflow.com/questions/38406793/why-is-capitalizing-the-first-letter-of-a-string-so-convoluted-in-rust
pub fn apply_to_first<F>(string: &str, func: F) -> String
where
    F: Fn(char) -> String,
{
    let mut c = string.chars();
    match c.next() {
        None => String::new(),
        Some(first) => func(first) + c.as_str(),
    }
}

/// Whether the string starts with an uppercase letter and every other cased letter is lowercase.
pub fn is_title_case(string: &str) -> bool {
    let mut char_case = string.chars().filter(|x| x.is_alphabetic()).map(|x| x.is_uppercase());

    char_case.next().unwrap_or(false) && !char_case.any(|x| x)
}

/// Whether the string contains at least one cased letter and no lowercase letters.
pub fn is_uppercase(string: &str) -> bool {
    string.chars().any(|x| x.is_uppercase()) && !string.chars().any(|x| x.is_lowercase())
}

/// Whether the string contains at least one cased letter and no uppercase letters.
pub fn is_lowercase(string: &str) -> bool {
    string.chars().any(|x| x.is_lowercase()) && !string.chars().any(|x| x.is_uppercase())
}

pub fn starts_uppercase(string: &str) -> bool {
    string.chars().next().map_or(false, |c| c.is_uppercase())
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(string: &str) -> String {
    apply_to_first(&string.to_lowercase(), |c| c.to_uppercase().collect())
}

/// Title-cases every space-separated word.
pub fn title(string: &str) -> String {
    string
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns `s` in the case pattern of `template`: all uppercase, capitalized or unchanged.
pub fn emulate_case(s: &str, template: &str) -> String {
    if is_uppercase(template) {
        s.to_uppercase()
    } else if starts_uppercase(template) {
        capitalize(s)
    } else {
        s.to_string()
    }
}

#[inline]
fn no_space_before() -> &'static str {
    ".,:;)]}!?…“»%"
}

#[inline]
fn no_space_after() -> &'static str {
    "([{„«"
}

/// Joins token texts, dropping the space before closing punctuation and after opening brackets.
/// Empty tokens are skipped.
pub fn detokenize<S: AsRef<str>>(tokens: &[S]) -> String {
    detokenize_with_offsets(tokens).0
}

/// Like [detokenize], also returning the character offset of each token in the joined text.
/// An empty token gets the offset where it would have been.
pub fn detokenize_with_offsets<S: AsRef<str>>(tokens: &[S]) -> (String, Vec<usize>) {
    let mut out = String::new();
    let mut offsets = Vec::with_capacity(tokens.len());
    let mut length = 0;
    let mut glue_next = true;

    for token in tokens.iter().map(|x| x.as_ref()) {
        if token.is_empty() {
            offsets.push(length);
            continue;
        }

        let glue = glue_next
            || (token.chars().count() == 1
                && token.chars().all(|c| no_space_before().contains(c)))
            || token.starts_with("...")
            || token == "?!";
        if !glue {
            out.push(' ');
            length += 1;
        }
        offsets.push(length);
        out.push_str(token);
        length += token.chars().count();
        glue_next = token.chars().count() == 1 && no_space_after().contains(token);
    }

    (out, offsets)
}

/// Normalizes the spacing of a text made of space-separated tokens.
pub fn correct_spaces(text: &str) -> String {
    lazy_static! {
        static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    }

    let joined = WHITESPACE.replace_all(text.trim(), " ");
    let tokens: Vec<&str> = joined.split(' ').collect();
    detokenize(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_token_offsets() {
        let (text, offsets) = detokenize_with_offsets(&["Hann", "kom", ",", "", "(", "sá", ")"]);
        assert_eq!(text, "Hann kom, (sá)");
        assert_eq!(offsets, vec![0, 5, 8, 9, 10, 11, 13]);
    }

    #[test]
    fn emulates_case() {
        assert_eq!(emulate_case("mér", "ÉG"), "MÉR");
        assert_eq!(emulate_case("mér", "Ég"), "Mér");
        assert_eq!(emulate_case("mér", "ég"), "mér");
        assert_eq!(emulate_case("kven", "x"), "kven");
    }

    #[test]
    fn detects_casing() {
        assert!(is_title_case("Ísland"));
        assert!(!is_title_case("ÍSLAND"));
        assert!(is_uppercase("ÍSLAND"));
        assert!(!is_uppercase("123"));
        assert!(is_lowercase("ísland"));
    }

    #[test]
    fn fixes_spacing() {
        assert_eq!(correct_spaces("Hann kom , sá og sigraði ."), "Hann kom, sá og sigraði.");
        assert_eq!(correct_spaces("( innan sviga )"), "(innan sviga)");
        assert_eq!(detokenize(&["Hæ", "", "þú", "!"]), "Hæ þú!");
    }
}
