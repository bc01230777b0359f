//! Confusable fragments of Icelandic spelling.
//!
//! Every fragment maps to the fragments it is commonly confused with. The fragments of
//! a word are found left to right, each time taking the shortest prefix ending in a
//! fragment and preferring longer fragments at the same position.

use std::{cmp::Reverse, collections::HashMap};

use lazy_static::lazy_static;
use onig::Regex;

const SUBSTITUTIONS: &[(&str, &[&str])] = &[
    ("a", &["á"]),
    ("s", &["ss"]),
    ("d", &["ð"]),
    ("f", &["r", "t", "g", "v", "c", "d"]),
    ("g", &["k"]),
    ("h", &["y", "u", "j", "n", "b", "g"]),
    ("j", &["gj"]),
    ("k", &["kk"]),
    ("l", &["ll"]),
    ("æ", &["aí"]),
    ("q", &["w", "a"]),
    ("w", &["e", "s", "a", "q"]),
    ("e", &["é"]),
    ("r", &["rr"]),
    ("t", &["þ"]),
    ("y", &["i", "ý"]),
    ("u", &["ú"]),
    ("i", &["í", "y"]),
    ("o", &["ó", "ö"]),
    ("p", &["pp"]),
    ("ð", &["ö", "-", "æ", "p"]),
    ("z", &["s", "ds", "ðs", "ts"]),
    ("x", &["gs", "ks"]),
    ("c", &["æ", "é"]),
    ("v", &["f"]),
    ("b", &["p"]),
    ("n", &["nn"]),
    ("m", &["mm"]),
    ("þ", &["æ"]),
    // ng/nk
    ("áng", &["ang"]),
    ("eing", &["eng"]),
    ("eyng", &["eng"]),
    ("úng", &["ung"]),
    ("íng", &["yng", "ing"]),
    ("ýng", &["yng", "ing"]),
    ("aung", &["öng"]),
    ("ánk", &["ank"]),
    ("eink", &["enk"]),
    ("eynk", &["enk"]),
    ("únk", &["unk"]),
    ("ínk", &["ynk", "ink"]),
    ("ýnk", &["ynk", "ink"]),
    ("aunk", &["önk"]),
    // epenthesis
    ("dl", &["ll", "rl"]),
    ("dn", &["nn", "rn"]),
    ("rdl", &["rl"]),
    ("rdn", &["rn"]),
    ("sdl", &["sl"]),
    ("sdn", &["sn"]),
    // g/j
    ("ýa", &["ýja"]),
    ("ýu", &["ýu"]),
    ("æu", &["æju"]),
    ("ji", &["i", "gi"]),
    ("ægi", &["agi"]),
    ("eigi", &["egi"]),
    ("eygi", &["egi"]),
    ("ígi", &["igi"]),
    ("ýgi", &["igi"]),
    ("oji", &["ogi"]),
    ("uji", &["ugi"]),
    ("yji", &["ygi"]),
    ("augi", &["ögi"]),
    // silent g and f
    ("á", &["ág", "áf"]),
    ("í", &["íg"]),
    ("ú", &["úg", "úf"]),
    ("ó", &["óg", "óf"]),
    // single and double consonants
    ("gg", &["g"]),
    ("kk", &["k"]),
    ("ll", &["l"]),
    ("mm", &["m"]),
    ("nn", &["n"]),
    ("pp", &["p"]),
    ("rr", &["r"]),
    ("ss", &["s"]),
    ("tt", &["t"]),
    ("gð", &["ggð"]),
    ("ggð", &["gð"]),
    ("gt", &["ggt"]),
    ("ggt", &["gt"]),
    ("gl", &["ggl"]),
    ("ggl", &["gl"]),
    ("gn", &["ggn"]),
    ("ggn", &["gn"]),
    ("kn", &["kkn"]),
    ("kkn", &["kn"]),
    ("kl", &["kkl"]),
    ("kkl", &["kl"]),
    ("kt", &["kkt"]),
    ("kkt", &["kt"]),
    ("pl", &["ppl"]),
    ("ppl", &["pl"]),
    ("pn", &["ppn"]),
    ("ppn", &["pn"]),
    ("pt", &["ft"]),
    ("ppt", &["ft"]),
    ("tl", &["ttl"]),
    ("ttl", &["tl"]),
    ("tn", &["ttn"]),
    ("ttn", &["tn"]),
    // accents typed separately
    ("´a", &["á"]),
    ("´e", &["é"]),
    ("´i", &["í"]),
    ("´o", &["ó"]),
    ("´u", &["ú"]),
    ("´y", &["ý"]),
    ("ei", &["ey"]),
    ("ey", &["ei"]),
    ("je", &["é"]),
    // z
    ("zt", &["st"]),
    ("zl", &["sl"]),
    ("nzk", &["nsk"]),
    ("tzt", &["st"]),
    ("ttzt", &["st"]),
    // simplified consonant clusters
    ("md", &["fnd"]),
    ("mt", &["fnd"]),
    ("bl", &["fl"]),
    ("bbl", &["fl"]),
    ("bn", &["fn"]),
    ("bbn", &["fn"]),
    ("lgd", &["gld"]),
    ("gld", &["lgd"]),
    ("lgt", &["glt"]),
    ("glt", &["lgt"]),
    ("ngd", &["gnd"]),
    ("gnd", &["ngd"]),
    ("ngt", &["gnt"]),
    ("gnt", &["ngt"]),
    ("lfd", &["fld"]),
    ("fld", &["lfd"]),
    ("lft", &["flt"]),
    ("flt", &["lft"]),
    ("sn", &["stn"]),
    ("rn", &["rfn"]),
    ("rð", &["rgð"]),
    ("rgð", &["rð"]),
    ("ft", &["pt", "ppt"]),
    ("nd", &["rnd"]),
    ("st", &["rst"]),
    ("ksk", &["sk"]),
    ("kv", &["hv"]),
    ("hv", &["kv"]),
    ("gs", &["x"]),
    ("ks", &["x"]),
    // foreign keyboards
    ("ae", &["æ"]),
    ("th", &["þ"]),
];

lazy_static! {
    static ref TABLE: HashMap<&'static str, &'static [&'static str]> =
        SUBSTITUTIONS.iter().copied().collect();
    static ref FRAGMENT_REGEX: Regex = {
        // longer fragments must be tried first
        let mut keys: Vec<&str> = SUBSTITUTIONS.iter().map(|x| x.0).collect();
        keys.sort_by_key(|x| Reverse(x.chars().count()));
        Regex::new(&format!("(.*?({}))", keys.join("|"))).unwrap()
    };
}

/// Splits `word` into fragments, each ending in a key of the table.
/// Returns the fragments with their keys and the remaining suffix.
fn fragments(word: &str) -> (Vec<(&str, &str)>, &str) {
    let mut out = Vec::new();
    let mut end = 0;

    for captures in FRAGMENT_REGEX.captures_iter(word) {
        if let (Some(fragment), Some(key)) = (captures.at(1), captures.at(2)) {
            end += fragment.len();
            out.push((fragment, key));
        }
    }

    (out, &word[end..])
}

/// All variants of `word` with at least one fragment substituted, at most `limit` of them.
///
/// Variants are enumerated like the digits of a mixed radix counter: the first fragment
/// varies fastest, digit 0 keeps a fragment unchanged.
pub fn variants(word: &str, limit: usize) -> Vec<String> {
    let (fragments, suffix) = fragments(word);
    let options: Vec<&[&str]> = fragments
        .iter()
        .map(|(_, key)| TABLE.get(key).copied().unwrap_or(&[]))
        .collect();

    let combinations = options
        .iter()
        .fold(1usize, |acc, x| acc.saturating_mul(x.len() + 1));
    let combinations = combinations.min(limit.saturating_add(1));

    (1..combinations)
        .map(|counter| {
            let mut combo = counter;
            let mut out = String::with_capacity(word.len() + 4);

            for ((fragment, key), subs) in fragments.iter().zip(options.iter()) {
                let radix = subs.len() + 1;
                match combo % radix {
                    0 => out.push_str(fragment),
                    i => {
                        out.push_str(&fragment[..fragment.len() - key.len()]);
                        out.push_str(subs[i - 1]);
                    }
                }
                combo /= radix;
            }
            out.push_str(suffix);
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_longer_fragments() {
        let (parts, suffix) = fragments("kvenn");
        assert_eq!(parts[0], ("kv", "kv"));
        assert_eq!(parts.last(), Some(&("nn", "nn")));
        assert_eq!(suffix, "");

        let (parts, _) = fragments("sterkt");
        assert_eq!(parts[0], ("st", "st"));
        assert!(parts.contains(&("kt", "kt")));
    }

    #[test]
    fn generates_variants() {
        let variants = variants("kvenn", 100);
        assert!(variants.contains(&"hvenn".to_string()));
        assert!(variants.contains(&"kven".to_string()));
        assert!(!variants.contains(&"kvenn".to_string()));
    }

    #[test]
    fn limits_variants() {
        assert_eq!(variants("sjúkrahúsinu", 10).len(), 10);
        assert!(variants("", 10).is_empty());
    }
}
