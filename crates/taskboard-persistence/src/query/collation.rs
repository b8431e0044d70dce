//! String comparison rules for sort stages.
//!
//! `Locale` approximates a root-locale collation at tertiary strength:
//! letters compare case- and accent-insensitively first, then unaccented
//! before accented, then lowercase before uppercase.

use std::cmp::Ordering;

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Collation {
    /// Plain code point order.
    #[default]
    Binary,
    /// Case-insensitive order with accents folded at the primary level. The
    /// locale name is not used for tailoring. Folding covers Latin-1 and Latin
    /// Extended-A letters one to one; expansions such as `ß`, `æ` and `œ` and
    /// letters of other scripts compare by their lowercase code points.
    Locale(String),
}

impl Collation {
    pub fn locale(locale: impl Into<String>) -> Self {
        Collation::Locale(locale.into())
    }

    pub fn compare_str(&self, a: &str, b: &str) -> Ordering {
        match self {
            Collation::Binary => a.cmp(b),
            Collation::Locale(_) => locale_cmp(a, b),
        }
    }

    /// Total order over JSON values: missing/null, numbers, strings,
    /// objects, arrays, booleans. Strings use this collation.
    pub fn compare_values(&self, a: Option<&Value>, b: Option<&Value>) -> Ordering {
        let a = a.unwrap_or(&Value::Null);
        let b = b.unwrap_or(&Value::Null);
        type_rank(a).cmp(&type_rank(b)).then_with(|| match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(0.0);
                let y = y.as_f64().unwrap_or(0.0);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => self.compare_str(x, y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => Ordering::Equal,
        })
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

fn locale_cmp(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(primary_key(b))
        .then_with(|| secondary_key(a).cmp(secondary_key(b)))
        .then_with(|| tertiary_cmp(a, b))
        .then_with(|| a.cmp(b))
}

fn primary_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase).map(fold_diacritic)
}

fn secondary_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

fn tertiary_cmp(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        return match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => x.cmp(&y),
        };
    }
    a.chars().count().cmp(&b.chars().count())
}

/// Map an accented Latin letter (already lowercased) to its base letter.
fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sorted(collation: &Collation, words: &[&str]) -> Vec<String> {
        let mut out: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        out.sort_by(|a, b| collation.compare_str(a, b));
        out
    }

    #[test]
    fn test_locale_ignores_case_for_letters() {
        let en = Collation::locale("en");
        assert_eq!(
            sorted(&en, &["banana", "Apple", "cherry"]),
            vec!["Apple", "banana", "cherry"]
        );
    }

    #[test]
    fn test_binary_sorts_uppercase_first() {
        assert_eq!(
            sorted(&Collation::Binary, &["banana", "Apple", "apple"]),
            vec!["Apple", "apple", "banana"]
        );
    }

    #[test]
    fn test_locale_tie_breaks() {
        let en = Collation::locale("en");
        assert_eq!(en.compare_str("apple", "Apple"), Ordering::Less);
        assert_eq!(en.compare_str("cafe", "café"), Ordering::Less);
        assert_eq!(en.compare_str("café", "cafes"), Ordering::Less);
        assert_eq!(en.compare_str("Board", "board"), Ordering::Greater);
        assert_eq!(en.compare_str("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_locale_folding_is_one_to_one() {
        let en = Collation::locale("en");
        assert_eq!(en.compare_str("Ångström", "angstrom"), Ordering::Greater);
        assert_eq!(
            sorted(&en, &["Zürich", "zoo", "Øresund"]),
            vec!["Øresund", "zoo", "Zürich"]
        );
        // No expansion: `ß` is not `ss` and sorts after every ASCII letter.
        assert_eq!(en.compare_str("straße", "strasse"), Ordering::Greater);
        assert_eq!(en.compare_str("ß", "z"), Ordering::Greater);
    }

    #[test]
    fn test_value_ordering() {
        let en = Collation::locale("en");
        assert_eq!(en.compare_values(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(
            en.compare_values(Some(&json!(2)), Some(&json!(10))),
            Ordering::Less
        );
        assert_eq!(
            en.compare_values(Some(&json!("b")), Some(&json!("A"))),
            Ordering::Greater
        );
        assert_eq!(
            en.compare_values(Some(&json!(5)), Some(&json!("a"))),
            Ordering::Less
        );
    }
}
