use super::field::clean_text;
use clap::ValueEnum;
use regex::Regex;

/// How much text after the postal code counts as the city name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CityPolicy {
    /// Only the first word ("Den Haag" becomes "Den")
    FirstWord,
    /// Name-like words up to the first delimiter or non-name token
    #[default]
    NameRun,
    /// Everything after the postal code
    Remainder,
}

impl CityPolicy {
    fn city_from(&self, rest: &str) -> String {
        match self {
            CityPolicy::Remainder => clean_text(rest),
            CityPolicy::FirstWord => rest
                .split_whitespace()
                .next()
                .map(|token| name_part(token).0)
                .unwrap_or_default()
                .to_string(),
            CityPolicy::NameRun => {
                let mut words = Vec::new();
                for token in rest.split_whitespace() {
                    let (word, closed) = name_part(token);
                    if !word.is_empty() {
                        words.push(word);
                    }
                    if closed || word.is_empty() {
                        break;
                    }
                }
                words.join(" ")
            }
        }
    }
}

/// Split a token into its name part and whether a delimiter ended the run.
///
/// A name part starts with a letter or an apostrophe ('s-Hertogenbosch) and
/// contains only letters, hyphens, apostrophes and dots.
fn name_part(token: &str) -> (&str, bool) {
    let trimmed = token.trim_end_matches(|c| matches!(c, ',' | ';' | ':' | ')' | '.'));
    let closed = trimmed.len() != token.len();

    let mut chars = trimmed.chars();
    let starts_like_name = chars
        .next()
        .map_or(false, |c| c.is_alphabetic() || c == '\'');
    let is_name = starts_like_name
        && trimmed
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '.'));

    if is_name {
        (trimmed, closed)
    } else {
        ("", true)
    }
}

/// Postal code shape: a fixed-length numeric block plus an optional letter suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostcodeFormat {
    pub digits: usize,
    pub letters: usize,
}

impl PostcodeFormat {
    /// `1083 HH`, `1083HH`
    pub const DUTCH: PostcodeFormat = PostcodeFormat { digits: 4, letters: 2 };

    fn expression(&self) -> String {
        if self.letters == 0 {
            format!(r"\b\d{{{}}}\b", self.digits)
        } else {
            format!(r"\b\d{{{}}}\s?[A-Z]{{{}}}\b", self.digits, self.letters)
        }
    }
}

/// Splits free-text locality strings into postal code and city
#[derive(Debug, Clone)]
pub struct AddressResolver {
    postcode: Regex,
    policy: CityPolicy,
}

impl AddressResolver {
    pub fn new(format: PostcodeFormat, policy: CityPolicy) -> Result<Self, regex::Error> {
        Ok(Self {
            postcode: Regex::new(&format.expression())?,
            policy,
        })
    }

    pub fn dutch(policy: CityPolicy) -> Result<Self, regex::Error> {
        Self::new(PostcodeFormat::DUTCH, policy)
    }

    /// Returns `(postal_code, city)`; both empty when no postal code is present
    pub fn resolve(&self, locality_text: &str) -> (String, String) {
        let text = clean_text(locality_text);
        match self.postcode.find(&text) {
            Some(m) => (m.as_str().to_string(), self.policy.city_from(&text[m.end()..])),
            None => (String::new(), String::new()),
        }
    }
}

/// "den haag" -> "Den Haag"
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
