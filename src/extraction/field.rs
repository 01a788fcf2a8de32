use super::convention::ConventionError;
use regex::Regex;

/// Trim and collapse runs of whitespace (including `&nbsp;`) into single spaces
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A textual matcher yielding zero or one field value.
///
/// The value is the `value` named group when the expression has one, else the
/// first capture group, else the whole match.
#[derive(Debug, Clone)]
pub struct ExtractionPattern {
    regex: Regex,
}

impl ExtractionPattern {
    pub fn new(expr: &str) -> Result<Self, ConventionError> {
        let regex = Regex::new(expr).map_err(|source| ConventionError::InvalidPattern {
            pattern: expr.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// First non-empty value this pattern captures in `text`
    pub fn apply(&self, text: &str) -> Option<String> {
        self.regex.captures_iter(text).find_map(|caps| {
            let m = caps
                .name("value")
                .or_else(|| caps.get(1))
                .or_else(|| caps.get(0))?;
            let value = clean_text(m.as_str());
            (!value.is_empty()).then_some(value)
        })
    }
}

/// Try `patterns` in order against `text`; first match wins.
pub fn extract(text: &str, patterns: &[ExtractionPattern]) -> Option<String> {
    patterns.iter().find_map(|p| p.apply(text))
}

/// Ordered patterns for one field
#[derive(Debug, Clone, Default)]
pub struct FallbackChain {
    patterns: Vec<ExtractionPattern>,
}

impl FallbackChain {
    pub fn new(exprs: &[&str]) -> Result<Self, ConventionError> {
        let patterns = exprs
            .iter()
            .map(|e| ExtractionPattern::new(e))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn extract(&self, text: &str) -> Option<String> {
        extract(text, &self.patterns)
    }
}
