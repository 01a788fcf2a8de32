use super::field::{clean_text, FallbackChain};
use regex::Regex;
use scraper::{ElementRef, Node, Selector};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConventionError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

fn parse_selector(selector: &str) -> Result<Selector, ConventionError> {
    Selector::parse(selector).map_err(|e| ConventionError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Text of `root` as a reader would see it: no scripts, styles or document title
pub fn visible_text(root: ElementRef) -> String {
    let parts: Vec<&str> = root
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| match a.value() {
                Node::Element(el) => matches!(el.name(), "script" | "style" | "noscript" | "template" | "title"),
                _ => false,
            });
            (!hidden).then_some(&**text)
        })
        .collect();
    clean_text(&parts.join(" "))
}

/// Ordered CSS selectors for one markup location
#[derive(Debug, Clone, Default)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    pub fn new(selectors: &[&str]) -> Result<Self, ConventionError> {
        let selectors = selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }

    /// Matches of the first selector that matches anything
    pub fn matches<'a>(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        self.selectors
            .iter()
            .map(|s| root.select(s).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }

    /// Every match of every selector, in chain order
    pub fn all<'s, 'a: 's>(&'s self, root: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 's {
        self.selectors.iter().flat_map(move |s| root.select(s))
    }

    /// Text of the first matched element whose text is non-empty
    pub fn first_text(&self, root: ElementRef) -> Option<String> {
        self.all(root)
            .map(visible_text)
            .find(|text| !text.is_empty())
    }
}

/// How a detail-field label is recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelRule {
    Contains(&'static str),
    Exact(&'static str),
}

impl LabelRule {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            LabelRule::Contains(needle) => label.contains(needle),
            LabelRule::Exact(expected) => label == *expected,
        }
    }
}

/// A label element whose value is its next sibling element with `value_tag`
#[derive(Debug, Clone)]
pub struct LabelPair {
    label: Selector,
    value_tag: String,
}

impl LabelPair {
    pub fn new(label: &str, value_tag: &str) -> Result<Self, ConventionError> {
        Ok(Self {
            label: parse_selector(label)?,
            value_tag: value_tag.to_string(),
        })
    }

    fn collect(&self, root: ElementRef, out: &mut Vec<(String, String)>) {
        for label_el in root.select(&self.label) {
            let value_el = label_el
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .next()
                .filter(|el| el.value().name() == self.value_tag);

            if let Some(value_el) = value_el {
                out.push((visible_text(label_el), visible_text(value_el)));
            }
        }
    }
}

/// Labelled fields found on a page, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pairs: Vec<(String, String)>,
}

impl DetailFields {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Value of the first non-empty field matching a rule, rules tried in order
    pub fn lookup(&self, rules: &[LabelRule]) -> Option<String> {
        rules.iter().find_map(|rule| {
            self.pairs
                .iter()
                .find(|(label, value)| rule.matches(label) && !value.is_empty())
                .map(|(_, value)| value.clone())
        })
    }
}

/// Fallback chain for one field: labelled fields, then markup locations,
/// then bare patterns over the given text scopes.
#[derive(Debug, Clone, Default)]
pub struct FieldChain {
    pub labels: Vec<LabelRule>,
    pub selectors: SelectorChain,
    pub patterns: FallbackChain,
}

impl FieldChain {
    pub fn resolve(&self, fields: &DetailFields, root: ElementRef, scopes: &[&str]) -> Option<String> {
        fields
            .lookup(&self.labels)
            .or_else(|| self.selectors.first_text(root))
            .or_else(|| scopes.iter().find_map(|text| self.patterns.extract(text)))
    }
}

/// Selectors and pattern chains for one source site
#[derive(Debug, Clone)]
pub struct SiteConvention {
    pub base_url: Url,
    /// Listing fragments on a search results page
    pub fragments: SelectorChain,
    /// Candidate listing links inside a fragment
    pub links: SelectorChain,
    /// Links must match this to identify a listing
    pub link_filter: Option<Regex>,
    pub title: SelectorChain,
    pub address: SelectorChain,
    /// Look for a postal code in the whole fragment text when no address block is found
    pub locality_from_text: bool,
    /// Search the whole results page for a price before the card itself
    pub price_from_page: bool,
    pub price: FieldChain,
    pub label_pairs: Vec<LabelPair>,
    pub area: FieldChain,
    pub rooms: FieldChain,
}

impl SiteConvention {
    /// Empty convention rooted at `base_url`; sites fill in the rest
    pub fn new(base_url: &str) -> Result<Self, ConventionError> {
        let base_url = Url::parse(base_url).map_err(|source| ConventionError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Self {
            base_url,
            fragments: SelectorChain::default(),
            links: SelectorChain::new(&["a[href]"])?,
            link_filter: None,
            title: SelectorChain::default(),
            address: SelectorChain::default(),
            locality_from_text: false,
            price_from_page: false,
            price: FieldChain::default(),
            label_pairs: Vec::new(),
            area: FieldChain::default(),
            rooms: FieldChain::default(),
        })
    }

    pub fn with_link_filter(mut self, expr: &str) -> Result<Self, ConventionError> {
        let regex = Regex::new(expr).map_err(|source| ConventionError::InvalidPattern {
            pattern: expr.to_string(),
            source,
        })?;
        self.link_filter = Some(regex);
        Ok(self)
    }

    pub fn accepts_link(&self, href: &str) -> bool {
        self.link_filter.as_ref().map_or(true, |f| f.is_match(href))
    }

    /// Absolute http(s) form of `href` relative to the site, without fragment
    pub fn canonical_url(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let mut url = self.base_url.join(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return None;
        }
        url.set_fragment(None);
        Some(url.to_string())
    }

    pub fn detail_fields(&self, root: ElementRef) -> DetailFields {
        let mut pairs = Vec::new();
        for pair in &self.label_pairs {
            pair.collect(root, &mut pairs);
        }
        DetailFields::from_pairs(pairs)
    }
}
