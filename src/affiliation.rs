//! Affiliation classification and email extraction.
//!
//! Classification is a plain case-insensitive substring match against two
//! keyword lists. Academic keywords take precedence, so joint
//! academic/industry affiliations count as academic. Matching has no word
//! boundaries: "ltd" also hits inside unrelated words.

use regex::Regex;
use std::sync::OnceLock;

/// Keywords that mark an affiliation as academic, checked first
pub const ACADEMIC_KEYWORDS: &[&str] = &[
    "university",
    "college",
    "institute",
    "hospital",
    "school",
    "academy",
    "lab",
];

/// Keywords that mark an affiliation as industry
pub const INDUSTRY_KEYWORDS: &[&str] = &[
    "pharma",
    "biotech",
    "inc",
    "ltd",
    "corporation",
    "therapeutics",
    "vaccine",
    "genetics",
    "healthcare",
    "medical",
];

/// Result of classifying one affiliation string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliationClass {
    Industry,
    /// Academic, or anything the keywords do not recognise
    Academic,
}

/// Keyword-based affiliation classifier
#[derive(Debug, Clone)]
pub struct AffiliationClassifier {
    academic_keywords: Vec<String>,
    industry_keywords: Vec<String>,
}

impl AffiliationClassifier {
    /// Create a classifier from custom keyword lists. Keywords are
    /// lowercased; matching ignores case.
    pub fn new<A, I>(academic_keywords: A, industry_keywords: I) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let normalise = |k: &str| k.trim().to_lowercase();
        Self {
            academic_keywords: academic_keywords
                .into_iter()
                .map(|k| normalise(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
            industry_keywords: industry_keywords
                .into_iter()
                .map(|k| normalise(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn academic_keywords(&self) -> &[String] {
        &self.academic_keywords
    }

    pub fn industry_keywords(&self) -> &[String] {
        &self.industry_keywords
    }

    /// Classify an affiliation string. Empty text is always academic.
    pub fn classify(&self, affiliation: &str) -> AffiliationClass {
        let text = affiliation.to_lowercase();

        if self.academic_keywords.iter().any(|k| text.contains(k.as_str())) {
            return AffiliationClass::Academic;
        }

        if self.industry_keywords.iter().any(|k| text.contains(k.as_str())) {
            AffiliationClass::Industry
        } else {
            AffiliationClass::Academic
        }
    }

    /// Shorthand for `classify(..) == Industry`; `None` is never industry.
    pub fn is_industry(&self, affiliation: Option<&str>) -> bool {
        affiliation.is_some_and(|a| self.classify(a) == AffiliationClass::Industry)
    }
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self::new(ACADEMIC_KEYWORDS, INDUSTRY_KEYWORDS)
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\w.-]+@[\w.-]+\.[a-zA-Z]{2,}").expect("email pattern is valid")
    })
}

/// First email-like substring of `text`, if any.
pub fn extract_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}
