// src/sanitize/mod.rs
//! Privacy sanitization
//!
//! Classifies input fields whose values must be masked before the recording
//! engine captures them, and assembles the engine's masking options from the
//! classifier plus the configured rules. This module never logs or transmits
//! field values; it only answers "mask or not".

use crate::config::MaskingRules;
use std::sync::Arc;

/// Attributes of an input element, as seen by the recording engine
#[derive(Debug, Clone, Default)]
pub struct FieldDescriptor<'a> {
    pub name: Option<&'a str>,
    pub id: Option<&'a str>,
    pub input_type: Option<&'a str>,
    pub classes: Option<&'a str>,
    pub autocomplete: Option<&'a str>,
}

/// Input types whose values are always masked
const SENSITIVE_INPUT_TYPES: &[&str] = &["password"];

/// Autocomplete hints that mark a field sensitive
const SENSITIVE_AUTOCOMPLETE: &[&str] = &[
    "current-password",
    "new-password",
    "one-time-code",
    "cc-number",
    "cc-name",
    "cc-given-name",
    "cc-additional-name",
    "cc-family-name",
    "cc-exp",
    "cc-exp-month",
    "cc-exp-year",
    "cc-csc",
    "cc-type",
];

/// Substring patterns, matched against the attribute with separators and
/// case removed ("api-key", "api_key" and "apiKey" all collapse to "apikey")
const SENSITIVE_SUBSTRINGS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "apikey",
    "credit",
    "cardnumber",
    "socialsecurity",
    "taxid",
    "routing",
    "accountnumber",
    "bankaccount",
];

/// Short tokens matched only as whole words to avoid false positives
/// ("pin" must not flag "shipping")
const SENSITIVE_TOKENS: &[&str] = &[
    "pwd", "auth", "cvv", "cvc", "csc", "ssn", "tin", "ein", "iban", "swift", "pin",
];

/// Decide whether a field's value must be masked
pub fn is_sensitive_field(field: &FieldDescriptor<'_>) -> bool {
    if let Some(input_type) = field.input_type {
        let t = input_type.to_ascii_lowercase();
        if SENSITIVE_INPUT_TYPES.contains(&t.as_str()) {
            return true;
        }
    }

    if let Some(autocomplete) = field.autocomplete {
        let hint = autocomplete.to_ascii_lowercase();
        if SENSITIVE_AUTOCOMPLETE.contains(&hint.as_str()) {
            return true;
        }
    }

    [field.name, field.id, field.classes]
        .iter()
        .flatten()
        .any(|attr| matches_pattern_library(attr))
}

fn matches_pattern_library(attr: &str) -> bool {
    let squashed: String = attr
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if SENSITIVE_SUBSTRINGS.iter().any(|p| squashed.contains(p)) {
        return true;
    }

    split_words(attr)
        .iter()
        .any(|word| SENSITIVE_TOKENS.contains(&word.as_str()))
}

/// Split an attribute into lowercase words on separators, camelCase
/// boundaries, and letter/digit boundaries ("cvv2" → ["cvv", "2"])
fn split_words(attr: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in attr.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }

        let boundary = (c.is_ascii_uppercase() && prev_lower)
            || (c.is_ascii_digit() && prev_lower)
            || (c.is_ascii_alphabetic() && current.chars().last().is_some_and(|p| p.is_ascii_digit()));
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }

        prev_lower = c.is_ascii_lowercase();
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Field classifier callback handed to the recording engine
pub type FieldClassifier = Arc<dyn Fn(&FieldDescriptor<'_>) -> bool + Send + Sync>;

/// Masking configuration assembled for the recording engine
#[derive(Clone)]
pub struct MaskingOptions {
    /// Input `type` attributes always masked (configured rules)
    pub mask_input_types: Vec<String>,

    /// Elements to block entirely
    pub block_selectors: Vec<String>,

    /// Elements whose text is masked
    pub mask_selectors: Vec<String>,

    /// Elements the engine skips
    pub ignore_selectors: Vec<String>,

    /// Per-field classifier for everything the selector rules miss
    pub classify_field: FieldClassifier,
}

impl std::fmt::Debug for MaskingOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskingOptions")
            .field("mask_input_types", &self.mask_input_types)
            .field("block_selectors", &self.block_selectors)
            .field("mask_selectors", &self.mask_selectors)
            .field("ignore_selectors", &self.ignore_selectors)
            .finish_non_exhaustive()
    }
}

impl MaskingOptions {
    /// Build engine masking options from the configured rules
    pub fn from_rules(rules: &MaskingRules) -> Self {
        Self {
            mask_input_types: rules.mask_input_types.clone(),
            block_selectors: rules.block_selectors.clone(),
            mask_selectors: rules.mask_selectors.clone(),
            ignore_selectors: rules.ignore_selectors.clone(),
            classify_field: Arc::new(|field| is_sensitive_field(field)),
        }
    }
}
