//! Ordered selector cascades.
//!
//! A cascade is a table of [`Rule`]s tried in priority order. Each rule names a
//! selector, how to turn its first match into a value ([`Strategy`]) and when
//! that value is good enough to stop ([`Acceptance`]). One runner,
//! [`run_cascade`], walks every table.

use tracing::trace;

use crate::Result;
use crate::parse::Document;

/// How a rule turns its first matching element into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Trimmed flattened text of the element.
    Text,
    /// First non-empty attribute in the given order, else trimmed text.
    AttributesThenText(&'static [&'static str]),
    /// Remove descendants matching the noise selector, then take trimmed text.
    ///
    /// Removal mutates the document; later rules see the pruned tree.
    StrippedText(&'static str),
}

/// When a resolved value ends the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Any non-empty value.
    NonEmpty,
    /// Values strictly longer than the given number of characters.
    ///
    /// Shorter values are kept as a fallback candidate.
    LongerThan(usize),
}

impl Acceptance {
    fn accepts(&self, value: &str) -> bool {
        match self {
            Acceptance::NonEmpty => !value.is_empty(),
            Acceptance::LongerThan(min) => value.chars().count() > *min,
        }
    }
}

/// One entry of a cascade table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub selector: &'static str,
    pub strategy: Strategy,
    pub accept: Acceptance,
}

impl Rule {
    pub const fn text(selector: &'static str) -> Self {
        Self { selector, strategy: Strategy::Text, accept: Acceptance::NonEmpty }
    }

    pub const fn attributes_then_text(selector: &'static str, attributes: &'static [&'static str]) -> Self {
        Self { selector, strategy: Strategy::AttributesThenText(attributes), accept: Acceptance::NonEmpty }
    }

    pub const fn stripped(selector: &'static str, noise: &'static str, accept: Acceptance) -> Self {
        Self { selector, strategy: Strategy::StrippedText(noise), accept }
    }
}

/// Walks `rules` in order and returns the first accepted value.
///
/// Only the first element matching each selector is considered. Empty values
/// count as no match. A non-empty value that fails its rule's acceptance
/// replaces the current candidate, which is returned if no rule accepts.
pub fn run_cascade(doc: &mut Document, rules: &[Rule]) -> Result<Option<String>> {
    let mut candidate = None;

    for rule in rules {
        let Some(value) = resolve(doc, rule)? else {
            continue;
        };

        if value.is_empty() {
            trace!(selector = rule.selector, "empty match");
            continue;
        }

        if rule.accept.accepts(&value) {
            trace!(selector = rule.selector, chars = value.chars().count(), "accepted");
            return Ok(Some(value));
        }

        trace!(selector = rule.selector, chars = value.chars().count(), "kept as candidate");
        candidate = Some(value);
    }

    Ok(candidate)
}

/// Resolves a rule against the document; `None` when nothing matched.
fn resolve(doc: &mut Document, rule: &Rule) -> Result<Option<String>> {
    match rule.strategy {
        Strategy::Text => Ok(doc.select_first(rule.selector)?.map(|el| el.trimmed_text())),
        Strategy::AttributesThenText(attributes) => Ok(doc.select_first(rule.selector)?.map(|el| {
            attributes
                .iter()
                .filter_map(|name| el.attr(name))
                .find(|value| !value.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| el.trimmed_text())
        })),
        Strategy::StrippedText(noise) => {
            let Some(id) = doc.select_first(rule.selector)?.map(|el| el.id()) else {
                return Ok(None);
            };
            doc.remove_within(id, noise)?;
            Ok(doc.element(id).map(|el| el.trimmed_text()))
        }
    }
}
