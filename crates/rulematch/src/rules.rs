//! Brand rule sets: one query per brand and one per sub-brand.
//!
//! Rule sets are authored as JSON:
//!
//! ```json
//! {
//!   "brands": [
//!     {
//!       "name": "Stryker",
//!       "rule": "stryker OR \"salvation beams\"",
//!       "subbrands": [
//!         { "name": "T2", "rule": "\"T2 femur\" NOT (stock OR \"wall street\")" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Brands and sub-brands are tried in declaration order and the first match
//! wins.

use std::fmt;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::context::MatchContext;
use crate::errors::{QueryWarning, RuleSetError};
use crate::query::Query;

/// Top-level rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    /// Brands in priority order.
    pub brands: Vec<BrandRule>,
}

/// A brand and the query that recognises it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrandRule {
    /// Display name reported on a match.
    pub name: String,
    /// Query text a document must satisfy to belong to the brand.
    pub rule: String,
    /// Sub-brands in priority order, tried only once the brand matched.
    #[serde(default)]
    pub subbrands: Vec<SubBrandRule>,
}

/// A sub-brand within a brand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubBrandRule {
    /// Display name reported on a match.
    pub name: String,
    /// Query text a document must satisfy to belong to the sub-brand.
    pub rule: String,
}

fn check_names<'a>(
    names: impl Iterator<Item = &'a str>,
    entry: &str,
    scope: &str,
) -> Result<(), RuleSetError> {
    let mut seen = HashSet::new();
    for (index, name) in names.enumerate() {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RuleSetError::BlankName {
                scope: format!("{entry} at index {index}"),
            });
        }
        if !seen.insert(trimmed) {
            return Err(RuleSetError::DuplicateName {
                scope: scope.to_owned(),
                name: trimmed.to_owned(),
            });
        }
    }
    Ok(())
}

impl RuleSet {
    /// Parse and validate a JSON rule set.
    ///
    /// # Errors
    /// Returns [`RuleSetError::Json`] for malformed JSON or unknown fields,
    /// and a naming error when a name is blank or repeated within its scope.
    pub fn from_json(source: &str) -> Result<Self, RuleSetError> {
        let rules: Self = serde_json::from_str(source)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check naming constraints on an already-built rule set.
    ///
    /// # Errors
    /// Returns [`RuleSetError::BlankName`] or [`RuleSetError::DuplicateName`].
    pub fn validate(&self) -> Result<(), RuleSetError> {
        check_names(
            self.brands.iter().map(|brand| brand.name.as_str()),
            "brand",
            "brands",
        )?;
        for brand in &self.brands {
            check_names(
                brand.subbrands.iter().map(|sub| sub.name.as_str()),
                &format!("sub-brand of `{}`", brand.name),
                &format!("sub-brands of `{}`", brand.name),
            )?;
        }
        Ok(())
    }

    /// Compile every rule once, logging any authoring warnings.
    #[must_use]
    pub fn compile(&self) -> Classifier {
        let mut warnings = Vec::new();
        let brands = self
            .brands
            .iter()
            .map(|brand| {
                let query = Query::compile(&brand.rule);
                collect_warnings(&mut warnings, &brand.name, None, &query);
                let subbrands = brand
                    .subbrands
                    .iter()
                    .map(|sub| {
                        let query = Query::compile(&sub.rule);
                        collect_warnings(
                            &mut warnings,
                            &brand.name,
                            Some(sub.name.as_str()),
                            &query,
                        );
                        CompiledSubBrand {
                            name: sub.name.clone(),
                            query,
                        }
                    })
                    .collect();
                CompiledBrand {
                    name: brand.name.clone(),
                    query,
                    subbrands,
                }
            })
            .collect();
        for warning in &warnings {
            log::warn!("{warning}");
        }
        Classifier { brands, warnings }
    }
}

fn collect_warnings(
    out: &mut Vec<RuleWarning>,
    brand: &str,
    subbrand: Option<&str>,
    query: &Query,
) {
    out.extend(query.warnings().iter().map(|warning| RuleWarning {
        brand: brand.to_owned(),
        subbrand: subbrand.map(str::to_owned),
        warning: warning.clone(),
    }));
}

/// An authoring warning attributed to the rule it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleWarning {
    /// Brand owning the rule.
    pub brand: String,
    /// Sub-brand owning the rule, if the rule is a sub-brand rule.
    pub subbrand: Option<String>,
    /// The tolerated construct.
    pub warning: QueryWarning,
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "brand `{}`", self.brand)?;
        if let Some(sub) = &self.subbrand {
            write!(f, " sub-brand `{sub}`")?;
        }
        write!(f, ": {}", self.warning)
    }
}

/// Outcome of a successful classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// The first brand whose rule matched.
    pub brand: String,
    /// The first of that brand's sub-brands whose rule matched.
    pub subbrand: Option<String>,
}

#[derive(Debug, Clone)]
struct CompiledSubBrand {
    name: String,
    query: Query,
}

#[derive(Debug, Clone)]
struct CompiledBrand {
    name: String,
    query: Query,
    subbrands: Vec<CompiledSubBrand>,
}

/// Borrowed view of one compiled rule, for listing and linting.
#[derive(Debug, Clone, Copy)]
pub struct CompiledRule<'a> {
    /// Brand owning the rule.
    pub brand: &'a str,
    /// Sub-brand owning the rule, if any.
    pub subbrand: Option<&'a str>,
    /// The compiled query.
    pub query: &'a Query,
}

/// Compiled rule set ready to classify documents.
///
/// # Examples
/// ```
/// use rulematch::{Classification, RuleSet};
/// let rules = RuleSet::from_json(r#"{"brands": [
///     {"name": "Tornier", "rule": "\"Aequalis Humeral Nail\" OR AequalisHumeralNail"}
/// ]}"#)?;
/// let classifier = rules.compile();
/// assert_eq!(
///     classifier.classify("Aequalis humeral nail outcomes"),
///     Some(Classification { brand: "Tornier".into(), subbrand: None })
/// );
/// assert_eq!(classifier.classify("Unrelated"), None);
/// # Ok::<(), rulematch::RuleSetError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    brands: Vec<CompiledBrand>,
    warnings: Vec<RuleWarning>,
}

impl Classifier {
    /// Classify raw document text.
    #[must_use]
    pub fn classify(&self, document: &str) -> Option<Classification> {
        self.classify_context(&MatchContext::new(document))
    }

    /// Classify a document whose context is already built.
    #[must_use]
    pub fn classify_context(&self, context: &MatchContext) -> Option<Classification> {
        let Some(brand) = self
            .brands
            .iter()
            .find(|brand| brand.query.evaluate(context))
        else {
            log::trace!("no brand matched");
            return None;
        };
        let subbrand = brand
            .subbrands
            .iter()
            .find(|sub| sub.query.evaluate(context))
            .map(|sub| sub.name.clone());
        log::trace!("matched brand {} sub-brand {subbrand:?}", brand.name);
        Some(Classification {
            brand: brand.name.clone(),
            subbrand,
        })
    }

    /// Every compiled rule in declaration order, brand before its sub-brands.
    pub fn rules(&self) -> impl Iterator<Item = CompiledRule<'_>> {
        self.brands.iter().flat_map(|brand| {
            let head = CompiledRule {
                brand: brand.name.as_str(),
                subbrand: None,
                query: &brand.query,
            };
            std::iter::once(head).chain(brand.subbrands.iter().map(move |sub| CompiledRule {
                brand: brand.name.as_str(),
                subbrand: Some(sub.name.as_str()),
                query: &sub.query,
            }))
        })
    }

    /// Authoring warnings gathered while compiling.
    #[must_use]
    pub fn warnings(&self) -> &[RuleWarning] {
        &self.warnings
    }

    /// Number of brands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.brands.len()
    }

    /// Whether the rule set has no brands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }
}
