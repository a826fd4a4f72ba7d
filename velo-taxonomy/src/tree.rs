//! In-memory aggregation of flat taxonomy records.

use crate::parser::FlatRecord;
use std::collections::BTreeMap;

/// Production year range of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

type VariantMap = BTreeMap<String, YearRange>;
type ModelMap = BTreeMap<String, VariantMap>;

/// Three-level make -> model -> variant hierarchy folded from the flat
/// record stream.
///
/// Make names and (make, model) pairs are unique by construction. A
/// model with no named variants is a first-class member of the tree.
/// Ordered maps keep phase dispatch order deterministic across runs.
#[derive(Debug, Default)]
pub struct TaxonomyTree {
    makes: BTreeMap<String, ModelMap>,
}

impl TaxonomyTree {
    /// Fold a record sequence into the tree.
    ///
    /// A record with no variant only establishes its make/model pair.
    /// A repeated variant name under the same model overwrites the
    /// stored year range, so the last occurrence in the input wins.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = FlatRecord>,
    {
        let mut tree = Self::default();
        for record in records {
            let models = tree.makes.entry(record.make).or_default();
            let variants = models.entry(record.model).or_default();
            if let Some(variant) = record.variant {
                variants.insert(
                    variant,
                    YearRange {
                        start: record.year_start,
                        end: record.year_end,
                    },
                );
            }
        }
        tree
    }

    pub fn is_empty(&self) -> bool {
        self.makes.is_empty()
    }

    pub fn make_count(&self) -> usize {
        self.makes.len()
    }

    pub fn model_count(&self) -> usize {
        self.makes.values().map(|models| models.len()).sum()
    }

    pub fn variant_count(&self) -> usize {
        self.makes
            .values()
            .flat_map(|models| models.values())
            .map(|variants| variants.len())
            .sum()
    }

    /// Every make name, in sorted order.
    pub fn make_names(&self) -> impl Iterator<Item = &str> {
        self.makes.keys().map(String::as_str)
    }

    /// Every (make, model) pair.
    pub fn models(&self) -> impl Iterator<Item = (&str, &str)> {
        self.makes.iter().flat_map(|(make, models)| {
            models.keys().map(move |model| (make.as_str(), model.as_str()))
        })
    }

    /// Every (make, model, variant, year range) entry.
    pub fn variants(&self) -> impl Iterator<Item = (&str, &str, &str, YearRange)> {
        self.makes.iter().flat_map(|(make, models)| {
            models.iter().flat_map(move |(model, variants)| {
                variants.iter().map(move |(variant, range)| {
                    (make.as_str(), model.as_str(), variant.as_str(), *range)
                })
            })
        })
    }
}
