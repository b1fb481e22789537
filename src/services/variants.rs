//! Variant combination engine.
//!
//! Everything here is pure: selections in, combinations, signatures, SKUs and
//! a reconciliation plan out. [`super::variant_service`] applies the plan to
//! storage.

use std::collections::{HashMap, HashSet};

use deunicode::deunicode;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::common::AttributePair;
use crate::errors::ServiceError;

/// Maximum stored SKU length, in characters.
pub const MAX_SKU_LENGTH: usize = 100;

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").expect("valid slug regex");
}

/// Sorted attribute-value ids of a combination. Equal signatures mean equal
/// combinations regardless of axis order.
pub type Signature = Vec<Uuid>;

/// The values a product offers on one attribute axis, in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisGroup {
    pub attribute_id: Uuid,
    pub value_ids: Vec<Uuid>,
}

/// Groups selections by attribute in a single pass.
///
/// Axes appear in the order their first selection is seen; values keep their
/// selection order. A value listed twice on the same axis is kept once.
pub fn group_by_axis<I>(selections: I) -> Vec<AxisGroup>
where
    I: IntoIterator<Item = AttributePair>,
{
    let mut groups: Vec<AxisGroup> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for pair in selections {
        let slot = *index.entry(pair.attribute_id).or_insert_with(|| {
            groups.push(AxisGroup {
                attribute_id: pair.attribute_id,
                value_ids: Vec::new(),
            });
            groups.len() - 1
        });

        let values = &mut groups[slot].value_ids;
        if !values.contains(&pair.attribute_value_id) {
            values.push(pair.attribute_value_id);
        }
    }

    groups
}

/// Number of combinations the axes expand to, `None` on overflow.
/// Zero axes expand to zero combinations.
pub fn combination_count(groups: &[AxisGroup]) -> Option<usize> {
    if groups.is_empty() {
        return Some(0);
    }
    groups
        .iter()
        .try_fold(1usize, |acc, group| acc.checked_mul(group.value_ids.len()))
}

/// Rejects expansions above `max_combinations` before anything is built.
pub fn ensure_within_ceiling(
    groups: &[AxisGroup],
    max_combinations: Option<usize>,
) -> Result<usize, ServiceError> {
    let count = combination_count(groups).ok_or_else(|| {
        ServiceError::ValidationError("Variant combination count overflows".to_string())
    })?;

    match max_combinations {
        Some(max) if count > max => Err(ServiceError::ValidationError(format!(
            "Attribute selections expand to {} variants, above the limit of {}",
            count, max
        ))),
        _ => Ok(count),
    }
}

/// Cartesian product over the axes, one value per axis, in axis order.
///
/// Built as a nested-loop accumulator: start from one empty partial
/// combination and extend every partial by each value of the next axis.
pub fn cartesian_product(groups: &[AxisGroup]) -> Vec<Vec<AttributePair>> {
    if groups.is_empty() {
        return Vec::new();
    }

    let mut combinations: Vec<Vec<AttributePair>> = vec![Vec::with_capacity(groups.len())];

    for group in groups {
        let mut extended = Vec::with_capacity(combinations.len() * group.value_ids.len());
        for partial in &combinations {
            for value_id in &group.value_ids {
                let mut next = partial.clone();
                next.push(AttributePair::new(group.attribute_id, *value_id));
                extended.push(next);
            }
        }
        combinations = extended;
    }

    combinations
}

/// Canonical signature of a combination.
pub fn signature(pairs: &[AttributePair]) -> Signature {
    let mut ids: Vec<Uuid> = pairs.iter().map(|p| p.attribute_value_id).collect();
    ids.sort_unstable();
    ids
}

/// Lowercase ASCII slug with `-` separators. Non-Latin text is
/// transliterated first, so "Größe" becomes "grosse".
pub fn slugify(text: &str) -> String {
    let lowered = deunicode(text).to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// SKU prefix for a product: its own SKU, or a slug of its name.
pub fn sku_base(product_sku: Option<&str>, product_name: &str) -> String {
    match product_sku {
        Some(sku) if !sku.is_empty() => sku.to_string(),
        _ => slugify(product_name),
    }
}

/// `base-value1-value2...`, truncated to [`MAX_SKU_LENGTH`] characters.
///
/// Truncation can make two SKUs equal; the unique index on
/// `product_variants.sku` rejects the second insert.
pub fn generate_variant_sku<S: AsRef<str>>(base: &str, value_labels: &[S]) -> String {
    let mut sku = base.to_string();
    for label in value_labels {
        sku.push('-');
        sku.push_str(&slugify(label.as_ref()));
    }

    match sku.char_indices().nth(MAX_SKU_LENGTH) {
        Some((cut, _)) => sku[..cut].to_string(),
        None => sku,
    }
}

/// A stored variant reduced to what reconciliation compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingVariant {
    pub id: Uuid,
    pub pairs: Vec<AttributePair>,
}

/// What reconciliation has to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Combinations with no stored variant, in expansion order
    pub to_create: Vec<Vec<AttributePair>>,
    /// Variants whose signature is no longer offered
    pub to_delete: Vec<Uuid>,
    /// Variants left exactly as they are
    pub unchanged: Vec<Uuid>,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

/// Diffs the computed combinations against stored variants by signature.
///
/// `existing` should be in creation order: when two stored variants share a
/// signature the first is kept and the rest are deleted.
pub fn plan_reconciliation(
    combinations: Vec<Vec<AttributePair>>,
    existing: &[ExistingVariant],
) -> ReconcilePlan {
    let wanted: HashSet<Signature> = combinations.iter().map(|c| signature(c)).collect();

    let mut plan = ReconcilePlan::default();
    let mut kept: HashSet<Signature> = HashSet::new();

    for variant in existing {
        let sig = signature(&variant.pairs);
        if wanted.contains(&sig) && kept.insert(sig) {
            plan.unchanged.push(variant.id);
        } else {
            plan.to_delete.push(variant.id);
        }
    }

    for combination in combinations {
        let sig = signature(&combination);
        if kept.insert(sig) {
            plan.to_create.push(combination);
        }
    }

    plan
}
