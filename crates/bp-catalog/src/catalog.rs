//! The immutable category catalog and its builder.

use std::collections::HashMap;

use bp_core::{CategoryId, Mode};

use crate::choice::gravity_weight;
use crate::{CatalogError, CatalogResult, CategoryParams, ModeCoefficients};

// ── Catalog ───────────────────────────────────────────────────────────────────

/// Category definitions plus the raw-class → category map.
///
/// Built once with [`CatalogBuilder`] and shared by reference for the whole
/// run.  Lookups by [`CategoryId`] are plain `Vec` indexing.
///
/// # Panics
///
/// The coefficient accessors panic when handed a `CategoryId` that did not
/// come from this catalog.  That is a programming error, not a data problem.
#[derive(Clone, Debug)]
pub struct Catalog {
    categories: Vec<CategoryParams>,
    by_name:    HashMap<String, CategoryId>,
    class_map:  HashMap<String, CategoryId>,
}

impl Catalog {
    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Map a raw destination class label to its category.
    ///
    /// Unknown labels yield `None`; such destinations are excluded from
    /// assignment.
    #[inline]
    pub fn classify(&self, label: &str) -> Option<CategoryId> {
        self.class_map.get(label.trim()).copied()
    }

    /// Look up a category by name.
    #[inline]
    pub fn category_id(&self, name: &str) -> Option<CategoryId> {
        self.by_name.get(name).copied()
    }

    /// Like [`category_id`](Self::category_id) but fails with a
    /// configuration error.
    pub fn require(&self, name: &str) -> CatalogResult<CategoryId> {
        self.category_id(name)
            .ok_or_else(|| CatalogError::UnknownCategory(name.to_owned()))
    }

    #[inline]
    pub fn params(&self, id: CategoryId) -> &CategoryParams {
        &self.categories[id.index()]
    }

    #[inline]
    pub fn name(&self, id: CategoryId) -> &str {
        &self.params(id).name
    }

    #[inline]
    pub fn decay_coefficient(&self, id: CategoryId) -> f64 {
        self.params(id).decay_coefficient
    }

    #[inline]
    pub fn mode_coefficients(&self, id: CategoryId, mode: Mode) -> &ModeCoefficients {
        self.params(id).coefficients(mode)
    }

    #[inline]
    pub fn trip_rate(&self, id: CategoryId) -> f64 {
        self.params(id).trip_rate
    }

    /// Gravity weight of a destination of `size` at `distance_m`.
    #[inline]
    pub fn decay_weight(&self, id: CategoryId, size: f64, distance_m: f64) -> f64 {
        gravity_weight(size, self.decay_coefficient(id), distance_m)
    }

    /// Mode-choice probability for `mode` at `distance_m`.
    #[inline]
    pub fn mode_probability(&self, id: CategoryId, mode: Mode, distance_m: f64, scale_m: f64) -> f64 {
        self.mode_coefficients(id, mode).probability(distance_m, scale_m)
    }

    /// All category ids in definition order.
    pub fn ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        (0..self.categories.len()).map(|i| CategoryId(i as u16))
    }

    /// `(id, params)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &CategoryParams)> + '_ {
        self.ids().zip(self.categories.iter())
    }

    /// Number of raw class labels with a mapping.
    pub fn class_count(&self) -> usize {
        self.class_map.len()
    }
}

// ── CatalogBuilder ────────────────────────────────────────────────────────────

/// Assemble a [`Catalog`] and validate it as it grows.
///
/// # Example
///
/// ```
/// use bp_catalog::{CatalogBuilder, CategoryParams, ModeCoefficients};
///
/// let coeffs = ModeCoefficients::new(0.0, -1.0, 0.0, 0.0);
/// let mut b = CatalogBuilder::new();
/// b.add_category(CategoryParams::new("shopping", -0.0833, coeffs, coeffs, 0.18)).unwrap();
/// b.map_class("supermarket", "shopping").unwrap();
/// let catalog = b.build();
/// assert!(catalog.classify("supermarket").is_some());
/// assert!(catalog.classify("car_wash").is_none());
/// ```
#[derive(Default)]
pub struct CatalogBuilder {
    categories: Vec<CategoryParams>,
    by_name:    HashMap<String, CategoryId>,
    class_map:  HashMap<String, CategoryId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category and return its id (sequential from 0).
    pub fn add_category(&mut self, params: CategoryParams) -> CatalogResult<CategoryId> {
        let name = params.name.trim().to_owned();
        if name.is_empty() {
            return Err(CatalogError::Parse("category name must not be empty".into()));
        }
        if self.by_name.contains_key(&name) {
            return Err(CatalogError::DuplicateCategory(name));
        }
        validate(&name, &params)?;
        if params.decay_coefficient > 0.0 {
            log::warn!(
                "category {name:?} has a positive decay coefficient ({}); attractiveness will grow with distance",
                params.decay_coefficient
            );
        }

        let id = CategoryId::try_from(self.categories.len())
            .ok()
            .filter(|id| *id != CategoryId::INVALID)
            .ok_or(CatalogError::TooManyCategories)?;
        self.by_name.insert(name.clone(), id);
        self.categories.push(CategoryParams { name, ..params });
        Ok(id)
    }

    /// Map the raw class `label` to the already-registered `category`.
    ///
    /// Re-mapping a label to the same category is a no-op; mapping it to a
    /// different one is an error.
    pub fn map_class(&mut self, label: &str, category: &str) -> CatalogResult<()> {
        let id = *self
            .by_name
            .get(category.trim())
            .ok_or_else(|| CatalogError::UnknownCategory(category.to_owned()))?;
        let label = label.trim();
        match self.class_map.get(label) {
            Some(&existing) if existing != id => Err(CatalogError::ConflictingClass {
                label:     label.to_owned(),
                existing:  self.categories[existing.index()].name.clone(),
                requested: category.to_owned(),
            }),
            Some(_) => Ok(()),
            None => {
                self.class_map.insert(label.to_owned(), id);
                Ok(())
            }
        }
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Freeze the catalog.
    pub fn build(self) -> Catalog {
        Catalog {
            categories: self.categories,
            by_name:    self.by_name,
            class_map:  self.class_map,
        }
    }
}

fn validate(name: &str, p: &CategoryParams) -> CatalogResult<()> {
    let invalid = |what| CatalogError::InvalidParameter { category: name.to_owned(), what };
    if !p.decay_coefficient.is_finite() {
        return Err(invalid("decay coefficient"));
    }
    if !(p.trip_rate.is_finite() && p.trip_rate >= 0.0) {
        return Err(invalid("trip rate"));
    }
    if !p.bike.is_finite() {
        return Err(invalid("bike mode coefficients"));
    }
    if !p.ebike.is_finite() {
        return Err(invalid("e-bike mode coefficients"));
    }
    Ok(())
}
