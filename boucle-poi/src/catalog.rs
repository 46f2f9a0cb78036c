//! Category catalog mapping OpenStreetMap tags to POI categories.
//!
//! A catalog is an ordered list of categories, each with an ordered list of
//! tag filters. Classification walks categories and filters in order and
//! reports the first match, so earlier entries win when a feature carries
//! tags from several categories.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use boucle_core::Tags;
use thiserror::Error;

/// Filters of the built-in catalog, in priority order.
const STANDARD_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "water",
        &[
            "amenity=drinking_water",
            "amenity=water_point",
            "man_made=water_tap",
            "natural=spring",
        ],
    ),
    ("toilets", &["amenity=toilets"]),
    (
        "food",
        &[
            "amenity=restaurant",
            "amenity=cafe",
            "amenity=fast_food",
            "amenity=pub",
        ],
    ),
    (
        "groceries",
        &[
            "shop=supermarket",
            "shop=convenience",
            "shop=bakery",
            "shop=greengrocer",
        ],
    ),
    (
        "bike_service",
        &[
            "shop=bicycle",
            "amenity=bicycle_repair_station",
            "amenity=bicycle_rental",
        ],
    ),
    (
        "lodging",
        &[
            "tourism=hotel",
            "tourism=guest_house",
            "tourism=hostel",
            "tourism=chalet",
        ],
    ),
    (
        "camping",
        &[
            "tourism=camp_site",
            "tourism=caravan_site",
            "amenity=shelter",
        ],
    ),
    ("viewpoint", &["tourism=viewpoint"]),
    ("heritage", &["historic=*", "heritage=*"]),
    ("pharmacy", &["amenity=pharmacy"]),
];

static STANDARD: LazyLock<Arc<CategoryCatalog>> = LazyLock::new(|| {
    let categories = STANDARD_CATEGORIES
        .iter()
        .map(|(name, filters)| Category {
            name: (*name).to_owned(),
            filters: filters
                .iter()
                .filter_map(|raw| raw.parse().ok())
                .collect(),
        })
        .collect();
    Arc::new(CategoryCatalog { categories })
});

/// Errors raised while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A filter is not of the form `key=value` or `key=*`.
    #[error("invalid tag filter {filter:?}: expected `key=value` or `key=*`")]
    InvalidFilter {
        /// The rejected filter text.
        filter: String,
    },
    /// A category name is blank.
    #[error("category names must not be blank")]
    BlankCategory,
    /// Two categories share a name.
    #[error("category {name:?} is defined twice")]
    DuplicateCategory {
        /// The repeated name.
        name: String,
    },
}

/// A single `key=value` or `key=*` tag filter.
///
/// # Examples
/// ```
/// use boucle_poi::TagFilter;
///
/// let filter: TagFilter = "historic=*".parse().expect("valid filter");
/// assert_eq!(filter.key(), "historic");
/// assert_eq!(filter.value(), None);
/// assert_eq!(filter.to_string(), "historic=*");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagFilter {
    key: String,
    value: Option<String>,
}

impl TagFilter {
    /// Tag key the filter inspects.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Required value, `None` for a wildcard.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The kind reported when `tags` satisfy the filter: the tag value.
    #[must_use]
    pub fn matches<'t>(&self, tags: &'t Tags) -> Option<&'t str> {
        let actual = tags.get(&self.key)?.trim();
        if actual.is_empty() || actual == "no" {
            return None;
        }
        match &self.value {
            Some(expected) if expected != actual => None,
            _ => Some(actual),
        }
    }
}

impl FromStr for TagFilter {
    type Err = CatalogError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || CatalogError::InvalidFilter {
            filter: raw.to_owned(),
        };
        let (raw_key, raw_value) = raw.split_once('=').ok_or_else(invalid)?;
        let (key, value) = (raw_key.trim(), raw_value.trim());
        if key.is_empty() || value.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            key: key.to_owned(),
            value: (value != "*").then(|| value.to_owned()),
        })
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value.as_deref().unwrap_or("*"))
    }
}

/// A named group of tag filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    filters: Vec<TagFilter>,
}

impl Category {
    /// Category name, e.g. `water`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filters in priority order.
    #[must_use]
    pub fn filters(&self) -> &[TagFilter] {
        &self.filters
    }
}

/// Result of classifying a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'c> {
    /// Name of the matching category.
    pub category: &'c str,
    /// Tag value that matched, e.g. `drinking_water`.
    pub kind: String,
}

/// Immutable, ordered map from category names to tag filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    /// The built-in catalog, built once and shared.
    ///
    /// # Examples
    /// ```
    /// use boucle_core::Tags;
    /// use boucle_poi::CategoryCatalog;
    ///
    /// let tags = Tags::from([("amenity".to_owned(), "drinking_water".to_owned())]);
    /// let catalog = CategoryCatalog::standard();
    /// let found = catalog.classify(&tags).expect("water tap");
    /// assert_eq!(found.category, "water");
    /// assert_eq!(found.kind, "drinking_water");
    /// ```
    #[must_use]
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD)
    }

    /// Build a catalog from `(category, filters)` pairs in priority order.
    ///
    /// # Errors
    /// Returns [`CatalogError`] for malformed filters, blank names or
    /// repeated categories.
    pub fn from_entries<I, N, F, S>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (N, F)>,
        N: Into<String>,
        F: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories: Vec<Category> = Vec::new();
        for (raw_name, raw_filters) in entries {
            let name = raw_name.into().trim().to_owned();
            if name.is_empty() {
                return Err(CatalogError::BlankCategory);
            }
            if categories.iter().any(|c| c.name == name) {
                return Err(CatalogError::DuplicateCategory { name });
            }
            let filters = raw_filters
                .into_iter()
                .map(|raw| raw.as_ref().parse())
                .collect::<Result<Vec<TagFilter>, _>>()?;
            categories.push(Category { name, filters });
        }
        Ok(Self { categories })
    }

    /// Categories in priority order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Every filter of every category, in priority order.
    pub fn filters(&self) -> impl Iterator<Item = &TagFilter> + '_ {
        self.categories.iter().flat_map(|c| c.filters.iter())
    }

    /// First category whose filter matches `tags`.
    #[must_use]
    pub fn classify(&self, tags: &Tags) -> Option<Classification<'_>> {
        self.categories.iter().find_map(|category| {
            category.filters.iter().find_map(|filter| {
                filter.matches(tags).map(|kind| Classification {
                    category: category.name.as_str(),
                    kind: kind.to_owned(),
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[rstest]
    #[case(&[("amenity", "drinking_water")], "water", "drinking_water")]
    #[case(&[("man_made", "water_tap")], "water", "water_tap")]
    #[case(&[("amenity", "toilets")], "toilets", "toilets")]
    #[case(&[("shop", "bakery")], "groceries", "bakery")]
    #[case(&[("amenity", "bicycle_repair_station")], "bike_service", "bicycle_repair_station")]
    #[case(&[("tourism", "camp_site")], "camping", "camp_site")]
    #[case(&[("historic", "castle")], "heritage", "castle")]
    #[case(&[("amenity", "pharmacy")], "pharmacy", "pharmacy")]
    fn classifies_standard_tags(
        #[case] pairs: &[(&str, &str)],
        #[case] category: &str,
        #[case] kind: &str,
    ) {
        let catalog = CategoryCatalog::standard();
        let found = catalog.classify(&tags(pairs)).expect("classified");
        assert_eq!(found.category, category);
        assert_eq!(found.kind, kind);
    }

    #[rstest]
    fn earlier_category_wins() {
        let catalog = CategoryCatalog::standard();
        let found = catalog
            .classify(&tags(&[("historic", "fountain"), ("amenity", "drinking_water")]))
            .expect("classified");
        assert_eq!(found.category, "water");
    }

    #[rstest]
    #[case(&[("amenity", "bench")])]
    #[case(&[("historic", "no")])]
    #[case(&[("historic", "  ")])]
    #[case(&[])]
    fn unmatched_tags_are_unclassified(#[case] pairs: &[(&str, &str)]) {
        assert!(CategoryCatalog::standard().classify(&tags(pairs)).is_none());
    }

    #[rstest]
    fn standard_catalog_has_ten_categories_in_order() {
        let catalog = CategoryCatalog::standard();
        let names: Vec<&str> = catalog.categories().iter().map(Category::name).collect();
        assert_eq!(
            names,
            [
                "water",
                "toilets",
                "food",
                "groceries",
                "bike_service",
                "lodging",
                "camping",
                "viewpoint",
                "heritage",
                "pharmacy"
            ]
        );
        assert!(catalog.categories().iter().all(|c| !c.filters().is_empty()));
    }

    #[rstest]
    #[case("amenity")]
    #[case("=water")]
    #[case("amenity=")]
    fn rejects_malformed_filters(#[case] raw: &str) {
        assert!(matches!(
            raw.parse::<TagFilter>(),
            Err(CatalogError::InvalidFilter { .. })
        ));
    }

    #[rstest]
    fn custom_catalog_rejects_duplicates() {
        let result = CategoryCatalog::from_entries([
            ("water", vec!["amenity=drinking_water"]),
            ("water", vec!["natural=spring"]),
        ]);
        assert_eq!(
            result,
            Err(CatalogError::DuplicateCategory {
                name: "water".to_owned()
            })
        );
    }

    #[rstest]
    fn custom_catalog_classifies() {
        let catalog = CategoryCatalog::from_entries([("benches", ["amenity=bench"])])
            .expect("valid catalog");
        let found = catalog
            .classify(&tags(&[("amenity", "bench")]))
            .expect("classified");
        assert_eq!(found.category, "benches");
        assert!(catalog.category("water").is_none());
    }
}
