//! Overpass QL generation from a category catalog.

use std::fmt::Write as _;

use boucle_poi::{CategoryCatalog, TagFilter};
use geo::Rect;

/// Build an Overpass QL query selecting every catalog filter inside `bbox`.
///
/// Nodes and ways are returned with full geometry; relations with their
/// centre only. `bbox` follows the `geo` convention (`x` = longitude).
///
/// # Examples
/// ```
/// use boucle_data::overpass::build_query;
/// use boucle_poi::CategoryCatalog;
/// use geo::{Coord, Rect};
///
/// let catalog = CategoryCatalog::from_entries([("water", ["amenity=drinking_water"])])
///     .expect("valid catalog");
/// let bbox = Rect::new(Coord { x: 2.0, y: 48.0 }, Coord { x: 2.1, y: 48.1 });
/// let query = build_query(&bbox, &catalog, 25);
/// assert!(query.starts_with("[out:json][timeout:25][bbox:48,2,48.1,2.1];"));
/// assert!(query.contains(r#"nw["amenity"="drinking_water"];"#));
/// ```
#[must_use]
pub fn build_query(bbox: &Rect<f64>, catalog: &CategoryCatalog, timeout_secs: u64) -> String {
    let (min, max) = (bbox.min(), bbox.max());
    let mut query = format!(
        "[out:json][timeout:{timeout_secs}][bbox:{},{},{},{}];\n",
        min.y, min.x, max.y, max.x
    );
    push_union(&mut query, "nw", catalog);
    query.push_str("->.features;\n.features out tags geom;\n");
    push_union(&mut query, "relation", catalog);
    query.push_str(";\nout tags center;\n");
    query
}

fn push_union(query: &mut String, selector: &str, catalog: &CategoryCatalog) {
    query.push_str("(\n");
    for filter in catalog.filters() {
        // Writing to a String cannot fail.
        let _ = writeln!(query, "  {selector}{};", filter_clause(filter));
    }
    query.push(')');
}

fn filter_clause(filter: &TagFilter) -> String {
    match filter.value() {
        Some(value) => format!("[\"{}\"=\"{}\"]", escape(filter.key()), escape(value)),
        None => format!("[\"{}\"]", escape(filter.key())),
    }
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
