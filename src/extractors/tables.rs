// src/extractors/tables.rs

use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// The status page nests one table per hospital category under these
/// fixed container ids. The list is part of the page contract; ids not
/// present on a given day are simply absent from the output.
pub const SECTION_IDS: [&str; 5] = [
    "private_hospital",
    "private_medical_college",
    "covid_care_centers",
    "governmenthospital",
    "government_medical_college",
];

// --- CSS Selectors (Lazy Static) ---
static SECTION_DIV_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    let grouped = SECTION_IDS
        .iter()
        .map(|id| format!("div#{}", id))
        .collect::<Vec<_>>()
        .join(", ");
    Selector::parse(&grouped).expect("Failed to compile SECTION_DIV_SELECTOR")
});

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Failed to compile TABLE_SELECTOR"));

/// Locates the known section containers and returns `(section id, table)`
/// pairs in document order, not `SECTION_IDS` order.
///
/// Containers missing from the page are skipped silently. A container
/// that is present but holds no table is an error: the layout contract
/// is broken and the run should not pretend the section was absent.
pub fn locate_section_tables(document: &Html) -> Result<Vec<(String, ElementRef<'_>)>, ExtractError> {
    let mut tables = Vec::new();

    for div in document.select(&SECTION_DIV_SELECTOR) {
        let section_id = div.value().attr("id").unwrap_or_default().to_string();

        match div.select(&TABLE_SELECTOR).next() {
            Some(table) => {
                tracing::debug!("Located table for section '{}'", section_id);
                tables.push((section_id, table));
            }
            None => {
                tracing::error!("Section container '{}' present but has no table", section_id);
                return Err(ExtractError::TableNotFound(section_id));
            }
        }
    }

    tracing::info!("Located {} section tables", tables.len());
    Ok(tables)
}
