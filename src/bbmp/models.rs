// src/bbmp/models.rs
use serde::{Deserialize, Serialize};

/// One facility row from a bed-status table.
///
/// Field names follow the published document schema, including the
/// inherited `total_ice_vent` spelling (the filled/net counterparts use
/// `icu_vent`). Downstream consumers key on these exact names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRecord {
    /// Composite id: "{category}_{serial number}".
    pub snum: String,
    pub facility_type: String,
    pub total_gen: i64,
    pub total_hdu: i64,
    pub total_icu: i64,
    pub total_ice_vent: i64,
    pub total_allot: i64,
    pub filled_gen: i64,
    pub filled_hdu: i64,
    pub filled_icu: i64,
    pub filled_icu_vent: i64,
    pub filled_allot: i64,
    pub net_gen: i64,
    pub net_hdu: i64,
    pub net_icu: i64,
    pub net_icu_vent: i64,
    pub net_allot: i64,
    pub total_beds: i64,
    pub total_occupied_beds: i64,
    pub total_available_beds: i64,
}

/// Category-level subtotals taken from a summary row (a row with no valid
/// serial number). Carries only the 12 total/filled/net counts per bed
/// class; the allotted triad is not summarized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedSummary {
    pub sum_total_gen: i64,
    pub sum_total_hdu: i64,
    pub sum_total_icu: i64,
    pub sum_total_icu_vent: i64,
    pub sum_filled_gen: i64,
    pub sum_filled_hdu: i64,
    pub sum_filled_icu: i64,
    pub sum_filled_icu_vent: i64,
    pub sum_net_gen: i64,
    pub sum_net_hdu: i64,
    pub sum_net_icu: i64,
    pub sum_net_icu_vent: i64,
}

/// The normalized output for one located section: one hospital-category
/// grouping with its records and grand totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDocument {
    pub category: String,
    pub columns: Vec<String>,
    pub records: Vec<FacilityRecord>,
    pub grand_total_beds: i64,
    pub grand_occupied_beds: i64,
    pub grand_available_beds: i64,
    /// Stable hash of the category string, used with `category` as the
    /// dedup key by the persistence layer. Not collision-free; this is a
    /// known weak uniqueness guarantee inherited from the source contract.
    pub hid: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<BedSummary>,
}
