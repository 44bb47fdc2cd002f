// src/extractors/beds.rs

// --- Imports ---
use crate::bbmp::models::{BedSummary, FacilityRecord, SectionDocument};
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Number of bed-count columns every row must resolve to.
pub const BED_FIELD_COUNT: usize = 15;

// --- CSS Selectors / Regex (Lazy Static) ---
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

// Matches serial numbers and misplaced bed counts; anything else in the
// serial position marks a summary row.
static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("Failed to compile NUMERIC_RE"));

/// The 15 bed counts of one table row, in column order:
/// total/filled/net (available) for general, HDU, ICU, ICU-ventilator
/// and allotted beds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BedCounts {
    pub total_gen: i64,
    pub total_hdu: i64,
    pub total_icu: i64,
    pub total_icu_vent: i64,
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
}

impl BedCounts {
    /// Builds the fixed 15-field tuple from repaired row tokens. A count
    /// mismatch at this point means the row is unsalvageable; log the
    /// category and raw tokens before propagating.
    fn from_tokens(category: &str, tokens: &[String]) -> Result<Self, ExtractError> {
        if tokens.len() != BED_FIELD_COUNT {
            tracing::error!("category={}", category);
            tracing::error!("unexpected bed field count, tokens: {:?}", tokens);
            return Err(ExtractError::RowShape {
                category: category.to_string(),
                expected: BED_FIELD_COUNT,
                got: tokens.len(),
                tokens: tokens.to_vec(),
            });
        }

        let mut counts = [0i64; BED_FIELD_COUNT];
        for (slot, token) in counts.iter_mut().zip(tokens) {
            *slot = parse_count(category, token)?;
        }

        Ok(Self {
            total_gen: counts[0],
            total_hdu: counts[1],
            total_icu: counts[2],
            total_icu_vent: counts[3],
            total_allot: counts[4],
            filled_gen: counts[5],
            filled_hdu: counts[6],
            filled_icu: counts[7],
            filled_icu_vent: counts[8],
            filled_allot: counts[9],
            net_gen: counts[10],
            net_hdu: counts[11],
            net_icu: counts[12],
            net_icu_vent: counts[13],
            net_allot: counts[14],
        })
    }
}

impl From<&BedCounts> for BedSummary {
    // The allotted triad is deliberately absent from summaries.
    fn from(counts: &BedCounts) -> Self {
        Self {
            sum_total_gen: counts.total_gen,
            sum_total_hdu: counts.total_hdu,
            sum_total_icu: counts.total_icu,
            sum_total_icu_vent: counts.total_icu_vent,
            sum_filled_gen: counts.filled_gen,
            sum_filled_hdu: counts.filled_hdu,
            sum_filled_icu: counts.filled_icu,
            sum_filled_icu_vent: counts.filled_icu_vent,
            sum_net_gen: counts.net_gen,
            sum_net_hdu: counts.net_hdu,
            sum_net_icu: counts.net_icu,
            sum_net_icu_vent: counts.net_icu_vent,
        }
    }
}

/// One classified table row.
enum NormalizedRow {
    Summary(BedSummary),
    Facility(FacilityRecord),
}

/// Converts one section table into a normalized document.
///
/// Row 0 carries the category label, row 1 the column headers, row 2 is
/// a spacer; everything after that is either a facility row or a
/// category summary row. Any malformed row aborts the whole section.
pub fn normalize_table(table: ElementRef<'_>) -> Result<SectionDocument, ExtractError> {
    let rows: Vec<ElementRef> = table.select(&ROW_SELECTOR).collect();
    if rows.len() < 2 {
        return Err(ExtractError::MissingHeaderRows);
    }

    let category = sanitize(rows[0].text().collect::<String>().trim());
    let columns: Vec<String> = stripped_strings(rows[1])
        .iter()
        .map(|token| sanitize(token))
        .collect();

    tracing::debug!("Normalizing table for category '{}'", category);

    let mut records = Vec::new();
    let mut summary: Option<BedSummary> = None;
    let mut grand_total_beds = 0i64;
    let mut grand_occupied_beds = 0i64;
    let mut grand_available_beds = 0i64;

    for row in rows.iter().skip(3) {
        match normalize_row(&category, *row)? {
            // A later summary row replaces an earlier one wholesale.
            NormalizedRow::Summary(row_summary) => summary = Some(row_summary),
            NormalizedRow::Facility(record) => {
                grand_total_beds += record.total_allot;
                grand_occupied_beds += record.filled_allot;
                grand_available_beds += record.net_allot;
                records.push(record);
            }
        }
    }

    tracing::info!(
        "Category '{}': {} facility records, summary present: {}",
        category,
        records.len(),
        summary.is_some()
    );

    let hid = category_hash(&category);
    Ok(SectionDocument {
        category,
        columns,
        records,
        grand_total_beds,
        grand_occupied_beds,
        grand_available_beds,
        hid,
        summary,
    })
}

/// Classifies and converts a single candidate row.
fn normalize_row(category: &str, row: ElementRef<'_>) -> Result<NormalizedRow, ExtractError> {
    let tokens = stripped_strings(row);
    if tokens.len() < 2 {
        tracing::error!("category={}", category);
        tracing::error!("row too short to split, tokens: {:?}", tokens);
        return Err(ExtractError::RowShape {
            category: category.to_string(),
            expected: 2,
            got: tokens.len(),
            tokens,
        });
    }

    let snum = tokens[0].clone();
    let mut facility_type = tokens[1].clone();
    let mut beds: Vec<String> = tokens[2..].to_vec();

    // Irregular markup sometimes omits the facility-type cell, shifting
    // the first bed count into its place. Shift it back and leave the
    // type empty. Inherited heuristic: a facility whose real name is
    // purely numeric would be misread here.
    if NUMERIC_RE.is_match(&facility_type) {
        beds.insert(0, facility_type);
        facility_type = String::new();
    }

    beds.truncate(BED_FIELD_COUNT);

    // Some tables omit the trailing net_allot column; reconstruct it as
    // the sum of the four net counts.
    if beds.len() != BED_FIELD_COUNT {
        let start = beds.len().saturating_sub(4);
        let mut net_allot = 0i64;
        for token in &beds[start..] {
            net_allot += parse_count(category, token)?;
        }
        beds.push(net_allot.to_string());
    }

    let counts = BedCounts::from_tokens(category, &beds)?;

    // No usable serial number means this is the category subtotal row.
    if !NUMERIC_RE.is_match(&snum) {
        return Ok(NormalizedRow::Summary(BedSummary::from(&counts)));
    }

    Ok(NormalizedRow::Facility(facility_record(
        category,
        &snum,
        facility_type,
        &counts,
    )))
}

fn facility_record(
    category: &str,
    snum: &str,
    facility_type: String,
    counts: &BedCounts,
) -> FacilityRecord {
    FacilityRecord {
        snum: format!("{}_{}", category, snum),
        facility_type,
        total_gen: counts.total_gen,
        total_hdu: counts.total_hdu,
        total_icu: counts.total_icu,
        total_ice_vent: counts.total_icu_vent,
        total_allot: counts.total_allot,
        filled_gen: counts.filled_gen,
        filled_hdu: counts.filled_hdu,
        filled_icu: counts.filled_icu,
        filled_icu_vent: counts.filled_icu_vent,
        filled_allot: counts.filled_allot,
        net_gen: counts.net_gen,
        net_hdu: counts.net_hdu,
        net_icu: counts.net_icu,
        net_icu_vent: counts.net_icu_vent,
        net_allot: counts.net_allot,
        total_beds: counts.total_allot,
        total_occupied_beds: counts.filled_allot,
        total_available_beds: counts.net_allot,
    }
}

fn parse_count(category: &str, token: &str) -> Result<i64, ExtractError> {
    token.parse::<i64>().map_err(|_| ExtractError::NumericParse {
        category: category.to_string(),
        value: token.to_string(),
    })
}

/// Collects an element's text nodes, whitespace-trimmed, empties dropped.
fn stripped_strings(element: ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Strips literal parentheses; the page wraps qualifiers like "(BBMP)"
/// around labels that downstream keys must not contain.
fn sanitize(text: &str) -> String {
    text.replace(['(', ')'], "")
}

/// Stable hash of the category label, used together with the category as
/// the persistence dedup key. Deterministic for a given build but not
/// collision-free; the external contract accepts that weakness.
pub fn category_hash(category: &str) -> i64 {
    let mut hasher = DefaultHasher::new();
    category.hash(&mut hasher);
    hasher.finish() as i64
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn table_html(rows: &[Vec<&str>]) -> String {
        let mut html = String::from("<html><body><table>");
        for row in rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str("<td>");
                html.push_str(cell);
                html.push_str("</td>");
            }
            html.push_str("</tr>");
        }
        html.push_str("</table></body></html>");
        html
    }

    fn normalize(rows: &[Vec<&str>]) -> Result<SectionDocument, ExtractError> {
        let document = Html::parse_document(&table_html(rows));
        let selector = Selector::parse("table").unwrap();
        let table = document.select(&selector).next().unwrap();
        normalize_table(table)
    }

    fn header_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Government Hospitals (BBMP)"],
            vec!["Sl", "Hospital", "Gen", "HDU", "ICU", "ICU Ventl", "Total"],
            vec!["-"],
        ]
    }

    const BEDS_1_TO_15: [&str; 15] = [
        "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15",
    ];

    #[test]
    fn fifteen_token_row_round_trips_in_order() {
        let mut rows = header_rows();
        let mut data = vec!["1", "GenWard"];
        data.extend_from_slice(&BEDS_1_TO_15);
        rows.push(data);

        let doc = normalize(&rows).expect("normalize failed");
        assert_eq!(doc.records.len(), 1);

        let r = &doc.records[0];
        assert_eq!(r.snum, "Government Hospitals BBMP_1");
        assert_eq!(r.facility_type, "GenWard");
        let fields = [
            r.total_gen,
            r.total_hdu,
            r.total_icu,
            r.total_ice_vent,
            r.total_allot,
            r.filled_gen,
            r.filled_hdu,
            r.filled_icu,
            r.filled_icu_vent,
            r.filled_allot,
            r.net_gen,
            r.net_hdu,
            r.net_icu,
            r.net_icu_vent,
            r.net_allot,
        ];
        assert_eq!(fields, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        // Derived triad mirrors the allot columns.
        assert_eq!(r.total_beds, 5);
        assert_eq!(r.total_occupied_beds, 10);
        assert_eq!(r.total_available_beds, 15);
    }

    #[test]
    fn missing_net_allot_is_sum_of_last_four() {
        let mut rows = header_rows();
        let mut data = vec!["1", "GenWard"];
        data.extend_from_slice(&BEDS_1_TO_15[..14]);
        rows.push(data);

        let doc = normalize(&rows).expect("normalize failed");
        let r = &doc.records[0];
        // tokens[10..14] are 11, 12, 13, 14
        assert_eq!(r.net_allot, 11 + 12 + 13 + 14);
        assert_eq!(r.total_available_beds, 50);
    }

    #[test]
    fn numeric_facility_type_shifts_into_beds() {
        let mut shifted = header_rows();
        let mut data = vec!["1", "100"];
        data.extend_from_slice(&BEDS_1_TO_15[1..]);
        shifted.push(data);

        let doc = normalize(&shifted).expect("normalize failed");
        let r = &doc.records[0];
        assert_eq!(r.facility_type, "");
        assert_eq!(r.total_gen, 100);
        assert_eq!(r.total_hdu, 2);
        assert_eq!(r.net_allot, 15);
    }

    #[test]
    fn summary_row_feeds_summary_not_records() {
        let mut rows = header_rows();
        let mut summary_row = vec!["Total"];
        summary_row.extend_from_slice(&BEDS_1_TO_15);
        rows.push(summary_row);

        let doc = normalize(&rows).expect("normalize failed");
        assert!(doc.records.is_empty());
        assert_eq!(doc.grand_total_beds, 0);

        // "1" lands in the facility-type slot and is shifted back into
        // the bed counts by the numeric repair rule.
        let summary = doc.summary.expect("summary missing");
        assert_eq!(summary.sum_total_gen, 1);
        assert_eq!(summary.sum_total_icu_vent, 4);
        assert_eq!(summary.sum_filled_icu_vent, 9);
        assert_eq!(summary.sum_net_icu_vent, 14);
    }

    #[test]
    fn second_summary_row_overwrites_first() {
        let mut rows = header_rows();
        let mut first = vec!["Total"];
        first.extend_from_slice(&BEDS_1_TO_15);
        let second: Vec<&str> = std::iter::once("Grand Total")
            .chain(std::iter::repeat("7").take(15))
            .collect();
        rows.push(first);
        rows.push(second);

        let doc = normalize(&rows).expect("normalize failed");
        let summary = doc.summary.expect("summary missing");
        assert_eq!(summary.sum_total_gen, 7);
        assert_eq!(summary.sum_net_icu_vent, 7);
    }

    #[test]
    fn grand_totals_accumulate_allot_triad() {
        let mut rows = header_rows();
        for snum in ["1", "2", "3"] {
            let mut data = vec![snum, "GenWard"];
            data.extend_from_slice(&BEDS_1_TO_15);
            rows.push(data);
        }

        let doc = normalize(&rows).expect("normalize failed");
        assert_eq!(doc.records.len(), 3);
        assert_eq!(doc.grand_total_beds, 3 * 5);
        assert_eq!(doc.grand_occupied_beds, 3 * 10);
        assert_eq!(doc.grand_available_beds, 3 * 15);
    }

    #[test]
    fn short_bed_list_is_fatal() {
        let mut rows = header_rows();
        rows.push(vec!["1", "GenWard", "10", "2", "3", "1", "16"]);

        let err = normalize(&rows).unwrap_err();
        match err {
            ExtractError::RowShape { category, expected, got, .. } => {
                assert_eq!(category, "Government Hospitals BBMP");
                assert_eq!(expected, BED_FIELD_COUNT);
                // 5 bed tokens plus the reconstructed net_allot
                assert_eq!(got, 6);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn non_numeric_bed_count_is_fatal() {
        let mut rows = header_rows();
        let mut data = vec!["1", "GenWard"];
        data.extend_from_slice(&BEDS_1_TO_15[..14]);
        data[6] = "N/A";
        rows.push(data);

        let err = normalize(&rows).unwrap_err();
        match err {
            ExtractError::NumericParse { value, .. } => assert_eq!(value, "N/A"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn truncates_extra_bed_columns() {
        let mut rows = header_rows();
        let mut data = vec!["1", "GenWard"];
        data.extend_from_slice(&BEDS_1_TO_15);
        data.extend_from_slice(&["99", "98", "97"]);
        rows.push(data);

        let doc = normalize(&rows).expect("normalize failed");
        assert_eq!(doc.records[0].net_allot, 15);
    }

    #[test]
    fn category_and_columns_are_sanitized() {
        let mut rows = header_rows();
        rows[1][1] = "Hospital (name)";
        let mut data = vec!["1", "GenWard"];
        data.extend_from_slice(&BEDS_1_TO_15);
        rows.push(data);

        let doc = normalize(&rows).expect("normalize failed");
        assert_eq!(doc.category, "Government Hospitals BBMP");
        assert_eq!(doc.columns[1], "Hospital name");
    }

    #[test]
    fn records_round_trip_through_json() {
        let mut rows = header_rows();
        for snum in ["1", "2"] {
            let mut data = vec![snum, "GenWard"];
            data.extend_from_slice(&BEDS_1_TO_15);
            rows.push(data);
        }

        let doc = normalize(&rows).expect("normalize failed");
        let json = serde_json::to_string(&doc.records).expect("serialize failed");
        let parsed: Vec<FacilityRecord> = serde_json::from_str(&json).expect("parse failed");
        assert_eq!(parsed, doc.records);
    }

    #[test]
    fn hid_matches_category_hash() {
        let mut rows = header_rows();
        let mut data = vec!["1", "GenWard"];
        data.extend_from_slice(&BEDS_1_TO_15);
        rows.push(data);

        let doc = normalize(&rows).expect("normalize failed");
        assert_eq!(doc.hid, category_hash("Government Hospitals BBMP"));
        assert_eq!(category_hash("x"), category_hash("x"));
        assert_ne!(category_hash("x"), category_hash("y"));
    }

    #[test]
    fn table_with_only_header_rows_yields_empty_section() {
        let doc = normalize(&header_rows()).expect("normalize failed");
        assert!(doc.records.is_empty());
        assert!(doc.summary.is_none());
        assert_eq!(doc.grand_total_beds, 0);
        assert_eq!(doc.columns.len(), 7);
    }
}
