// src/utils/html_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::utils::error::AppError;

/// Saves a copy of the page with byte-range highlights wrapped in spans.
pub fn save_debug_html(
    html: &str,
    filename: &str,
    highlights: &[(usize, usize, &str)],
) -> Result<(), AppError> {
    let path = Path::new(filename);
    let mut file = File::create(path)?;

    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-section { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-table { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0);

    let mut last_pos = 0;
    for (start, end, highlight_type) in sorted_highlights {
        if start < last_pos {
            continue; // Overlapping match, already covered
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "section" => "highlight-section",
            "table" => "highlight-table",
            _ => "highlight-custom",
        };

        debug_html.push_str(&format!(
            "<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type
        ));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }

    if last_pos < html.len() {
        debug_html.push_str(&html[last_pos..]);
    }
    debug_html.push_str("\n</body>\n</html>");

    file.write_all(debug_html.as_bytes())?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Creates a debug copy of the page with matches of the given regex
/// patterns highlighted, so missing section containers can be spotted
/// quickly when the page layout shifts.
pub fn create_debug_html(
    html: &str,
    filename: &str,
    patterns: &[(&str, &str)],
) -> Result<(), AppError> {
    use regex::Regex;

    let mut highlights = Vec::new();

    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern)
            .map_err(|e| AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e)))?;

        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }

    save_debug_html(html, filename, &highlights)
}
