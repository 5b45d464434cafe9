//! Parser for the LCOV `.info` format.
//!
//! Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
//!
//! Key records:
//!   TN:<test name>
//!   SF:<path to source file>
//!   FN:<line>,<function name>
//!   FNDA:<execution count>,<function name>
//!   FNF:<number of functions found>
//!   FNH:<number of functions hit>
//!   DA:<line number>,<execution count>
//!   BRDA:<line>,<block>,<branch>,<taken>   ("-" means 0)
//!   BRF:<branches found>
//!   BRH:<branches hit>
//!   LF:<lines found>
//!   LH:<lines hit>
//!   end_of_record
use std::path::Path;

use crate::error::{CovpostError, Result};
use crate::model::{BranchDetail, CoverageRecord, FunctionDetail, LineDetail, Tally};

/// Parse an LCOV report from a file on disk. Existence checks belong to
/// the caller; a missing file surfaces as an I/O error here.
pub fn parse_file(path: &Path) -> Result<Vec<CoverageRecord>> {
    let input = std::fs::read_to_string(path)?;
    parse(&input)
}

/// Parse LCOV text into per-file coverage records, one per
/// `end_of_record`, in file order.
///
/// The fold threads a single accumulator through the lines; each
/// `end_of_record` pushes it onto the result and resets it. An input that
/// produces zero complete records is a parse error.
pub fn parse(input: &str) -> Result<Vec<CoverageRecord>> {
    let mut records = Vec::new();
    let mut current = CoverageRecord::default();

    for raw_line in input.split('\n') {
        let line = raw_line.trim();

        if let Some((tag, value)) = line.split_once(':') {
            handle_tag(&mut current, tag, value);
        }

        if line.contains("end_of_record") {
            records.push(std::mem::take(&mut current));
        }
    }

    if records.is_empty() {
        return Err(CovpostError::Parse(clip(input)));
    }
    Ok(records)
}

/// Total line coverage across all records as a percentage. Returns NaN
/// when no lines were found anywhere; callers must handle that.
#[must_use]
pub fn percentage(records: &[CoverageRecord]) -> f64 {
    let mut total = Tally::default();
    for record in records {
        total.hit += record.lines.hit;
        total.found += record.lines.found;
    }
    total.percent()
}

fn handle_tag(record: &mut CoverageRecord, tag: &str, value: &str) {
    match tag.to_ascii_uppercase().as_str() {
        "TN" => record.title = Some(value.trim().to_string()),
        // The path may itself contain colons (Windows drive letters);
        // split_once already left them intact in `value`.
        "SF" => record.file = value.trim().to_string(),
        "FNF" => set_count(&mut record.functions.found, value),
        "FNH" => set_count(&mut record.functions.hit, value),
        "LF" => set_count(&mut record.lines.found, value),
        "LH" => set_count(&mut record.lines.hit, value),
        "BRF" => set_count(&mut record.branches.found, value),
        "BRH" => set_count(&mut record.branches.hit, value),
        "DA" => {
            // DA:<line>,<execution count>[,<checksum>]
            let mut parts = value.splitn(3, ',');
            if let (Some(line), Some(hit)) = (parts.next(), parts.next()) {
                if let (Ok(line), Ok(hit)) = (line.trim().parse(), hit.trim().parse()) {
                    record.lines.details.push(LineDetail { line, hit });
                }
            }
        }
        "FN" => {
            // FN:<line>,<function name>
            if let Some((line, name)) = value.split_once(',') {
                if let Ok(line) = line.trim().parse() {
                    record.functions.details.push(FunctionDetail {
                        name: name.to_string(),
                        line,
                        hit: None,
                    });
                }
            }
        }
        "FNDA" => {
            // FNDA:<execution count>,<function name>
            // Binds to the first still-unbound FN entry with the same
            // name; silently dropped when no such entry exists.
            if let Some((hit, name)) = value.split_once(',') {
                if let Ok(hit) = hit.trim().parse() {
                    if let Some(entry) = record
                        .functions
                        .details
                        .iter_mut()
                        .find(|f| f.name == name && f.hit.is_none())
                    {
                        entry.hit = Some(hit);
                    }
                }
            }
        }
        "BRDA" => {
            // BRDA:<line>,<block>,<branch>,<taken>  ("-" means 0)
            let parts: Vec<&str> = value.splitn(4, ',').collect();
            if parts.len() == 4 {
                if let (Ok(line), Ok(block), Ok(branch)) = (
                    parts[0].trim().parse(),
                    parts[1].trim().parse(),
                    parts[2].trim().parse(),
                ) {
                    let taken = if parts[3].trim() == "-" {
                        0
                    } else {
                        parts[3].trim().parse().unwrap_or(0)
                    };
                    record.branches.details.push(BranchDetail {
                        line,
                        block,
                        branch,
                        taken,
                    });
                }
            }
        }
        // Unknown tags are ignored for format forward-compatibility.
        _ => {}
    }
}

fn set_count(slot: &mut u64, value: &str) {
    if let Ok(count) = value.trim().parse() {
        *slot = count;
    }
}

/// Head of the unparsed input, for the error message.
fn clip(input: &str) -> String {
    const MAX: usize = 120;
    let head: String = input.chars().take(MAX).collect();
    if input.chars().count() > MAX {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_records() {
        let input = "\
TN:unit
SF:src/lib.rs
FN:1,main
FNDA:5,main
FNF:1
FNH:1
DA:1,5
DA:2,0
LF:2
LH:1
BRDA:1,0,0,5
BRDA:1,0,1,-
BRF:2
BRH:1
end_of_record
SF:src/util.rs
DA:1,2
LF:1
LH:1
end_of_record
";
        let records = parse(input).unwrap();
        assert_eq!(records.len(), 2);

        let lib = &records[0];
        assert_eq!(lib.title.as_deref(), Some("unit"));
        assert_eq!(lib.file, "src/lib.rs");
        assert_eq!(lib.lines.found, 2);
        assert_eq!(lib.lines.hit, 1);
        assert_eq!(lib.lines.details.len(), 2);
        assert_eq!(lib.lines.details[0], LineDetail { line: 1, hit: 5 });
        assert_eq!(lib.functions.details.len(), 1);
        assert_eq!(lib.functions.details[0].hit, Some(5));
        assert_eq!(lib.branches.details.len(), 2);
        assert_eq!(lib.branches.details[1].taken, 0);

        let util = &records[1];
        assert_eq!(util.file, "src/util.rs");
        assert_eq!(util.title, None);
        assert_eq!(util.branches.details.len(), 0);
    }

    #[test]
    fn test_fnda_binds_first_unbound_entry() {
        let input = "\
SF:src/a.rs
FN:1,render
FN:10,render
FNDA:3,render
FNDA:7,render
end_of_record
";
        let records = parse(input).unwrap();
        let functions = &records[0].functions.details;
        assert_eq!(functions[0].hit, Some(3));
        assert_eq!(functions[1].hit, Some(7));
    }

    #[test]
    fn test_fnda_without_declaration_is_dropped() {
        let input = "SF:src/a.rs\nFNDA:3,ghost\nend_of_record\n";
        let records = parse(input).unwrap();
        assert!(records[0].functions.details.is_empty());
    }

    #[test]
    fn test_brda_dash_means_zero() {
        let input = "SF:src/a.rs\nBRDA:4,0,1,-\nend_of_record\n";
        let records = parse(input).unwrap();
        let branch = &records[0].branches.details[0];
        assert_eq!(branch.line, 4);
        assert_eq!(branch.block, 0);
        assert_eq!(branch.branch, 1);
        assert_eq!(branch.taken, 0);
    }

    #[test]
    fn test_sf_path_with_colons() {
        let input = "SF:C:\\work\\src\\a.rs\nDA:1,1\nend_of_record\n";
        let records = parse(input).unwrap();
        assert_eq!(records[0].file, "C:\\work\\src\\a.rs");
    }

    #[test]
    fn test_unknown_tags_and_blank_lines_ignored() {
        let input = "\
SF:src/a.rs

VER:something
DA:1,1
end_of_record
";
        let records = parse(input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].lines.details.len(), 1);
    }

    #[test]
    fn test_zero_records_is_an_error() {
        let err = parse("TN:only-a-title\n").unwrap_err();
        assert!(err.to_string().contains("only-a-title"));
    }

    #[test]
    fn test_percentage() {
        let input = "\
SF:src/a.rs
LF:5
LH:3
end_of_record
SF:src/b.rs
LF:2
LH:2
end_of_record
";
        let records = parse(input).unwrap();
        let pct = percentage(&records);
        assert!((pct - 500.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_no_lines_is_nan() {
        let input = "SF:src/a.rs\nend_of_record\n";
        let records = parse(input).unwrap();
        assert!(percentage(&records).is_nan());
    }

    #[test]
    fn test_counters_trusted_over_details() {
        // LF/LH disagree with the DA entries on purpose; the summary
        // counters win.
        let input = "SF:src/a.rs\nDA:1,0\nLF:10\nLH:9\nend_of_record\n";
        let records = parse(input).unwrap();
        assert_eq!(records[0].lines.found, 10);
        assert_eq!(records[0].lines.hit, 9);
        assert_eq!(records[0].lines.details.len(), 1);
    }
}
