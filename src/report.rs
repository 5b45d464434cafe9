//! HTML report rendering: the per-file coverage table and the comment
//! bodies posted to GitHub, with and without a baseline to diff against.

use std::collections::BTreeMap;

use crate::html::{element, element_text, fragment};
use crate::lcov;
use crate::model::{CoverageRecord, Tally};
use crate::ranges;

/// Read-only rendering inputs resolved from the CI context and CLI flags.
/// The renderer never mutates these.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Repository full name, e.g. `owner/repo`.
    pub repository: String,
    /// Head commit SHA used for file links.
    pub commit: String,
    /// Workspace path prefix stripped from LCOV paths.
    pub prefix: String,
    /// Directory the coverage run executed in, joined into file links.
    pub working_dir: String,
    /// Head branch name (pull requests only).
    pub head: Option<String>,
    /// Base branch name (pull requests only).
    pub base: Option<String>,
    /// Optional heading shown above the report.
    pub title: Option<String>,
    /// Restrict the table to `changed_files`.
    pub should_filter_changed_files: bool,
    /// Paths changed between the base and head commits.
    pub changed_files: Vec<String>,
}

/// Convert backslash path separators to forward slashes.
#[must_use]
pub fn normalise_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Render the comment body, comparing against a baseline run when one is
/// available. Returns the body and the signed percentage-point change.
#[must_use]
pub fn diff(
    records: &[CoverageRecord],
    baseline: Option<&[CoverageRecord]>,
    options: &Options,
) -> (String, f64) {
    let baseline = match baseline {
        Some(baseline) => baseline,
        None => return (comment(records, options), 0.0),
    };

    let pbefore = lcov::percentage(baseline);
    let pafter = lcov::percentage(records);
    let coverage_diff = pafter - pbefore;

    let plus = if coverage_diff > 0.0 { "+" } else { "" };
    let arrow = if coverage_diff == 0.0 {
        ""
    } else if coverage_diff < 0.0 {
        "▾"
    } else {
        "▴"
    };

    let summary_row = element_text(
        "tr",
        &[
            element_text("th", &[format!("{pafter:.2}"), "%".to_string()]),
            element_text(
                "th",
                &[
                    arrow.to_string(),
                    " ".to_string(),
                    plus.to_string(),
                    format!("{coverage_diff:.2}"),
                    "%".to_string(),
                ],
            ),
        ],
    );

    let body = fragment(&[
        heading(options),
        context_sentence(options),
        element_text("table", &[element_text("tbody", &[summary_row])]),
        "\n\n".to_string(),
        details_section(records, options),
    ]);

    (body, coverage_diff)
}

/// Render the full comment body for one coverage run (no baseline).
#[must_use]
pub fn comment(records: &[CoverageRecord], options: &Options) -> String {
    let summary_row = element_text(
        "tr",
        &[element_text(
            "th",
            &[format!("{:.2}", lcov::percentage(records)), "%".to_string()],
        )],
    );

    fragment(&[
        heading(options),
        context_sentence(options),
        element_text("table", &[element_text("tbody", &[summary_row])]),
        "\n\n".to_string(),
        details_section(records, options),
    ])
}

/// Render the per-file coverage table, grouped by folder.
#[must_use]
pub fn tabulate(records: &[CoverageRecord], options: &Options) -> String {
    let header = element_text(
        "tr",
        &["File", "Stmts", "Branches", "Funcs", "Lines", "Uncovered Lines"]
            .iter()
            .map(|label| element_text("th", &[(*label).to_string()]))
            .collect::<Vec<_>>(),
    );

    let mut folders: BTreeMap<String, Vec<CoverageRecord>> = BTreeMap::new();
    for record in records {
        let file = normalise_path(&record.file);
        if !should_be_included(&file, options) {
            continue;
        }
        let relative = file.replacen(&options.prefix, "", 1);
        let folder = match relative.rsplit_once('/') {
            Some((folder, _)) => folder.to_string(),
            None => String::new(),
        };
        let mut record = record.clone();
        record.file = file;
        folders.entry(folder).or_default().push(record);
    }

    let mut rows = vec![header];
    for (folder, files) in &folders {
        let indent = !folder.is_empty();
        if indent {
            rows.push(folder_row(folder));
        }
        rows.extend(files.iter().map(|file| file_row(file, indent, options)));
    }

    element_text("table", &[element_text("tbody", &rows)])
}

fn heading(options: &Options) -> String {
    match &options.title {
        Some(title) => element_text("h2", &[title.clone()]),
        None => String::new(),
    }
}

fn context_sentence(options: &Options) -> String {
    match &options.base {
        Some(base) => {
            let head = options.head.clone().unwrap_or_default();
            format!(
                "Coverage after merging {} into {} will be",
                element_text("b", &[head]),
                element_text("b", &[base.clone()]),
            )
        }
        None => "Coverage for this commit".to_string(),
    }
}

fn details_section(records: &[CoverageRecord], options: &Options) -> String {
    let label = if options.should_filter_changed_files {
        "Coverage Report for Changed Files"
    } else {
        "Coverage Report"
    };
    element_text(
        "details",
        &[
            element_text("summary", &[label.to_string()]),
            tabulate(records, options),
        ],
    )
}

fn should_be_included(file: &str, options: &Options) -> bool {
    if !options.should_filter_changed_files {
        return true;
    }
    let relative = file.replacen(&options.prefix, "", 1);
    options.changed_files.iter().any(|changed| *changed == relative)
}

fn folder_row(folder: &str) -> String {
    element_text(
        "tr",
        &[element(
            "td",
            &[("colspan", "6")],
            &[element_text("b", &[folder.to_string()])],
        )],
    )
}

fn file_row(record: &CoverageRecord, indent: bool, options: &Options) -> String {
    let link = file_link(options, &record.file);
    let space = if indent { "&nbsp; &nbsp;" } else { "" };
    let name_cell = fragment(&[
        space.to_string(),
        element("a", &[("href", link.href.as_str())], &[link.filename.clone()]),
    ]);

    element_text(
        "tr",
        &[
            element_text("td", &[name_cell]),
            element_text("td", &[percentage_cell(record.statement_totals())]),
            element_text("td", &[percentage_cell(record.branches.tally())]),
            element_text("td", &[percentage_cell(record.functions.tally())]),
            element_text("td", &[percentage_cell(record.lines.tally())]),
            element_text("td", &[uncovered_cell(record, options)]),
        ],
    )
}

/// Comma-joined links to the file's uncovered ranges: branch arms never
/// taken plus lines never hit, merged into one range set.
fn uncovered_cell(record: &CoverageRecord, options: &Options) -> String {
    let mut lines: Vec<u32> = record
        .branches
        .details
        .iter()
        .filter(|branch| branch.taken == 0)
        .map(|branch| branch.line)
        .collect();
    lines.extend(
        record
            .lines
            .details
            .iter()
            .filter(|line| line.hit == 0)
            .map(|line| line.line),
    );

    let link = file_link(options, &record.file);
    ranges::compress(lines)
        .iter()
        .map(|range| {
            let href = format!("{}#{}", link.href, range.anchor());
            element("a", &[("href", href.as_str())], &[range.label()])
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// A table cell percentage: `found == 0` counts as a perfect 100, the
/// value is formatted to at most 2 decimals, and bolded unless exactly
/// 100.
fn percentage_cell(tally: Tally) -> String {
    let value = if tally.found == 0 {
        100.0
    } else {
        tally.percent()
    };
    let text = format!("{}%", format_percentage(value));
    if value == 100.0 {
        text
    } else {
        element_text("b", &[text])
    }
}

/// Round to two decimals and drop trailing fractional zeros:
/// `100.00` renders `100`, `90.10` renders `90.1`, `83.333` renders
/// `83.33`.
#[must_use]
pub fn format_percentage(value: f64) -> String {
    let rounded = format!("{value:.2}");
    rounded.trim_end_matches('0').trim_end_matches('.').to_string()
}

struct FileLink {
    href: String,
    filename: String,
}

/// Hyperlink target for one file at the configured repository, commit and
/// working directory.
fn file_link(options: &Options, file: &str) -> FileLink {
    let relative = file.replacen(&options.prefix, "", 1);
    let filename = relative
        .rsplit('/')
        .next()
        .unwrap_or(relative.as_str())
        .to_string();
    let url = join_url(&[
        &options.repository,
        "blob",
        &options.commit,
        &options.working_dir,
        &relative,
    ]);
    FileLink {
        href: format!("https://github.com/{url}"),
        filename,
    }
}

/// Join URL segments with single slashes, dropping empty and `.` parts
/// (so a working directory of `./` vanishes from the link).
fn join_url(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
