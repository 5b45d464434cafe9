//! Uniform in-memory representation of one parsed LCOV run. The parser
//! produces an ordered sequence of `CoverageRecord`s which the renderer
//! consumes directly; nothing here is persisted.

/// A single instrumentable line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDetail {
    pub line: u32,
    pub hit: u64,
}

/// A function declared via `FN`. The hit count stays unset until a later
/// `FNDA` record with a matching name binds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDetail {
    pub name: String,
    pub line: u32,
    pub hit: Option<u64>,
}

/// A single branch arm on a given line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDetail {
    pub line: u32,
    pub block: u32,
    pub branch: u32,
    pub taken: u64,
}

/// Found/hit counters for one metric plus its detail entries.
///
/// The counters come from the format's own summary tags (`LF`/`LH` etc.)
/// and are trusted as given, never recomputed from `details`.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary<T> {
    pub found: u64,
    pub hit: u64,
    pub details: Vec<T>,
}

// Not derived: the derive would bound `T: Default`.
impl<T> Default for Summary<T> {
    fn default() -> Self {
        Self {
            found: 0,
            hit: 0,
            details: Vec::new(),
        }
    }
}

impl<T> Summary<T> {
    #[must_use]
    pub fn tally(&self) -> Tally {
        Tally {
            hit: self.hit,
            found: self.found,
        }
    }
}

pub type LineSummary = Summary<LineDetail>;
pub type FunctionSummary = Summary<FunctionDetail>;
pub type BranchSummary = Summary<BranchDetail>;

/// Plain hit/found counter pair used for roll-ups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub hit: u64,
    pub found: u64,
}

impl Tally {
    /// Coverage ratio as a percentage. A zero `found` yields NaN.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.hit as f64 / self.found as f64 * 100.0
    }
}

/// Coverage data for a single source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageRecord {
    /// Test-session name (from `TN`).
    pub title: Option<String>,
    /// Source file path (from `SF`), unique within one parse result.
    pub file: String,
    pub lines: LineSummary,
    pub functions: FunctionSummary,
    pub branches: BranchSummary,
}

impl CoverageRecord {
    /// Blended hit/found across branches, functions and lines: the
    /// "statements" column, distinct from the line-only percentage.
    #[must_use]
    pub fn statement_totals(&self) -> Tally {
        Tally {
            hit: self.branches.hit + self.functions.hit + self.lines.hit,
            found: self.branches.found + self.functions.found + self.lines.found,
        }
    }
}
