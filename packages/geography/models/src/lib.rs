#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! US state tables, county keys, and population record types.
//!
//! These types describe the county-level geography shared by the incident
//! and population datasets: the join key both sides are normalized to, the
//! shape of the population spreadsheet extract, and the typed results of
//! sniffing each dataset's format.

pub mod fips;

use serde::{Deserialize, Serialize};

/// Label of the per-bracket decade change column in the population extract.
pub const DECADE_CHANGE_LABEL: &str = "Change, 2010 to 2020";

/// How many columns to the right of an age-bracket column are searched for
/// its [`DECADE_CHANGE_LABEL`] column.
pub const CHANGE_SEARCH_WINDOW: usize = 10;

/// Index of the first data row in a population extract. Rows before it are
/// labels and captions.
pub const POPULATION_DATA_START: usize = 2;

/// A row that carries a state column.
///
/// Implemented by every table the state normalizer runs over.
pub trait StateLabeled {
    fn state(&self) -> &str;
    fn set_state(&mut self, state: String);
}

/// Normalized `(state, county)` identity used to group and join.
///
/// Both parts are trimmed and uppercased, and the county has its trailing
/// `" County"` suffix removed. Two counties are the same iff their keys are
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountyKey {
    pub state: String,
    pub county: String,
}

impl std::fmt::Display for CountyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.county, self.state)
    }
}

/// Age brackets summed into the driving-age population.
///
/// The brackets start at 18, so the "16+" total is really 18+. The source
/// extract has no 16-17 bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    From18To24,
    From25To34,
    From35To44,
    From45To64,
    From65To84,
    From85To99,
    From100Up,
}

impl AgeBracket {
    pub const ALL: &[Self] = &[
        Self::From18To24,
        Self::From25To34,
        Self::From35To44,
        Self::From45To64,
        Self::From65To84,
        Self::From85To99,
        Self::From100Up,
    ];

    /// The literal column label used by the population extract.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::From18To24 => "18 to 24 years",
            Self::From25To34 => "25 to 34 years",
            Self::From35To44 => "35 to 44 years",
            Self::From45To64 => "45 to 64 years",
            Self::From65To84 => "65 to 84 years",
            Self::From85To99 => "85 to 99 years",
            Self::From100Up => "100 years and over",
        }
    }
}

/// A spreadsheet-shaped population extract as loaded from disk.
///
/// `columns` are the file's own column labels. `rows[0]` holds the
/// authoritative labels (State, County, repeated change labels), `rows[1]`
/// is a caption row, and data starts at [`POPULATION_DATA_START`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationSheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PopulationSheet {
    /// Returns the trimmed cell at `(row, column)`, or `None` if the row is
    /// short or the cell is empty.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(column)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }
}

/// Column position of one age bracket and its decade change column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketColumn {
    pub bracket: AgeBracket,
    pub column: usize,
    pub change_column: Option<usize>,
}

/// Resolved column layout of a population extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationLayout {
    pub state_column: usize,
    pub county_column: usize,
    /// Matched brackets, in [`AgeBracket::ALL`] order. Brackets whose label
    /// was not found are absent.
    pub brackets: Vec<BracketColumn>,
}

/// Outcome of sniffing a population extract's header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaSniff {
    Resolved(PopulationLayout),
    /// A required label was not found.
    Unresolved {
        missing: Vec<String>,
    },
}

/// Population totals for one county.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationRecord {
    pub state: String,
    pub county: String,
    /// Sum of all age-bracket populations (18+, see [`AgeBracket`]).
    pub people_16_plus: f64,
    /// Sum of the per-bracket change over the 2010-2020 decade. Zero when
    /// the extract has no change columns.
    pub decade_population_change: f64,
}

impl StateLabeled for PopulationRecord {
    fn state(&self) -> &str {
        &self.state
    }

    fn set_state(&mut self, state: String) {
        self.state = state;
    }
}

impl PopulationRecord {
    /// Linear projection one decade forward, clipped at zero.
    #[must_use]
    pub fn projected_population(&self) -> f64 {
        (self.people_16_plus + self.decade_population_change).max(0.0)
    }
}

/// Result of building the population table.
#[derive(Debug, Clone, PartialEq)]
pub enum PopulationBuild {
    Built(Vec<PopulationRecord>),
    /// The extract's header could not be interpreted. Downstream fusion
    /// treats this as "no population data available".
    Unresolved { missing: Vec<String> },
}

impl PopulationBuild {
    /// The built records, or an empty slice when unresolved.
    #[must_use]
    pub fn records(&self) -> &[PopulationRecord] {
        match self {
            Self::Built(records) => records,
            Self::Unresolved { .. } => &[],
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Built(_))
    }
}

/// How a table writes its state column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateFormat {
    /// Two-letter codes (`"CA"`).
    Abbreviated,
    /// Full names (`"California"`).
    FullName,
}

/// Outcome of sniffing a table's state column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "format", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateSniff {
    Detected(StateFormat),
    /// No non-empty state value to sample.
    Unresolved,
}
