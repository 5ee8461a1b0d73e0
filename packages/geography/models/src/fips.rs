//! US state lookup table.
//!
//! Maps between two-letter postal abbreviations, two-digit FIPS codes, and
//! full state names for the 50 US states + DC.

/// One entry of the state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInfo {
    /// Two-letter postal abbreviation (e.g. `"CA"`).
    pub abbr: &'static str,
    /// Two-digit FIPS code (e.g. `"06"`).
    pub fips: &'static str,
    /// Full name (e.g. `"California"`).
    pub name: &'static str,
}

const fn state(abbr: &'static str, fips: &'static str, name: &'static str) -> StateInfo {
    StateInfo { abbr, fips, name }
}

/// The 50 US states + DC.
pub const STATES: &[StateInfo] = &[
    state("AL", "01", "Alabama"),
    state("AK", "02", "Alaska"),
    state("AZ", "04", "Arizona"),
    state("AR", "05", "Arkansas"),
    state("CA", "06", "California"),
    state("CO", "08", "Colorado"),
    state("CT", "09", "Connecticut"),
    state("DE", "10", "Delaware"),
    state("DC", "11", "District of Columbia"),
    state("FL", "12", "Florida"),
    state("GA", "13", "Georgia"),
    state("HI", "15", "Hawaii"),
    state("ID", "16", "Idaho"),
    state("IL", "17", "Illinois"),
    state("IN", "18", "Indiana"),
    state("IA", "19", "Iowa"),
    state("KS", "20", "Kansas"),
    state("KY", "21", "Kentucky"),
    state("LA", "22", "Louisiana"),
    state("ME", "23", "Maine"),
    state("MD", "24", "Maryland"),
    state("MA", "25", "Massachusetts"),
    state("MI", "26", "Michigan"),
    state("MN", "27", "Minnesota"),
    state("MS", "28", "Mississippi"),
    state("MO", "29", "Missouri"),
    state("MT", "30", "Montana"),
    state("NE", "31", "Nebraska"),
    state("NV", "32", "Nevada"),
    state("NH", "33", "New Hampshire"),
    state("NJ", "34", "New Jersey"),
    state("NM", "35", "New Mexico"),
    state("NY", "36", "New York"),
    state("NC", "37", "North Carolina"),
    state("ND", "38", "North Dakota"),
    state("OH", "39", "Ohio"),
    state("OK", "40", "Oklahoma"),
    state("OR", "41", "Oregon"),
    state("PA", "42", "Pennsylvania"),
    state("RI", "44", "Rhode Island"),
    state("SC", "45", "South Carolina"),
    state("SD", "46", "South Dakota"),
    state("TN", "47", "Tennessee"),
    state("TX", "48", "Texas"),
    state("UT", "49", "Utah"),
    state("VT", "50", "Vermont"),
    state("VA", "51", "Virginia"),
    state("WA", "53", "Washington"),
    state("WV", "54", "West Virginia"),
    state("WI", "55", "Wisconsin"),
    state("WY", "56", "Wyoming"),
];

/// Puerto Rico appears in county boundary files but not in [`STATES`].
pub const PUERTO_RICO: StateInfo = state("PR", "72", "Puerto Rico");

/// FIPS codes excluded from the contiguous-US map view.
const NON_CONTIGUOUS_FIPS: &[&str] = &["02", "15", "72"];

/// Maps a two-letter abbreviation to the full state name.
///
/// Matching is exact (`"ca"` is not recognized). Returns `None` for
/// unrecognized codes.
#[must_use]
pub fn full_name(abbr: &str) -> Option<&'static str> {
    STATES.iter().find(|s| s.abbr == abbr).map(|s| s.name)
}

/// Maps a full state name to its FIPS code, ignoring case and surrounding
/// whitespace. Puerto Rico is recognized.
#[must_use]
pub fn fips_for_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    STATES
        .iter()
        .chain(std::iter::once(&PUERTO_RICO))
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .map(|s| s.fips)
}

/// Returns whether a FIPS code belongs to the contiguous United States
/// (plus DC).
#[must_use]
pub fn is_contiguous(fips: &str) -> bool {
    !NON_CONTIGUOUS_FIPS.contains(&fips)
}
