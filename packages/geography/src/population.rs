//! Population extract schema sniffing and per-county aggregation.
//!
//! The census age-group extract is not a clean table. The file's own
//! column labels name the age brackets, while the first data row carries
//! the `State`/`County` labels and a repeated `"Change, 2010 to 2020"`
//! label beside each bracket. Real data starts two rows in.

use std::collections::BTreeMap;

use accident_risk_geography_models::{
    AgeBracket, BracketColumn, CHANGE_SEARCH_WINDOW, DECADE_CHANGE_LABEL, POPULATION_DATA_START,
    PopulationBuild, PopulationLayout, PopulationRecord, PopulationSheet, SchemaSniff,
};

const STATE_LABEL: &str = "State";
const COUNTY_LABEL: &str = "County";

/// Placeholder strings treated as missing place names.
const NULL_MARKERS: &[&str] = &["nan", "null"];

/// Locates the state, county, age-bracket and change columns.
///
/// State and county are looked up in the label row (`rows[0]`). Each age
/// bracket matches the first column whose file label or label-row cell
/// equals the bracket's label; brackets that are not found are skipped.
/// A bracket's change column is the first cell labelled
/// [`DECADE_CHANGE_LABEL`] within [`CHANGE_SEARCH_WINDOW`] columns starting
/// at the bracket itself.
#[must_use]
pub fn sniff_population_schema(sheet: &PopulationSheet) -> SchemaSniff {
    let label_row: &[String] = sheet.rows.first().map(Vec::as_slice).unwrap_or_default();
    let find_label = |label: &str| label_row.iter().position(|cell| cell.trim() == label);

    let state_column = find_label(STATE_LABEL);
    let county_column = find_label(COUNTY_LABEL);

    let (Some(state_column), Some(county_column)) = (state_column, county_column) else {
        let missing = [(STATE_LABEL, state_column), (COUNTY_LABEL, county_column)]
            .into_iter()
            .filter(|(_, found)| found.is_none())
            .map(|(label, _)| label.to_string())
            .collect();
        return SchemaSniff::Unresolved { missing };
    };

    let width = sheet.columns.len().max(label_row.len());
    let brackets = AgeBracket::ALL
        .iter()
        .filter_map(|&bracket| {
            let column = (0..width).find(|&i| {
                sheet.columns.get(i).is_some_and(|c| c.trim() == bracket.label())
                    || label_row.get(i).is_some_and(|c| c.trim() == bracket.label())
            })?;
            let change_column = (column..column + CHANGE_SEARCH_WINDOW)
                .find(|&i| label_row.get(i).is_some_and(|c| c.trim() == DECADE_CHANGE_LABEL));

            log::debug!("Found '{}' at column {column}", bracket.label());
            Some(BracketColumn {
                bracket,
                column,
                change_column,
            })
        })
        .collect();

    SchemaSniff::Resolved(PopulationLayout {
        state_column,
        county_column,
        brackets,
    })
}

/// Parses a population cell, ignoring thousands separators.
///
/// Missing and non-numeric cells read as zero.
fn population_value(cell: Option<&str>) -> f64 {
    cell.map(|c| c.replace(',', ""))
        .and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || NULL_MARKERS.iter().any(|m| value.eq_ignore_ascii_case(m))
}

/// Builds one population row per `(state, county)`.
///
/// Rows sharing a `(state, county)` pair are summed. Rows without a state
/// or county are skipped, and counties whose total driving-age population
/// is not positive are dropped.
#[must_use]
pub fn build_population_table(sheet: &PopulationSheet) -> PopulationBuild {
    let layout = match sniff_population_schema(sheet) {
        SchemaSniff::Resolved(layout) => layout,
        SchemaSniff::Unresolved { missing } => {
            log::warn!(
                "Could not find {} in the population label row",
                missing.join(", ")
            );
            return PopulationBuild::Unresolved { missing };
        }
    };

    if layout.brackets.is_empty() {
        log::warn!("No age-bracket columns found; every county will have zero population");
    }
    let change_columns: Vec<usize> = layout
        .brackets
        .iter()
        .filter_map(|b| b.change_column)
        .collect();
    if change_columns.is_empty() {
        log::warn!("Could not find population change columns; decade change will be zero");
    }

    let mut totals: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
    for row in POPULATION_DATA_START..sheet.rows.len() {
        let (Some(state), Some(county)) = (
            sheet.cell(row, layout.state_column),
            sheet.cell(row, layout.county_column),
        ) else {
            continue;
        };

        let people: f64 = layout
            .brackets
            .iter()
            .map(|b| population_value(sheet.cell(row, b.column)))
            .sum();
        let change: f64 = change_columns
            .iter()
            .map(|&c| population_value(sheet.cell(row, c)))
            .sum();

        let entry = totals
            .entry((state.to_string(), county.to_string()))
            .or_insert((0.0, 0.0));
        entry.0 += people;
        entry.1 += change;
    }

    let records: Vec<PopulationRecord> = totals
        .into_iter()
        .filter(|(_, (people, _))| *people > 0.0)
        .map(|((state, county), (people, change))| PopulationRecord {
            state: state.trim().to_string(),
            county: county.trim().to_string(),
            people_16_plus: people,
            decade_population_change: change,
        })
        .filter(|r| !is_placeholder(&r.state) && !is_placeholder(&r.county))
        .collect();

    log::info!(
        "Built population table: {} counties from {} data rows",
        records.len(),
        sheet.rows.len().saturating_sub(POPULATION_DATA_START)
    );
    PopulationBuild::Built(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    /// Two brackets, each followed by its change column.
    fn sheet(data: &[&[&str]]) -> PopulationSheet {
        let mut rows = vec![
            strings(&[
                "State",
                "County",
                "Number",
                DECADE_CHANGE_LABEL,
                "Number",
                DECADE_CHANGE_LABEL,
            ]),
            strings(&["", "", "caption", "", "", ""]),
        ];
        rows.extend(data.iter().map(|r| strings(r)));
        PopulationSheet {
            columns: strings(&[
                "Geography",
                "",
                "18 to 24 years",
                "",
                "25 to 34 years",
                "",
            ]),
            rows,
        }
    }

    fn build(sheet: &PopulationSheet) -> Vec<PopulationRecord> {
        match build_population_table(sheet) {
            PopulationBuild::Built(records) => records,
            PopulationBuild::Unresolved { missing } => panic!("unresolved: {missing:?}"),
        }
    }

    #[test]
    fn sums_brackets_and_changes() {
        let sheet = sheet(&[&["Ohio", "Adams", "600", "-20", "400", "-30"]]);
        let records = build(&sheet);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert!((record.people_16_plus - 1000.0).abs() < 1e-9);
        assert!((record.decade_population_change + 50.0).abs() < 1e-9);
        assert!((record.projected_population() - 950.0).abs() < 1e-9);
    }

    #[test]
    fn sniff_locates_all_columns() {
        let sheet = sheet(&[]);
        let SchemaSniff::Resolved(layout) = sniff_population_schema(&sheet) else {
            panic!("expected resolved layout");
        };
        assert_eq!(layout.state_column, 0);
        assert_eq!(layout.county_column, 1);
        assert_eq!(
            layout.brackets,
            vec![
                BracketColumn {
                    bracket: AgeBracket::From18To24,
                    column: 2,
                    change_column: Some(3),
                },
                BracketColumn {
                    bracket: AgeBracket::From25To34,
                    column: 4,
                    change_column: Some(5),
                },
            ]
        );
    }

    #[test]
    fn missing_state_label_is_unresolved() {
        let mut sheet = sheet(&[&["Ohio", "Adams", "1", "0", "1", "0"]]);
        sheet.rows[0][0] = "Region".to_string();
        assert_eq!(
            sniff_population_schema(&sheet),
            SchemaSniff::Unresolved {
                missing: vec!["State".to_string()],
            }
        );
        let build = build_population_table(&sheet);
        assert!(!build.is_resolved());
        assert!(build.records().is_empty());
    }

    #[test]
    fn empty_sheet_is_unresolved() {
        let sniff = sniff_population_schema(&PopulationSheet::default());
        assert_eq!(
            sniff,
            SchemaSniff::Unresolved {
                missing: vec!["State".to_string(), "County".to_string()],
            }
        );
    }

    #[test]
    fn duplicate_counties_are_summed() {
        let sheet = sheet(&[
            &["Ohio", "Adams", "100", "5", "0", "0"],
            &["Ohio", "Adams", "50", "-1", "10", "2"],
            &["Ohio", "Allen", "7", "0", "0", "0"],
        ]);
        let records = build(&sheet);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].county, "Adams");
        assert!((records[0].people_16_plus - 160.0).abs() < 1e-9);
        assert!((records[0].decade_population_change - 6.0).abs() < 1e-9);
        assert_eq!(records[1].county, "Allen");
    }

    #[test]
    fn drops_placeholders_missing_names_and_empty_counties() {
        let sheet = sheet(&[
            &["nan", "Adams", "100", "0", "0", "0"],
            &["Ohio", "NULL", "100", "0", "0", "0"],
            &["", "Butler", "100", "0", "0", "0"],
            &["Ohio", "Clark", "0", "0", "0", "0"],
            &["Ohio", "Darke", "12", "0", "0", "0"],
        ]);
        let records = build(&sheet);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].county, "Darke");
    }

    #[test]
    fn strips_thousands_separators() {
        let sheet = sheet(&[&["Texas", "Harris", "1,200", "-1,000", "3,400", "50"]]);
        let records = build(&sheet);
        assert!((records[0].people_16_plus - 4600.0).abs() < 1e-9);
        assert!((records[0].decade_population_change + 950.0).abs() < 1e-9);
    }

    #[test]
    fn non_numeric_cells_count_as_zero() {
        let sheet = sheet(&[&["Texas", "Harris", "(X)", "", "10", "n/a"]]);
        let records = build(&sheet);
        assert!((records[0].people_16_plus - 10.0).abs() < 1e-9);
        assert!(records[0].decade_population_change.abs() < 1e-9);
    }

    #[test]
    fn change_search_is_bounded() {
        let mut columns = vec![String::new(); 14];
        columns[2] = "18 to 24 years".to_string();
        let mut label_row = vec![String::new(); 14];
        label_row[0] = "State".to_string();
        label_row[1] = "County".to_string();
        label_row[12] = DECADE_CHANGE_LABEL.to_string();

        let sheet = PopulationSheet {
            columns,
            rows: vec![label_row],
        };
        let SchemaSniff::Resolved(layout) = sniff_population_schema(&sheet) else {
            panic!("expected resolved layout");
        };
        assert_eq!(layout.brackets.len(), 1);
        assert_eq!(layout.brackets[0].change_column, None);

        let mut sheet = sheet;
        sheet.rows[0][11] = DECADE_CHANGE_LABEL.to_string();
        let SchemaSniff::Resolved(layout) = sniff_population_schema(&sheet) else {
            panic!("expected resolved layout");
        };
        assert_eq!(layout.brackets[0].change_column, Some(11));
    }

    #[test]
    fn missing_change_columns_default_to_zero() {
        let mut sheet = sheet(&[&["Ohio", "Adams", "10", "99", "10", "99"]]);
        sheet.rows[0][3] = String::new();
        sheet.rows[0][5] = String::new();
        let records = build(&sheet);
        assert!((records[0].people_16_plus - 20.0).abs() < 1e-9);
        assert!(records[0].decade_population_change.abs() < 1e-9);
    }
}
