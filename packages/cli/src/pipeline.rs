//! Full accident-risk pipeline.
//!
//! Chains clean -> derive -> aggregate -> normalize -> fuse -> train ->
//! score -> project over in-memory inputs. File reading and writing stay in
//! `main`, so a run over identical inputs is a pure function of them.

use std::sync::Arc;
use std::time::Instant;

use accident_risk_analytics::aggregate::{AggregationOutcome, aggregate_counties};
use accident_risk_analytics::fusion::{FusionOutcome, fuse};
use accident_risk_analytics::matrix::{feature_matrix, projected_feature_matrix, rate_targets};
use accident_risk_analytics::ranking::rank_importances;
use accident_risk_analytics::risk::{project_rows, score_rows};
use accident_risk_analytics::AnalyticsError;
use accident_risk_analytics_models::{
    AggregationSpec, FeatureImportance, FeatureSet, ProjectionRow, ScoredCountyRow,
};
use accident_risk_geography::normalize::normalize_states;
use accident_risk_geography::population::build_population_table;
use accident_risk_geography_models::{PopulationBuild, PopulationRecord, PopulationSheet};
use accident_risk_incident_models::{Incident, RawIncident};
use accident_risk_ingest::clean::clean_incidents;
use accident_risk_ingest::features::{derive_features, incidents_in_year};
use accident_risk_ingest::progress::ProgressCallback;
use accident_risk_ingest_models::{CleaningReport, StageLoss};
use accident_risk_model::ridge::{RidgeModel, RidgeRegression};
use accident_risk_model::{Evaluation, ModelError, Predictor as _, train_evaluated};
use serde::Serialize;
use thiserror::Error;

use crate::config::PipelineConfig;

/// Stages reported to the progress bar.
const STAGE_COUNT: u64 = 7;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Row counts of each output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputCounts {
    pub all_years: usize,
    pub focus_year: usize,
    pub projection: usize,
}

/// Audit record of one run, written as `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub focus_year: i32,
    pub cleaning: CleaningReport,
    /// Aggregation and fusion losses, all-years set first.
    pub stages: Vec<StageLoss>,
    pub population_resolved: bool,
    pub population_counties: usize,
    pub unmatched_counties: usize,
    pub features: FeatureSet,
    pub evaluation: Evaluation,
    pub feature_importances: Vec<FeatureImportance>,
    pub rows: OutputCounts,
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub all_years: Vec<ScoredCountyRow>,
    /// Scored over the focus-year subset only. Empty when the subset had no
    /// usable counties.
    pub focus_year: Vec<ScoredCountyRow>,
    pub projection: Vec<ProjectionRow>,
    pub summary: RunSummary,
}

/// Builds the population table and expands state abbreviations.
///
/// An unresolved extract yields an empty table.
#[must_use]
pub fn prepare_population(sheet: &PopulationSheet) -> (Vec<PopulationRecord>, bool) {
    let build = build_population_table(sheet);
    if let PopulationBuild::Unresolved { missing } = &build {
        log::warn!(
            "Population extract unresolved (missing {}); continuing without population data",
            missing.join(", ")
        );
    }
    let (records, _) = normalize_states(build.records());
    (records, build.is_resolved())
}

/// Aggregates, normalizes and fuses one incident subset.
fn county_rows(
    incidents: &[Incident],
    spec: &AggregationSpec,
    population: &[PopulationRecord],
    stages: &mut Vec<StageLoss>,
) -> (AggregationOutcome, FusionOutcome) {
    let aggregated = aggregate_counties(incidents, spec);
    let (aggregates, _) = normalize_states(&aggregated.rows);
    let fused = fuse(&aggregates, population);
    stages.push(aggregated.loss.clone());
    stages.push(fused.loss.clone());
    (aggregated, fused)
}

/// Scores the focus-year subset with the all-years model.
fn score_focus_year(
    incidents: &[Incident],
    config: &PipelineConfig,
    spec: &AggregationSpec,
    population: &[PopulationRecord],
    features: &FeatureSet,
    model: &RidgeModel,
    stages: &mut Vec<StageLoss>,
) -> Result<Vec<ScoredCountyRow>, PipelineError> {
    let subset = incidents_in_year(incidents, config.focus_year);
    if subset.is_empty() {
        log::info!(
            "No incidents in {}; skipping single-year scores",
            config.focus_year
        );
        return Ok(Vec::new());
    }

    let (_, fused) = county_rows(&subset, spec, population, stages);
    if fused.rows.is_empty() {
        log::info!(
            "No {} counties matched population data; skipping single-year scores",
            config.focus_year
        );
        return Ok(Vec::new());
    }

    let x = feature_matrix(&fused.rows, features)?;
    let predictions = model.predict(&x)?;
    Ok(score_rows(&fused.rows, &predictions)?)
}

/// Runs the pipeline over loaded inputs.
///
/// # Errors
///
/// Returns [`PipelineError`] if too few counties survive fusion to train
/// the model, or the model's inputs and outputs do not line up.
pub fn run(
    raw: &[RawIncident],
    sheet: &PopulationSheet,
    config: &PipelineConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<PipelineOutput, PipelineError> {
    let start = Instant::now();
    let spec = AggregationSpec::default();
    let mut stages = Vec::new();
    progress.set_total(STAGE_COUNT);

    progress.set_message("Cleaning incidents".to_string());
    let (cleaned, cleaning) = clean_incidents(raw);
    progress.inc(1);

    progress.set_message("Deriving time features".to_string());
    let incidents = derive_features(&cleaned);
    progress.inc(1);

    progress.set_message("Building population table".to_string());
    let (population, population_resolved) = prepare_population(sheet);
    progress.inc(1);

    progress.set_message("Aggregating and fusing counties".to_string());
    let (aggregated, fused) = county_rows(&incidents, &spec, &population, &mut stages);
    let features = aggregated.features.with_population();
    progress.inc(1);

    progress.set_message("Training model".to_string());
    let x = feature_matrix(&fused.rows, &features)?;
    let y = rate_targets(&fused.rows);
    let learner = RidgeRegression::new(config.model.l2);
    let (model, evaluation) = train_evaluated(
        &learner,
        &x,
        &y,
        config.model.test_fraction,
        config.model.seed,
    )?;
    let feature_importances = rank_importances(&features, &model.importances())?;
    for entry in &feature_importances {
        log::info!("Importance {:>20}: {:.4}", entry.feature, entry.importance);
    }
    progress.inc(1);

    progress.set_message("Scoring counties".to_string());
    let all_years = score_rows(&fused.rows, &model.predict(&x)?)?;
    let focus_year = score_focus_year(
        &incidents,
        config,
        &spec,
        &population,
        &features,
        &model,
        &mut stages,
    )?;
    progress.inc(1);

    progress.set_message("Projecting a decade forward".to_string());
    let future = projected_feature_matrix(&fused.rows, &features)?;
    let projection = project_rows(&all_years, &model.predict(&future)?)?;
    progress.inc(1);

    let summary = RunSummary {
        focus_year: config.focus_year,
        cleaning,
        stages,
        population_resolved,
        population_counties: population.len(),
        unmatched_counties: fused.unmatched.len(),
        features,
        evaluation,
        feature_importances,
        rows: OutputCounts {
            all_years: all_years.len(),
            focus_year: focus_year.len(),
            projection: projection.len(),
        },
    };

    progress.finish(format!(
        "Scored {} counties in {:.1}s",
        all_years.len(),
        start.elapsed().as_secs_f64()
    ));

    Ok(PipelineOutput {
        all_years,
        focus_year,
        projection,
        summary,
    })
}
