#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County-key normalization and population table construction.
//!
//! The incident and population datasets name places inconsistently: one
//! uses `"CA"` where the other writes `"California"`, one says
//! `"Los Angeles County"` where the other says `"Los Angeles"`. The
//! [`normalize`] module reconciles both sides to a shared
//! [`CountyKey`](accident_risk_geography_models::CountyKey), and
//! [`population`] turns the semi-structured census age-group extract into
//! one population row per county.

pub mod normalize;
pub mod population;
