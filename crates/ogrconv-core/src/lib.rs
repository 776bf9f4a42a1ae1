//! `ogrconv-core` is the core library for the ogrconv project: a parameter
//! model and launcher for `ogr2ogr` vector conversions.
//!
//! This crate includes:
//! - **Catalogs**: static registries of vector file formats, database
//!   backends, web-service backends, and EPSG projections.
//! - **Parameter Model**: a reactive, UI-toolkit-independent state holder
//!   that keeps the user's selections, derived control enablement, and the
//!   recomputed command-line string consistent.
//! - **Collaborators**: the Dataset Inspector that opens a candidate source
//!   and reports its coordinate system, and the Process Runner that executes
//!   the conversion tool and waits for full exit.
//!
//! The actual format drivers and reprojection live in the external tool; the
//! model's job is keeping the assembled argument string a pure function of
//! the selections.

pub mod catalog;
pub mod command;
pub mod error;
pub mod inspect;
pub mod model;
pub mod projection;
pub mod run;
