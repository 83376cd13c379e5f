//! Core library for healthlog, a single-user health tracker.
//!
//! The crate is split into three layers:
//!
//! - [`records`]: validated domain records (profile, workouts, meals).
//! - [`metrics`]: pure calculation functions deriving health metrics from records.
//! - [`repository`]: the on-disk JSON store and the [`Repository`] context that owns it.

use thiserror::Error;

pub mod fs;
pub mod metrics;
pub mod records;
pub mod repository;

pub use repository::Repository;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] records::ValidationError),
    #[error(transparent)]
    Calculation(#[from] metrics::CalcError),
    #[error(transparent)]
    Storage(#[from] repository::Error),
}
