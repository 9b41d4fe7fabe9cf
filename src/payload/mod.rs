//! Payload pool for form submissions
//!
//! Form targets are submitted with one value per visible input field, sampled
//! from a pool loaded once per crawl run. The payload file is read as a
//! header-less CSV table; every non-empty field of every record becomes one
//! pool value.

use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading the payload pool
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Failed to read payload file {path}: {source}")]
    Read { path: String, source: csv::Error },
}

/// Shared table of values used to fill form fields
#[derive(Debug, Clone, Default)]
pub struct PayloadPool {
    values: Vec<String>,
}

impl PayloadPool {
    /// Builds a pool from in-memory values, skipping empty strings
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(Into::into)
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }

    /// Loads a pool from a payload file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the payload table
    ///
    /// # Returns
    ///
    /// * `Ok(PayloadPool)` - The loaded pool (possibly empty)
    /// * `Err(PayloadError)` - The file could not be opened or decoded
    pub fn load(path: &Path) -> Result<Self, PayloadError> {
        let read_error = |source| PayloadError::Read {
            path: path.display().to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(read_error)?;

        let mut values = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_error)?;
            values.extend(record.iter().map(str::to_string));
        }

        let pool = Self::from_values(values);
        tracing::debug!("Loaded {} payload values from {}", pool.len(), path.display());
        Ok(pool)
    }

    /// Number of values in the pool
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Picks one value uniformly at random, or `None` if the pool is empty
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.values.choose(rng).map(String::as_str)
    }
}
