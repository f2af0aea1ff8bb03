//! Export observations to CSV.
//!
//! The export uses the input schema (`steps,date,interval`), so an imputed
//! dataset can be fed straight back into the loader.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Observation;
use crate::error::AppError;

/// Write observations to a CSV file.
pub fn write_observations_csv(path: &Path, observations: &[Observation]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::internal(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_observations(file, observations)
}

/// Write observations as CSV to any writer. Missing steps are written as `NA`.
pub fn write_observations<W: Write>(writer: W, observations: &[Observation]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(writer);

    writer
        .write_record(["steps", "date", "interval"])
        .map_err(|e| AppError::internal(format!("Failed to write export CSV header: {e}")))?;

    for o in observations {
        let steps = o.steps.map(|s| s.to_string()).unwrap_or_else(|| "NA".to_string());
        writer
            .write_record([steps, o.date.to_string(), o.interval.to_string()])
            .map_err(|e| AppError::internal(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::internal(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
