//! Bulk CSV geocoding.
//!
//! Both directions read a CSV, make one Nominatim request per row with a
//! fixed pause in between, and write each result row as soon as it is
//! known. A failed request never aborts the run: its error text goes into
//! the output row instead.

mod forward;
mod reverse;

pub use forward::{convert_string_to_coordinates, LOCATIONS_COLUMN};
pub use reverse::convert_coordinates_to_address;

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::error::{GeoError, Result};

/// Row counts of a bulk run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeocodeSummary {
    pub rows: usize,
    pub failures: usize,
}

/// Reject any input path whose extension is not `csv`
pub fn ensure_csv(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(()),
        _ => Err(GeoError::InvalidExtension(path.to_path_buf())),
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_csv() {
        assert!(ensure_csv(Path::new("places.csv")).is_ok());
        assert!(ensure_csv(Path::new("/tmp/PLACES.CSV")).is_ok());
        assert!(matches!(
            ensure_csv(Path::new("places.xlsx")),
            Err(GeoError::InvalidExtension(_))
        ));
        assert!(ensure_csv(Path::new("places")).is_err());
        assert!(ensure_csv(Path::new("places.csv.gz")).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_waits_for_delay() {
        let start = tokio::time::Instant::now();
        pause(Duration::from_millis(1000)).await;
        assert!(start.elapsed() >= Duration::from_millis(1000));

        let start = tokio::time::Instant::now();
        pause(Duration::ZERO).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
