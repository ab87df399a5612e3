use crate::types::{LandcoverError, LandcoverResult, FIRST_YEAR, LAST_YEAR, MAX_YEARS};
use std::collections::BTreeSet;

/// Deduplicate the requested years and order them oldest first, so maps read
/// left to right from the earlier year to the later one.
pub fn normalize_years(years: &[i32]) -> Vec<i32> {
    years.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Reject years the sliders cannot produce, then normalize
pub fn validate_years(years: &[i32]) -> LandcoverResult<Vec<i32>> {
    if let Some(&year) = years
        .iter()
        .find(|year| !(FIRST_YEAR..=LAST_YEAR).contains(*year))
    {
        return Err(LandcoverError::YearOutOfRange(year));
    }

    let years = normalize_years(years);
    if years.len() > MAX_YEARS {
        return Err(LandcoverError::TooManyYears(years.len()));
    }
    Ok(years)
}
