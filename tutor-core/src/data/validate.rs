//! Input validation for ordered price series.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::Bar;

/// Malformed input handed to the pipeline or the engine. Never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("dates out of order at row {index}: {current} follows {previous}")]
    UnsortedDates {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("duplicate date {date} at row {index}")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("oracle returned {got} probabilities for {expected} bars")]
    ProbabilityCountMismatch { expected: usize, got: usize },

    #[error("probability {value} at row {index} is outside [0, 1]")]
    InvalidProbability { index: usize, value: f64 },
}

/// Require a non-empty, strictly increasing date sequence.
pub fn validate_dates<I>(dates: I) -> Result<(), InputError>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut previous: Option<NaiveDate> = None;
    let mut count = 0usize;
    for (index, current) in dates.into_iter().enumerate() {
        if let Some(prev) = previous {
            if current == prev {
                return Err(InputError::DuplicateDate {
                    index,
                    date: current,
                });
            }
            if current < prev {
                return Err(InputError::UnsortedDates {
                    index,
                    previous: prev,
                    current,
                });
            }
        }
        previous = Some(current);
        count += 1;
    }
    if count == 0 {
        return Err(InputError::EmptySeries);
    }
    Ok(())
}

/// Validate a bar series' date ordering.
pub fn validate_bars(bars: &[Bar]) -> Result<(), InputError> {
    validate_dates(bars.iter().map(|b| b.date))
}

/// Drop bars with any non-finite price. Returns the number removed.
pub fn drop_incomplete(bars: &mut Vec<Bar>) -> usize {
    let before = bars.len();
    bars.retain(|b| b.is_complete());
    before - bars.len()
}
