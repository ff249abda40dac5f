//! Trip request and response types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// What the traveler asked for
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripRequest {
    /// Where the traveler departs from, e.g. "Bangalore, India"
    pub origin: String,

    /// Suggested destination; the city selection step may pick another
    pub destination: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Free text: party, hobbies, food, pace
    pub interests: String,
}

impl TripRequest {
    /// Reject the request before any task runs
    pub fn validate(&self) -> Result<()> {
        let blank: Vec<&str> = [
            ("origin", &self.origin),
            ("destination", &self.destination),
            ("interests", &self.interests),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !blank.is_empty() {
            return Err(PlannerError::InvalidRequest(format!(
                "Please fill in all fields: {}.",
                blank.join(", ")
            )));
        }

        if self.end_date <= self.start_date {
            return Err(PlannerError::InvalidRequest(
                "End date must be after start date.".into(),
            ));
        }

        Ok(())
    }

    /// "September 10, 2025 to September 20, 2025"
    pub fn date_range(&self) -> String {
        format!(
            "{} to {}",
            self.start_date.format("%B %d, %Y"),
            self.end_date.format("%B %d, %Y")
        )
    }

    /// Trip length in nights
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripResponse {
    pub status: String,
    pub message: String,

    /// Always present on the wire; `null` on failure
    #[serde(default)]
    pub itinerary: Option<String>,

    /// Always present on the wire; `null` on success
    #[serde(default)]
    pub error: Option<String>,
}

impl TripResponse {
    pub fn success(itinerary: impl Into<String>) -> Self {
        Self {
            status: "success".into(),
            message: "Trip plan generated successfully.".into(),
            itinerary: Some(itinerary.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            status: "error".into(),
            message: error.clone(),
            itinerary: None,
            error: Some(error),
        }
    }
}
