//! Marriageability classification applied when a person is registered

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::person::Marriageability;

/// Reference year used when no other is configured
pub const DEFAULT_REFERENCE_YEAR: i32 = 2025;

/// Minimum age, relative to the reference year, for a person to be eligible
pub const DEFAULT_AGE_OF_MAJORITY: i32 = 18;

/// Decides, once per person, whether that person may enter a marriage.
///
/// The age is measured against `reference_year`, not against the year of any
/// later marriage. A person classified as eligible stays eligible even when
/// their birth year is edited afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarriagePolicy {
    pub reference_year: i32,
    pub age_of_majority: i32,
}

impl Default for MarriagePolicy {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            age_of_majority: DEFAULT_AGE_OF_MAJORITY,
        }
    }
}

impl MarriagePolicy {
    pub fn new(reference_year: i32, age_of_majority: i32) -> Self {
        Self {
            reference_year,
            age_of_majority,
        }
    }

    /// Policy whose reference year is the current UTC calendar year
    pub fn current_year() -> Self {
        Self {
            reference_year: Utc::now().year(),
            ..Self::default()
        }
    }

    /// Classify a person born in `birth_year`
    pub fn classify(&self, birth_year: i32) -> Marriageability {
        let age = i64::from(self.reference_year) - i64::from(birth_year);
        if age < i64::from(self.age_of_majority) {
            Marriageability::Ineligible
        } else {
            Marriageability::Eligible
        }
    }
}
