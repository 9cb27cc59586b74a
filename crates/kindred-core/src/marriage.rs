//! Marriage records and marital status

use crate::id::PersonId;
use serde::{Deserialize, Serialize};

/// One side of a union
///
/// A successful marriage appends one record to each spouse's history. The
/// two records describe the same union but are stored independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marriage {
    /// The other party
    pub spouse: PersonId,

    /// Year the union began
    pub marriage_year: i32,

    /// Year the union was dissolved, if it has been
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divorce_year: Option<i32>,
}

impl Marriage {
    pub fn new(spouse: PersonId, marriage_year: i32) -> Self {
        Self {
            spouse,
            marriage_year,
            divorce_year: None,
        }
    }

    /// A record with no divorce year
    pub fn is_active(&self) -> bool {
        self.divorce_year.is_none()
    }

    pub(crate) fn set_divorce_year(&mut self, year: i32) {
        self.divorce_year = Some(year);
    }
}

/// Marital status derived from the most recent marriage record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "spouse", rename_all = "lowercase")]
pub enum MaritalStatus {
    Unmarried,
    Married(PersonId),
    Divorced(PersonId),
}

impl MaritalStatus {
    /// Status implied by a marriage history in insertion order
    pub fn from_history(marriages: &[Marriage]) -> Self {
        match marriages.last() {
            None => Self::Unmarried,
            Some(last) if last.is_active() => Self::Married(last.spouse.clone()),
            Some(last) => Self::Divorced(last.spouse.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_history() {
        assert_eq!(MaritalStatus::from_history(&[]), MaritalStatus::Unmarried);

        let mut first = Marriage::new(PersonId::from("P002"), 1990);
        assert_eq!(
            MaritalStatus::from_history(std::slice::from_ref(&first)),
            MaritalStatus::Married(PersonId::from("P002"))
        );

        first.set_divorce_year(1995);
        assert_eq!(
            MaritalStatus::from_history(std::slice::from_ref(&first)),
            MaritalStatus::Divorced(PersonId::from("P002"))
        );

        let second = Marriage::new(PersonId::from("P003"), 1997);
        assert_eq!(
            MaritalStatus::from_history(&[first, second]),
            MaritalStatus::Married(PersonId::from("P003"))
        );
    }
}
