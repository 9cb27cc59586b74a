//! Person (node) types and per-person invariants

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::PersonId;
use crate::limits::{validate_birth_year, validate_death_year, validate_full_name};
use crate::marriage::{MaritalStatus, Marriage};

/// Maximum number of parents a person can have
pub const MAX_PARENTS: usize = 2;

/// Gender of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            "OTHER" => Ok(Self::Other),
            _ => Err(Error::InvalidAttribute(format!("Unknown gender: {}", s))),
        }
    }
}

/// Whether a person may enter a marriage, fixed when the person is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marriageability {
    Eligible,
    Ineligible,
}

/// A person in the family tree
///
/// Relationships are stored as identifiers of other persons in the same
/// registry; only [`crate::FamilyTree`] creates or resolves them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    id: PersonId,
    full_name: String,
    gender: Gender,
    birth_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    death_year: Option<i32>,
    marriageability: Marriageability,
    parents: BTreeSet<PersonId>,
    children: Vec<PersonId>,
    marriages: Vec<Marriage>,
}

impl Person {
    pub(crate) fn new(
        id: PersonId,
        full_name: impl Into<String>,
        gender: Gender,
        birth_year: i32,
        death_year: Option<i32>,
        marriageability: Marriageability,
    ) -> Result<Self> {
        let full_name = full_name.into();
        if id.as_str().trim().is_empty() {
            return Err(Error::InvalidAttribute("ID cannot be blank".to_string()));
        }
        validate_full_name(&full_name)?;
        validate_birth_year(birth_year)?;
        validate_death_year(birth_year, death_year)?;

        Ok(Self {
            id,
            full_name,
            gender,
            birth_year,
            death_year,
            marriageability,
            parents: BTreeSet::new(),
            children: Vec::new(),
            marriages: Vec::new(),
        })
    }

    pub fn id(&self) -> &PersonId {
        &self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn birth_year(&self) -> i32 {
        self.birth_year
    }

    pub fn death_year(&self) -> Option<i32> {
        self.death_year
    }

    pub fn marriageability(&self) -> Marriageability {
        self.marriageability
    }

    pub fn can_marry(&self) -> bool {
        self.marriageability == Marriageability::Eligible
    }

    pub fn parents(&self) -> &BTreeSet<PersonId> {
        &self.parents
    }

    pub fn children(&self) -> &[PersonId] {
        &self.children
    }

    pub fn marriages(&self) -> &[Marriage] {
        &self.marriages
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Attribute mutators
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_full_name(&mut self, full_name: impl Into<String>) -> Result<()> {
        let full_name = full_name.into();
        validate_full_name(&full_name)?;
        self.full_name = full_name;
        Ok(())
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
    }

    /// Change the birth year; marriageability is not re-evaluated
    pub fn set_birth_year(&mut self, birth_year: i32) -> Result<()> {
        validate_birth_year(birth_year)?;
        validate_death_year(birth_year, self.death_year)?;
        self.birth_year = birth_year;
        Ok(())
    }

    pub fn set_death_year(&mut self, death_year: Option<i32>) -> Result<()> {
        validate_death_year(self.birth_year, death_year)?;
        self.death_year = death_year;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Biography
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_alive(&self) -> bool {
        self.death_year.is_none()
    }

    /// Age reached in `year`, capped at the age of death
    pub fn age_in(&self, year: i32) -> Result<i32> {
        if year < self.birth_year {
            return Err(Error::InvalidAttribute(format!(
                "Year {} cannot be before birth year {}",
                year, self.birth_year
            )));
        }
        match self.death_year {
            Some(death) if year > death => Ok(death - self.birth_year),
            _ => Ok(year - self.birth_year),
        }
    }

    /// One-line summary: `P001 Ada Lovelace (b.1815 d.1852)`
    pub fn summary(&self) -> String {
        self.to_string()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Relationships
    // ─────────────────────────────────────────────────────────────────────────

    /// Local rules for accepting `parent` as a new parent.
    ///
    /// The cycle rule needs the whole graph and is checked by the registry.
    pub(crate) fn check_new_parent(&self, parent: &PersonId) -> Result<()> {
        if self.parents.len() >= MAX_PARENTS {
            return Err(Error::InvalidRelationship(format!(
                "{} cannot have more than {} parents",
                self.id, MAX_PARENTS
            )));
        }
        if parent == &self.id {
            return Err(Error::InvalidRelationship(format!(
                "{} cannot be own parent",
                self.id
            )));
        }
        Ok(())
    }

    pub(crate) fn insert_parent(&mut self, parent: PersonId) {
        self.parents.insert(parent);
    }

    pub(crate) fn push_child(&mut self, child: PersonId) {
        self.children.push(child);
    }

    /// Spouse of the last marriage record, unless that record is dissolved
    pub fn current_spouse(&self) -> Option<&PersonId> {
        self.marriages
            .last()
            .filter(|m| m.is_active())
            .map(|m| &m.spouse)
    }

    pub fn marital_status(&self) -> MaritalStatus {
        MaritalStatus::from_history(&self.marriages)
    }

    pub(crate) fn push_marriage(&mut self, marriage: Marriage) {
        self.marriages.push(marriage);
    }

    pub(crate) fn active_marriage_mut(&mut self) -> Option<&mut Marriage> {
        self.marriages.last_mut().filter(|m| m.is_active())
    }

    /// Read-only projection used by `show`
    pub fn view(&self) -> PersonView {
        PersonView {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            gender: self.gender,
            birth_year: self.birth_year,
            death_year: self.death_year,
            spouse: self.current_spouse().cloned(),
            child_count: self.children.len(),
        }
    }
}

fn summary_line(
    id: &PersonId,
    full_name: &str,
    birth_year: i32,
    death_year: Option<i32>,
) -> String {
    match death_year {
        Some(death) => format!("{} {} (b.{} d.{})", id, full_name, birth_year, death),
        None => format!("{} {} (b.{})", id, full_name, birth_year),
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&summary_line(
            &self.id,
            &self.full_name,
            self.birth_year,
            self.death_year,
        ))
    }
}

/// Flat description of one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonView {
    pub id: PersonId,
    pub full_name: String,
    pub gender: Gender,
    pub birth_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse: Option<PersonId>,
    pub child_count: usize,
}

impl PersonView {
    /// Same one-line summary as [`Person::summary`]
    pub fn summary(&self) -> String {
        summary_line(&self.id, &self.full_name, self.birth_year, self.death_year)
    }
}

impl std::fmt::Display for PersonView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | {} | b.{}",
            self.id, self.full_name, self.gender, self.birth_year
        )?;
        if let Some(death) = self.death_year {
            write!(f, " d.{}", death)?;
        }
        if let Some(spouse) = &self.spouse {
            write!(f, " | spouse={}", spouse)?;
        }
        write!(f, " | children={}", self.child_count)
    }
}
