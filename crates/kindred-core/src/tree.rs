//! The registry: owns every person and orchestrates cross-person edges

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::id::{IdGenerator, PersonId, SequentialIds};
use crate::limits::{validate_birth_year, validate_death_year, validate_full_name};
use crate::marriage::Marriage;
use crate::person::{Gender, Person, PersonView};
use crate::policy::MarriagePolicy;

/// Family tree registry
///
/// Persons are keyed by identifier and never removed. Every identifier stored
/// in a person's parents, children or marriages refers to a person in this
/// map. All mutating operations validate completely before touching any
/// person, so a failed call leaves the registry unchanged.
#[derive(Debug)]
pub struct FamilyTree {
    persons: BTreeMap<PersonId, Person>,
    ids: Box<dyn IdGenerator>,
    policy: MarriagePolicy,
}

impl Default for FamilyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FamilyTree {
    /// Empty registry with sequential `P001`-style identifiers and the
    /// default marriage policy
    pub fn new() -> Self {
        Self {
            persons: BTreeMap::new(),
            ids: Box::new(SequentialIds::new()),
            policy: MarriagePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MarriagePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve an identifier, failing with [`Error::UnknownPerson`]
    pub fn person(&self, id: &str) -> Result<&Person> {
        self.persons
            .get(id)
            .ok_or_else(|| Error::UnknownPerson(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&Person> {
        self.persons.get(id)
    }

    /// All persons in identifier order
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    fn person_mut(&mut self, id: &str) -> Result<&mut Person> {
        self.persons
            .get_mut(id)
            .ok_or_else(|| Error::UnknownPerson(id.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a new person and return its identifier.
    ///
    /// Marriageability is classified here, once, from the birth year.
    pub fn add_person(
        &mut self,
        full_name: &str,
        gender: Gender,
        birth_year: i32,
        death_year: Option<i32>,
    ) -> Result<PersonId> {
        validate_full_name(full_name)?;
        validate_birth_year(birth_year)?;
        validate_death_year(birth_year, death_year)?;

        let id = self.ids.next_id();
        if self.persons.contains_key(&id) {
            return Err(Error::DuplicateId(id.to_string()));
        }

        let marriageability = self.policy.classify(birth_year);
        let person = Person::new(
            id.clone(),
            full_name,
            gender,
            birth_year,
            death_year,
            marriageability,
        )?;

        tracing::debug!(
            "Registered person {} ({}, b.{}, {:?})",
            id,
            full_name,
            birth_year,
            marriageability
        );
        self.persons.insert(id.clone(), person);
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Parent-child edges
    // ─────────────────────────────────────────────────────────────────────────

    /// Record `parent_id` as a parent of `child_id`.
    ///
    /// Fails if the child already has two parents, if the two are the same
    /// person, or if the parent is already reachable below the child.
    pub fn add_parent_child(&mut self, parent_id: &str, child_id: &str) -> Result<()> {
        let parent = self.person(parent_id)?.id().clone();
        let child = self.person(child_id)?;
        child.check_new_parent(&parent)?;

        if self.is_ancestor_of(child_id, parent_id)? {
            return Err(Error::InvalidRelationship(format!(
                "Cycle detected: {} is already a descendant of {}",
                parent_id, child_id
            )));
        }

        let child = child.id().clone();
        self.person_mut(child_id)?.insert_parent(parent);
        self.person_mut(parent_id)?.push_child(child);
        tracing::debug!("Added parent {} of {}", parent_id, child_id);
        Ok(())
    }

    /// Parent-side spelling of [`Self::add_parent_child`]
    pub fn add_child(&mut self, parent_id: &str, child_id: &str) -> Result<()> {
        self.add_parent_child(parent_id, child_id)
    }

    /// Whether `other_id` is reachable from `ancestor_id` by following child
    /// edges. A person is trivially reachable from itself.
    pub fn is_ancestor_of(&self, ancestor_id: &str, other_id: &str) -> Result<bool> {
        let start = self.person(ancestor_id)?;
        let target = self.person(other_id)?.id();

        let mut visited: HashSet<&PersonId> = HashSet::new();
        let mut queue: VecDeque<&Person> = VecDeque::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current.id() == target {
                return Ok(true);
            }
            if !visited.insert(current.id()) {
                continue;
            }
            queue.extend(self.resolve_all(current.children())?);
        }
        Ok(false)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Marriage
    // ─────────────────────────────────────────────────────────────────────────

    /// Marry two persons in `year`, appending a record to each history
    pub fn marry(&mut self, a_id: &str, b_id: &str, year: i32) -> Result<()> {
        let a = self.person(a_id)?;
        let b = self.person(b_id)?;

        if a.id() == b.id() {
            return Err(Error::InvalidMarriage(format!(
                "{} cannot marry self",
                a.id()
            )));
        }
        if !a.can_marry() || !b.can_marry() {
            return Err(Error::InvalidMarriage(format!(
                "One or both of {} and {} cannot marry (e.g., minor)",
                a.id(),
                b.id()
            )));
        }
        if let Some(spouse) = a.current_spouse() {
            return Err(Error::InvalidMarriage(format!(
                "{} is already married to {}",
                a.id(),
                spouse
            )));
        }
        if let Some(spouse) = b.current_spouse() {
            return Err(Error::InvalidMarriage(format!(
                "{} is already married to {}",
                b.id(),
                spouse
            )));
        }
        if year < a.birth_year() || year < b.birth_year() {
            return Err(Error::InvalidMarriage(format!(
                "Marriage year {} is before the birth of {} or {}",
                year,
                a.id(),
                b.id()
            )));
        }

        let (a, b) = (a.id().clone(), b.id().clone());
        self.person_mut(a_id)?
            .push_marriage(Marriage::new(b.clone(), year));
        self.person_mut(b_id)?
            .push_marriage(Marriage::new(a.clone(), year));
        tracing::debug!("Married {} and {} in {}", a, b, year);
        Ok(())
    }

    /// Dissolve the active marriage of `person_id` in `year`, on both sides.
    pub fn record_divorce(&mut self, person_id: &str, year: i32) -> Result<()> {
        let person = self.person(person_id)?;
        let record = person
            .marriages()
            .last()
            .filter(|m| m.is_active())
            .ok_or_else(|| {
                Error::InvalidMarriage(format!("{} has no active marriage", person_id))
            })?;
        if year < record.marriage_year {
            return Err(Error::InvalidMarriage(format!(
                "Divorce year {} is before marriage year {}",
                year, record.marriage_year
            )));
        }

        let spouse_id = record.spouse.clone();
        let spouse = self.person(spouse_id.as_str())?;
        if spouse.current_spouse().map(PersonId::as_str) != Some(person_id) {
            return Err(Error::Internal(format!(
                "Marriage records of {} and {} disagree",
                person_id, spouse_id
            )));
        }

        for id in [person_id, spouse_id.as_str()] {
            if let Some(marriage) = self.person_mut(id)?.active_marriage_mut() {
                marriage.set_divorce_year(year);
            }
        }
        tracing::debug!("Recorded divorce of {} and {} in {}", person_id, spouse_id, year);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Attribute updates
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_full_name(&mut self, id: &str, full_name: &str) -> Result<()> {
        self.person_mut(id)?.set_full_name(full_name)
    }

    pub fn set_gender(&mut self, id: &str, gender: Gender) -> Result<()> {
        self.person_mut(id)?.set_gender(gender);
        Ok(())
    }

    pub fn set_birth_year(&mut self, id: &str, birth_year: i32) -> Result<()> {
        self.person_mut(id)?.set_birth_year(birth_year)
    }

    pub fn set_death_year(&mut self, id: &str, death_year: Option<i32>) -> Result<()> {
        self.person_mut(id)?.set_death_year(death_year)
    }

    /// Read-only projection of a single person
    pub fn show(&self, id: &str) -> Result<PersonView> {
        Ok(self.person(id)?.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::UlidIds;
    use crate::marriage::MaritalStatus;
    use crate::person::Marriageability;

    fn adult(tree: &mut FamilyTree, name: &str, birth: i32) -> PersonId {
        tree.add_person(name, Gender::Other, birth, None).unwrap()
    }

    #[test]
    fn test_add_person_assigns_sequential_ids() {
        let mut tree = FamilyTree::new();
        let a = adult(&mut tree, "Alice", 1950);
        let b = adult(&mut tree, "Bob", 1950);

        assert_eq!(a.as_str(), "P001");
        assert_eq!(b.as_str(), "P002");
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_failed_add_person_does_not_consume_id() {
        let mut tree = FamilyTree::new();
        assert!(tree.add_person("", Gender::Male, 1950, None).is_err());
        assert!(tree.add_person("Bob", Gender::Male, 1950, Some(1900)).is_err());
        assert_eq!(adult(&mut tree, "Alice", 1950).as_str(), "P001");
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_add_person_classifies_marriageability() {
        let mut tree = FamilyTree::new();
        let grown = adult(&mut tree, "Grown", 2000);
        let minor = adult(&mut tree, "Minor", 2015);

        assert_eq!(
            tree.person(grown.as_str()).unwrap().marriageability(),
            Marriageability::Eligible
        );
        assert_eq!(
            tree.person(minor.as_str()).unwrap().marriageability(),
            Marriageability::Ineligible
        );
    }

    #[test]
    fn test_far_future_birth_under_negative_reference_year() {
        let mut tree = FamilyTree::new().with_policy(MarriagePolicy::new(-2, 18));
        let id = tree
            .add_person("Far Future", Gender::Other, i32::MAX, None)
            .unwrap();
        assert!(!tree.person(id.as_str()).unwrap().can_marry());
    }

    #[test]
    fn test_is_ancestor_of_reports_dangling_child_as_internal() {
        let mut tree = FamilyTree::new();
        let a = adult(&mut tree, "Alice", 1950);
        let b = adult(&mut tree, "Bob", 1950);
        tree.person_mut(a.as_str())
            .unwrap()
            .push_child(PersonId::from("P999"));

        let err = tree.is_ancestor_of(a.as_str(), b.as_str()).unwrap_err();
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn test_custom_policy_and_generator() {
        let mut tree = FamilyTree::new()
            .with_policy(MarriagePolicy::new(1960, 18))
            .with_id_generator(UlidIds);
        let id = adult(&mut tree, "Alice", 1950);

        assert_eq!(id.as_str().len(), 26);
        assert!(!tree.person(id.as_str()).unwrap().can_marry());
    }

    #[test]
    fn test_duplicate_generated_id_is_rejected() {
        #[derive(Debug)]
        struct Fixed;
        impl IdGenerator for Fixed {
            fn next_id(&mut self) -> PersonId {
                PersonId::from("SAME")
            }
        }

        let mut tree = FamilyTree::new().with_id_generator(Fixed);
        adult(&mut tree, "Alice", 1950);
        let err = tree.add_person("Bob", Gender::Male, 1950, None).unwrap_err();

        assert!(matches!(err, Error::DuplicateId(_)));
        assert_eq!(tree.person("SAME").unwrap().full_name(), "Alice");
    }

    #[test]
    fn test_unknown_person() {
        let mut tree = FamilyTree::new();
        let a = adult(&mut tree, "Alice", 1950);

        assert!(matches!(
            tree.add_parent_child(a.as_str(), "P999"),
            Err(Error::UnknownPerson(_))
        ));
        assert!(matches!(
            tree.marry("P999", a.as_str(), 1990),
            Err(Error::UnknownPerson(_))
        ));
        assert!(matches!(tree.show("nope"), Err(Error::UnknownPerson(_))));
        assert!(tree.person(a.as_str()).unwrap().children().is_empty());
    }

    #[test]
    fn test_add_parent_child_links_both_sides() {
        let mut tree = FamilyTree::new();
        let parent = adult(&mut tree, "Parent", 1950);
        let child = adult(&mut tree, "Child", 1980);

        tree.add_parent_child(parent.as_str(), child.as_str()).unwrap();

        assert!(tree.person(child.as_str()).unwrap().parents().contains(&parent));
        assert_eq!(tree.person(parent.as_str()).unwrap().children(), &[child]);
    }

    #[test]
    fn test_add_child_delegates() {
        let mut tree = FamilyTree::new();
        let parent = adult(&mut tree, "Parent", 1950);
        let child = adult(&mut tree, "Child", 1980);

        tree.add_child(parent.as_str(), child.as_str()).unwrap();
        assert!(tree.is_ancestor_of(parent.as_str(), child.as_str()).unwrap());
        assert!(matches!(
            tree.add_child(child.as_str(), parent.as_str()),
            Err(Error::InvalidRelationship(_))
        ));
    }

    #[test]
    fn test_self_parenting_is_rejected() {
        let mut tree = FamilyTree::new();
        let a = adult(&mut tree, "Alice", 1950);

        let err = tree.add_parent_child(a.as_str(), a.as_str()).unwrap_err();
        assert!(matches!(err, Error::InvalidRelationship(_)));
        assert!(tree.person(a.as_str()).unwrap().parents().is_empty());
        assert!(tree.person(a.as_str()).unwrap().children().is_empty());
    }

    #[test]
    fn test_indirect_cycle_is_rejected_without_mutation() {
        let mut tree = FamilyTree::new();
        let a = adult(&mut tree, "A", 1900);
        let b = adult(&mut tree, "B", 1930);
        let c = adult(&mut tree, "C", 1960);
        tree.add_parent_child(a.as_str(), b.as_str()).unwrap();
        tree.add_parent_child(b.as_str(), c.as_str()).unwrap();

        let err = tree.add_parent_child(c.as_str(), a.as_str()).unwrap_err();

        assert!(matches!(err, Error::InvalidRelationship(_)));
        assert!(tree.person(a.as_str()).unwrap().parents().is_empty());
        assert!(tree.person(c.as_str()).unwrap().children().is_empty());
    }

    #[test]
    fn test_readding_a_parent_duplicates_child_entry() {
        let mut tree = FamilyTree::new();
        let parent = adult(&mut tree, "Parent", 1950);
        let child = adult(&mut tree, "Child", 1980);

        tree.add_parent_child(parent.as_str(), child.as_str()).unwrap();
        tree.add_parent_child(parent.as_str(), child.as_str()).unwrap();

        assert_eq!(tree.person(child.as_str()).unwrap().parents().len(), 1);
        assert_eq!(tree.person(parent.as_str()).unwrap().children().len(), 2);
    }

    #[test]
    fn test_is_ancestor_of() {
        let mut tree = FamilyTree::new();
        let a = adult(&mut tree, "A", 1900);
        let b = adult(&mut tree, "B", 1930);
        let c = adult(&mut tree, "C", 1960);
        let d = adult(&mut tree, "D", 1960);
        tree.add_parent_child(a.as_str(), b.as_str()).unwrap();
        tree.add_parent_child(b.as_str(), c.as_str()).unwrap();

        assert!(tree.is_ancestor_of(a.as_str(), c.as_str()).unwrap());
        assert!(tree.is_ancestor_of(a.as_str(), a.as_str()).unwrap());
        assert!(!tree.is_ancestor_of(c.as_str(), a.as_str()).unwrap());
        assert!(!tree.is_ancestor_of(a.as_str(), d.as_str()).unwrap());
    }

    #[test]
    fn test_marry_rules() {
        let mut tree = FamilyTree::new();
        let a = adult(&mut tree, "A", 1950);
        let b = adult(&mut tree, "B", 1955);
        let minor = adult(&mut tree, "Minor", 2015);

        assert!(matches!(
            tree.marry(a.as_str(), a.as_str(), 1980),
            Err(Error::InvalidMarriage(_))
        ));
        assert!(matches!(
            tree.marry(a.as_str(), minor.as_str(), 2040),
            Err(Error::InvalidMarriage(_))
        ));
        assert!(matches!(
            tree.marry(a.as_str(), b.as_str(), 1954),
            Err(Error::InvalidMarriage(_))
        ));
        assert!(tree.person(a.as_str()).unwrap().marriages().is_empty());
        assert!(tree.person(b.as_str()).unwrap().marriages().is_empty());

        tree.marry(a.as_str(), b.as_str(), 1955).unwrap();
        let record = &tree.person(b.as_str()).unwrap().marriages()[0];
        assert_eq!(record.spouse, a);
        assert_eq!(record.marriage_year, 1955);
        assert!(record.divorce_year.is_none());
    }

    #[test]
    fn test_divorce_then_remarriage() {
        let mut tree = FamilyTree::new();
        let a = adult(&mut tree, "A", 1950);
        let b = adult(&mut tree, "B", 1950);
        let c = adult(&mut tree, "C", 1950);

        tree.marry(a.as_str(), b.as_str(), 1975).unwrap();
        assert!(matches!(
            tree.record_divorce(a.as_str(), 1970),
            Err(Error::InvalidMarriage(_))
        ));
        tree.record_divorce(a.as_str(), 1980).unwrap();

        assert_eq!(
            tree.person(a.as_str()).unwrap().marital_status(),
            MaritalStatus::Divorced(b.clone())
        );
        assert!(tree.person(b.as_str()).unwrap().current_spouse().is_none());
        assert!(matches!(
            tree.record_divorce(b.as_str(), 1981),
            Err(Error::InvalidMarriage(_))
        ));

        tree.marry(a.as_str(), c.as_str(), 1985).unwrap();
        assert_eq!(tree.person(a.as_str()).unwrap().current_spouse(), Some(&c));
        assert_eq!(tree.person(a.as_str()).unwrap().marriages().len(), 2);
    }

    #[test]
    fn test_attribute_updates() {
        let mut tree = FamilyTree::new();
        let a = adult(&mut tree, "A", 1950);

        tree.set_full_name(a.as_str(), "Anne").unwrap();
        tree.set_gender(a.as_str(), Gender::Female).unwrap();
        tree.set_death_year(a.as_str(), Some(2010)).unwrap();
        assert!(matches!(
            tree.set_birth_year(a.as_str(), 2011),
            Err(Error::InvalidAttribute(_))
        ));
        assert!(matches!(
            tree.set_gender("P404", Gender::Male),
            Err(Error::UnknownPerson(_))
        ));

        let view = tree.show(a.as_str()).unwrap();
        assert_eq!(view.to_string(), "P001 | Anne | FEMALE | b.1950 d.2010 | children=0");
    }

    #[test]
    fn test_show_reports_spouse_and_children() {
        let mut tree = FamilyTree::new();
        let a = adult(&mut tree, "Alice", 1950);
        let b = adult(&mut tree, "Bob", 1950);
        let c = adult(&mut tree, "Carol", 1976);
        tree.marry(a.as_str(), b.as_str(), 1975).unwrap();
        tree.add_parent_child(a.as_str(), c.as_str()).unwrap();

        let view = tree.show(a.as_str()).unwrap();
        assert_eq!(view.spouse, Some(b));
        assert_eq!(view.child_count, 1);
        assert_eq!(
            view.to_string(),
            "P001 | Alice | OTHER | b.1950 | spouse=P002 | children=1"
        );
    }
}
