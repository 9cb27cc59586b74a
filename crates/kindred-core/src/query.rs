//! Relative queries: generation-bounded BFS, siblings, spouse, lineage walk

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::PersonId;
use crate::limits::validate_generation;
use crate::person::Person;
use crate::tree::FamilyTree;

/// Read-only relative lookups over a registry
pub trait RelativesQuery {
    /// Persons exactly `generation` parent edges above the subject
    /// (0 = the subject, 1 = parents, 2 = grandparents, ...)
    fn ancestors_at_generation(&self, id: &str, generation: i32) -> Result<Vec<&Person>>;

    /// Persons exactly `generation` child edges below the subject
    fn descendants_at_generation(&self, id: &str, generation: i32) -> Result<Vec<&Person>>;

    /// Children of any of the subject's parents, excluding the subject,
    /// each listed once
    fn siblings(&self, id: &str) -> Result<Vec<&Person>>;

    /// The subject's children in insertion order
    fn children(&self, id: &str) -> Result<Vec<&Person>>;

    /// The subject's current spouse, if the last marriage is still active
    fn spouse(&self, id: &str) -> Result<Option<&Person>>;
}

/// Which adjacency a walk follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineageDirection {
    /// Follow parent edges upward
    Ancestors,
    /// Follow child edges downward
    Descendants,
}

/// One visited node of a lineage walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageNode {
    /// Distance from the start (0 = the start)
    pub depth: u32,
    pub id: PersonId,
}

impl FamilyTree {
    fn neighbors<'a>(person: &'a Person, direction: LineageDirection) -> Vec<&'a PersonId> {
        match direction {
            LineageDirection::Ancestors => person.parents().iter().collect(),
            LineageDirection::Descendants => person.children().iter().collect(),
        }
    }

    pub(crate) fn resolve_all<'a>(
        &'a self,
        ids: impl IntoIterator<Item = &'a PersonId>,
    ) -> Result<Vec<&'a Person>> {
        ids.into_iter()
            .map(|id| {
                self.get(id.as_str()).ok_or_else(|| {
                    Error::Internal(format!("Dangling reference to {}", id))
                })
            })
            .collect()
    }

    /// Exact-depth breadth-first search.
    ///
    /// Each level expands the previous frontier into neighbours that were
    /// never enqueued before, so a person reached along converging paths is
    /// kept only at the shallowest level it appears on. Returns the frontier
    /// after exactly `generation` levels, or nothing if the graph runs out
    /// first.
    fn generation_frontier(
        &self,
        id: &str,
        generation: i32,
        direction: LineageDirection,
    ) -> Result<Vec<&Person>> {
        validate_generation(generation)?;
        let start = self.person(id)?;
        if generation == 0 {
            return Ok(vec![start]);
        }

        let mut visited: HashSet<&PersonId> = HashSet::new();
        let mut frontier: Vec<&Person> = vec![start];
        let mut level = 0;

        while !frontier.is_empty() && level < generation {
            let mut next = Vec::new();
            for &person in &frontier {
                for neighbor in Self::neighbors(person, direction) {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            frontier = self.resolve_all(next)?;
            level += 1;
        }

        let result = if level == generation { frontier } else { Vec::new() };
        tracing::debug!(
            "Generation {} {:?} of {}: {} persons",
            generation,
            direction,
            id,
            result.len()
        );
        Ok(result)
    }

    /// Depth-first walk up to `generations` levels, listing the start at
    /// depth 0 and every parent or child below it in pre-order.
    ///
    /// Unlike the generation queries this does not deduplicate: a person
    /// reachable along two paths appears once under each.
    pub fn lineage(
        &self,
        id: &str,
        generations: i32,
        direction: LineageDirection,
    ) -> Result<Vec<LineageNode>> {
        validate_generation(generations)?;
        let start = self.person(id)?;
        let mut nodes = Vec::new();
        // Each entry is (person, depth); neighbours are pushed reversed so they
        // pop in stored order.
        let mut stack: Vec<(&Person, u32)> = vec![(start, 0)];

        while let Some((person, depth)) = stack.pop() {
            nodes.push(LineageNode {
                depth,
                id: person.id().clone(),
            });
            if depth as i32 >= generations {
                continue;
            }
            let next = self.resolve_all(Self::neighbors(person, direction))?;
            stack.extend(next.into_iter().rev().map(|p| (p, depth + 1)));
        }

        Ok(nodes)
    }
}

impl RelativesQuery for FamilyTree {
    fn ancestors_at_generation(&self, id: &str, generation: i32) -> Result<Vec<&Person>> {
        self.generation_frontier(id, generation, LineageDirection::Ancestors)
    }

    fn descendants_at_generation(&self, id: &str, generation: i32) -> Result<Vec<&Person>> {
        self.generation_frontier(id, generation, LineageDirection::Descendants)
    }

    fn siblings(&self, id: &str) -> Result<Vec<&Person>> {
        let person = self.person(id)?;
        let mut seen: HashSet<&PersonId> = HashSet::new();
        let mut siblings = Vec::new();

        for parent in self.resolve_all(person.parents())? {
            for child in parent.children() {
                if child != person.id() && seen.insert(child) {
                    siblings.push(child);
                }
            }
        }

        self.resolve_all(siblings)
    }

    fn children(&self, id: &str) -> Result<Vec<&Person>> {
        self.resolve_all(self.person(id)?.children())
    }

    fn spouse(&self, id: &str) -> Result<Option<&Person>> {
        match self.person(id)?.current_spouse() {
            Some(spouse) => Ok(Some(self.person(spouse.as_str())?)),
            None => Ok(None),
        }
    }
}
