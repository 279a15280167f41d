/// Chief hierarchy over a project's employees
///
/// Employees point at their chief by id. A [`Roster`] is an in-memory
/// snapshot of one project's employees keyed by id; chain walks and cycle
/// checks resolve `chief_id` links through it instead of following references.
///
/// Every walk carries a visited set, so it terminates even if the stored data
/// contains a cycle.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::employee::Employee;

/// How far up the chief chain authority reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChiefScope {
    /// Only the target's direct chief
    #[default]
    Direct,

    /// Any chief above the target, at any depth
    Transitive,
}

/// Snapshot of a project's employees keyed by id
#[derive(Debug, Clone, Default)]
pub struct Roster {
    employees: HashMap<Uuid, Employee>,
}

impl Roster {
    pub fn new(employees: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            employees: employees.into_iter().map(|e| (e.id, e)).collect(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Employee> {
        self.employees.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.employees.contains_key(&id)
    }

    /// Finds the employee record of a user
    pub fn by_user(&self, user_id: Uuid) -> Option<&Employee> {
        self.employees.values().find(|e| e.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Chief ids above `employee_id`, nearest first
    ///
    /// Stops at the first missing chief, at the top of the hierarchy, or when
    /// an id repeats.
    pub fn chiefs_of(&self, employee_id: Uuid) -> Vec<Uuid> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([employee_id]);
        let mut current = self.get(employee_id).and_then(|e| e.chief_id);

        while let Some(chief_id) = current {
            if !visited.insert(chief_id) {
                break;
            }
            chain.push(chief_id);
            current = self.get(chief_id).and_then(|e| e.chief_id);
        }

        chain
    }

    /// Returns true if `chief_id` has authority over `target_id` within `scope`
    pub fn is_chief_of(&self, chief_id: Uuid, target_id: Uuid, scope: ChiefScope) -> bool {
        let chain = self.chiefs_of(target_id);

        match scope {
            ChiefScope::Direct => chain.first() == Some(&chief_id),
            ChiefScope::Transitive => chain.contains(&chief_id),
        }
    }

    /// Returns true if making `new_chief_id` the chief of `employee_id` would
    /// close a loop
    ///
    /// That is the case when the new chief is the employee itself, or the
    /// employee already sits somewhere above the new chief.
    pub fn would_create_cycle(&self, employee_id: Uuid, new_chief_id: Uuid) -> bool {
        employee_id == new_chief_id || self.chiefs_of(new_chief_id).contains(&employee_id)
    }
}
