//! Ordered, id-indexed copy of the user's rows.

use std::collections::{HashMap, VecDeque};

use crate::models::{Todo, TodoId, TodoPatch};

/// Display order lives in `order`; records are looked up by id so patches
/// never scan the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    order: VecDeque<TodoId>,
    records: HashMap<TodoId, Todo>,
}

impl Snapshot {
    /// Build from rows already in display order.
    pub fn from_rows(rows: Vec<Todo>) -> Self {
        let mut snapshot = Self::default();
        for row in rows {
            if snapshot.records.contains_key(&row.id) {
                continue;
            }
            snapshot.order.push_back(row.id);
            snapshot.records.insert(row.id, row);
        }
        snapshot
    }

    /// Put `rows` in front of the current records, keeping their relative order.
    pub fn prepend(&mut self, rows: Vec<Todo>) {
        for row in rows.into_iter().rev() {
            if self.records.insert(row.id, row.clone()).is_some() {
                self.order.retain(|id| *id != row.id);
            }
            self.order.push_front(row.id);
        }
    }

    /// Returns `false` when no record has `id`.
    pub fn patch(&mut self, id: TodoId, patch: &TodoPatch) -> bool {
        self.records.get_mut(&id).is_some_and(|record| {
            record.apply(patch);
            true
        })
    }

    pub fn remove(&mut self, id: TodoId) -> Option<Todo> {
        let removed = self.records.remove(&id)?;
        self.order.retain(|candidate| *candidate != id);
        Some(removed)
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.records.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Todo> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn to_vec(&self) -> Vec<Todo> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
