use crate::state::entity::{FieldMap, World};
use dashmap::DashMap;
use std::sync::{PoisonError, RwLock};

/// Authoritative entity storage.
///
/// Per-entity read-modify-write runs under the entity's DashMap shard guard,
/// so writers to the same entity never lose updates while writers to other
/// entities proceed independently. The world gate is held shared by every
/// mutation and exclusively by `clear` and `snapshot`, which makes both of
/// those whole-world operations atomic.
pub struct EntityStore {
    entities: DashMap<String, FieldMap>,
    gate: RwLock<()>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: DashMap::new(),
            gate: RwLock::new(()),
        }
    }

    /// Run `f` on the entity's mapping while holding its guard.
    ///
    /// Absent entities are created empty first; `f` receives `false` as its
    /// second argument in that case. Anything `f` does (including fan-out)
    /// is ordered with respect to other mutations of the same entity.
    pub fn update_with<R>(&self, name: &str, f: impl FnOnce(&mut FieldMap, bool) -> R) -> R {
        let _gate = self.gate.read().unwrap_or_else(PoisonError::into_inner);

        let mut existed = true;
        let mut entry = self
            .entities
            .entry(name.to_string())
            .or_insert_with(|| {
                existed = false;
                FieldMap::new()
            });

        f(entry.value_mut(), existed)
    }

    /// Overwrite the entity's whole mapping, then run `f` under the same guard
    pub fn replace_with<R>(&self, name: &str, fields: FieldMap, f: impl FnOnce(&FieldMap) -> R) -> R {
        let _gate = self.gate.read().unwrap_or_else(PoisonError::into_inner);

        let entry = self.entities.entry(name.to_string()).insert(fields);
        f(entry.value())
    }

    /// Current mapping for `name`, empty if the entity does not exist
    pub fn get(&self, name: &str) -> FieldMap {
        self.entities
            .get(name)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Copy of the whole world at a single instant
    pub fn snapshot(&self) -> World {
        let _gate = self.gate.write().unwrap_or_else(PoisonError::into_inner);

        self.entities
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Visit every entity while holding its shard guard.
    ///
    /// A mutation of a visited entity either completes before the visit or
    /// waits until the visit has moved past it.
    pub fn for_each(&self, mut f: impl FnMut(&str, &FieldMap)) {
        let _gate = self.gate.read().unwrap_or_else(PoisonError::into_inner);

        for entry in self.entities.iter() {
            f(entry.key(), entry.value());
        }
    }

    /// Remove every entity atomically
    pub fn clear(&self) {
        let _gate = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
