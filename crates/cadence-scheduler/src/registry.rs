//! Component registry — the live ordered set of components.
//!
//! The registry never changes shape while a scan is running. Removals are
//! tombstones until [`ComponentRegistry::merge`], which is only called at a
//! phase boundary; insertions arrive through the same merge.

use crate::behaviour::Behaviour;
use crate::descriptor::ComponentDescriptor;
use crate::queue::PendingInstantiation;
use cadence_core::{ComponentId, GroupId};
use std::collections::{HashMap, HashSet};

struct Slot {
    descriptor: ComponentDescriptor,
    /// Empty while one of the component's own callbacks is running
    behaviour: Option<Box<dyn Behaviour>>,
}

/// Counts from one boundary merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Pending components added to the live set
    pub inserted: usize,
    /// Tombstoned live components physically removed
    pub removed: usize,
    /// Pending components destroyed before they ever became live
    pub discarded: usize,
}

impl MergeStats {
    pub fn is_empty(&self) -> bool {
        self.inserted == 0 && self.removed == 0 && self.discarded == 0
    }
}

#[derive(Default)]
pub struct ComponentRegistry {
    slots: HashMap<ComponentId, Slot>,
    /// Live ids in visit order; tombstoned ids stay here until the next merge
    order: Vec<ComponentId>,
    tombstones: HashSet<ComponentId>,
    /// Set when a live priority changed and `order` must be re-sorted at the next merge
    reorder: bool,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component at its priority position and return its id.
    ///
    /// Awake/OnEnable must already have run on it.
    pub fn register(
        &mut self,
        descriptor: ComponentDescriptor,
        behaviour: Box<dyn Behaviour>,
    ) -> ComponentId {
        let id = descriptor.id;
        let key = descriptor.order_key();
        let index = self
            .order
            .partition_point(|other| self.slots[other].descriptor.order_key() < key);
        self.order.insert(index, id);
        self.slots.insert(
            id,
            Slot {
                descriptor,
                behaviour: Some(behaviour),
            },
        );
        id
    }

    /// Descriptor of a live, non-tombstoned component
    pub fn get(&self, id: ComponentId) -> Option<&ComponentDescriptor> {
        if self.tombstones.contains(&id) {
            return None;
        }
        self.slots.get(&id).map(|slot| &slot.descriptor)
    }

    pub(crate) fn get_mut(&mut self, id: ComponentId) -> Option<&mut ComponentDescriptor> {
        if self.tombstones.contains(&id) {
            return None;
        }
        self.slots.get_mut(&id).map(|slot| &mut slot.descriptor)
    }

    pub fn is_tombstoned(&self, id: ComponentId) -> bool {
        self.tombstones.contains(&id)
    }

    /// Mark `id` for removal at the next merge. Returns false if it was already marked.
    ///
    /// Also accepts ids that are still queued; the merge discards those instead of inserting them.
    pub(crate) fn tombstone(&mut self, id: ComponentId) -> bool {
        self.tombstones.insert(id)
    }

    /// Live, non-tombstoned ids in visit order. Phase scans iterate this snapshot.
    pub fn live_ordered(&self) -> Vec<ComponentId> {
        self.order
            .iter()
            .copied()
            .filter(|id| !self.tombstones.contains(id))
            .collect()
    }

    /// Live, non-tombstoned ids belonging to `group`
    pub fn ids_in_group(&self, group: GroupId) -> Vec<ComponentId> {
        self.order
            .iter()
            .copied()
            .filter(|id| !self.tombstones.contains(id) && self.slots[id].descriptor.group == group)
            .collect()
    }

    /// Request a re-sort at the next merge after a live priority change
    pub(crate) fn mark_reorder(&mut self) {
        self.reorder = true;
    }

    /// Lend out a component's behaviour for the duration of one visit
    pub(crate) fn take_behaviour(&mut self, id: ComponentId) -> Option<Box<dyn Behaviour>> {
        self.slots.get_mut(&id).and_then(|slot| slot.behaviour.take())
    }

    pub(crate) fn restore_behaviour(&mut self, id: ComponentId, behaviour: Box<dyn Behaviour>) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.behaviour = Some(behaviour);
        }
    }

    /// Boundary merge: drop tombstoned components, apply priority changes, insert the pending ones.
    pub fn merge(&mut self, pending: Vec<PendingInstantiation>) -> MergeStats {
        let mut stats = MergeStats::default();

        if !self.tombstones.is_empty() {
            let before = self.order.len();
            let tombstones = &self.tombstones;
            self.order.retain(|id| !tombstones.contains(id));
            self.slots.retain(|id, _| !tombstones.contains(id));
            stats.removed = before - self.order.len();
        }

        if self.reorder {
            let slots = &self.slots;
            self.order.sort_by_key(|id| slots[id].descriptor.order_key());
            self.reorder = false;
        }

        for item in pending {
            if self.tombstones.contains(&item.descriptor.id) {
                stats.discarded += 1;
                continue;
            }
            self.register(item.descriptor, item.behaviour);
            stats.inserted += 1;
        }

        self.tombstones.clear();
        stats
    }

    /// Number of live, non-tombstoned components
    pub fn len(&self) -> usize {
        self.order.len() - self.order.iter().filter(|id| self.tombstones.contains(id)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Capabilities;
    use cadence_core::Phase;

    struct Inert;

    impl Behaviour for Inert {
        fn capabilities(&self) -> Capabilities {
            Capabilities::NONE
        }
    }

    fn descriptor(id: u64, priority: i32, group: u64) -> ComponentDescriptor {
        ComponentDescriptor {
            id: ComponentId::from_raw(id),
            name: format!("c{id}"),
            priority,
            capabilities: Capabilities::NONE,
            started: true,
            enabled: true,
            group: GroupId::from_raw(group),
            created_frame: 0,
            created_phase: None,
        }
    }

    fn pending(id: u64, priority: i32) -> PendingInstantiation {
        PendingInstantiation {
            descriptor: descriptor(id, priority, id),
            behaviour: Box::new(Inert),
            origin_phase: Some(Phase::Update),
            frame: 1,
        }
    }

    fn raw(ids: Vec<ComponentId>) -> Vec<u64> {
        ids.into_iter().map(|id| id.raw()).collect()
    }

    #[test]
    fn register_keeps_priority_order() {
        let mut registry = ComponentRegistry::new();
        registry.register(descriptor(1, 0, 1), Box::new(Inert));
        registry.register(descriptor(2, -5, 2), Box::new(Inert));
        registry.register(descriptor(3, 0, 3), Box::new(Inert));
        registry.register(descriptor(4, 10, 4), Box::new(Inert));
        assert_eq!(raw(registry.live_ordered()), vec![2, 1, 3, 4]);
    }

    #[test]
    fn tombstone_hides_until_merge() {
        let mut registry = ComponentRegistry::new();
        registry.register(descriptor(1, 0, 1), Box::new(Inert));
        registry.register(descriptor(2, 0, 2), Box::new(Inert));

        assert!(registry.tombstone(ComponentId::from_raw(1)));
        assert!(!registry.tombstone(ComponentId::from_raw(1)));
        assert!(registry.get(ComponentId::from_raw(1)).is_none());
        assert_eq!(raw(registry.live_ordered()), vec![2]);
        assert_eq!(registry.len(), 1);

        let stats = registry.merge(Vec::new());
        assert_eq!(stats.removed, 1);
        assert!(!registry.is_tombstoned(ComponentId::from_raw(1)));
        assert!(registry.get(ComponentId::from_raw(1)).is_none());
    }

    #[test]
    fn merge_inserts_pending_in_order_and_discards_destroyed() {
        let mut registry = ComponentRegistry::new();
        registry.register(descriptor(1, 0, 1), Box::new(Inert));

        registry.tombstone(ComponentId::from_raw(3));
        let stats = registry.merge(vec![pending(2, 0), pending(3, -1), pending(4, -1)]);

        assert_eq!(
            stats,
            MergeStats {
                inserted: 2,
                removed: 0,
                discarded: 1
            }
        );
        assert_eq!(raw(registry.live_ordered()), vec![4, 1, 2]);
    }

    #[test]
    fn priority_change_applies_at_merge() {
        let mut registry = ComponentRegistry::new();
        registry.register(descriptor(1, 0, 1), Box::new(Inert));
        registry.register(descriptor(2, 0, 2), Box::new(Inert));

        registry.get_mut(ComponentId::from_raw(2)).unwrap().priority = -1;
        registry.mark_reorder();
        assert_eq!(raw(registry.live_ordered()), vec![1, 2]);

        registry.merge(Vec::new());
        assert_eq!(raw(registry.live_ordered()), vec![2, 1]);
    }

    #[test]
    fn behaviour_can_be_lent_and_restored() {
        let mut registry = ComponentRegistry::new();
        let id = registry.register(descriptor(1, 0, 1), Box::new(Inert));
        let behaviour = registry.take_behaviour(id).unwrap();
        assert!(registry.take_behaviour(id).is_none());
        registry.restore_behaviour(id, behaviour);
        assert!(registry.take_behaviour(id).is_some());
    }

    #[test]
    fn group_lookup() {
        let mut registry = ComponentRegistry::new();
        registry.register(descriptor(1, 0, 9), Box::new(Inert));
        registry.register(descriptor(2, 0, 8), Box::new(Inert));
        registry.register(descriptor(3, 0, 9), Box::new(Inert));
        assert_eq!(raw(registry.ids_in_group(GroupId::from_raw(9))), vec![1, 3]);
    }
}
