//! Instantiation queue — buffers new components until the next phase boundary

use crate::behaviour::Behaviour;
use crate::descriptor::ComponentDescriptor;
use cadence_core::{ComponentId, GroupId, Phase};

/// A component that finished Awake/OnEnable and waits for a boundary merge
pub struct PendingInstantiation {
    pub descriptor: ComponentDescriptor,
    pub behaviour: Box<dyn Behaviour>,
    pub origin_phase: Option<Phase>,
    pub frame: u64,
}

/// Components created since the last boundary.
///
/// Two lists: `awakening` holds descriptors whose Awake/OnEnable burst is still on the
/// stack, `pending` holds fully created components. Neither is visible to a scan.
#[derive(Default)]
pub struct InstantiationQueue {
    pending: Vec<PendingInstantiation>,
    awakening: Vec<ComponentDescriptor>,
}

impl InstantiationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a created component to the pending list
    pub fn enqueue(
        &mut self,
        descriptor: ComponentDescriptor,
        behaviour: Box<dyn Behaviour>,
        origin_phase: Option<Phase>,
        frame: u64,
    ) {
        self.pending.push(PendingInstantiation {
            descriptor,
            behaviour,
            origin_phase,
            frame,
        });
    }

    /// Drain all pending components, returning them in creation order
    pub fn drain(&mut self) -> Vec<PendingInstantiation> {
        std::mem::take(&mut self.pending)
    }

    /// Check if there are pending components
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of pending components
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Park a descriptor while its Awake/OnEnable run
    pub(crate) fn stage(&mut self, descriptor: ComponentDescriptor) {
        self.awakening.push(descriptor);
    }

    /// Take a descriptor back out of the awakening list
    pub(crate) fn unstage(&mut self, id: ComponentId) -> Option<ComponentDescriptor> {
        let index = self.awakening.iter().position(|d| d.id == id)?;
        Some(self.awakening.remove(index))
    }

    /// Look up a descriptor that is awakening or pending
    pub fn get(&self, id: ComponentId) -> Option<&ComponentDescriptor> {
        self.awakening
            .iter()
            .find(|d| d.id == id)
            .or_else(|| {
                self.pending
                    .iter()
                    .map(|p| &p.descriptor)
                    .find(|d| d.id == id)
            })
    }

    pub(crate) fn get_mut(&mut self, id: ComponentId) -> Option<&mut ComponentDescriptor> {
        if let Some(d) = self.awakening.iter_mut().find(|d| d.id == id) {
            return Some(d);
        }
        self.pending
            .iter_mut()
            .map(|p| &mut p.descriptor)
            .find(|d| d.id == id)
    }

    /// Ids of every queued component belonging to `group`
    pub fn ids_in_group(&self, group: GroupId) -> Vec<ComponentId> {
        self.awakening
            .iter()
            .chain(self.pending.iter().map(|p| &p.descriptor))
            .filter(|d| d.group == group)
            .map(|d| d.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Capabilities;

    struct Inert;

    impl Behaviour for Inert {
        fn capabilities(&self) -> Capabilities {
            Capabilities::NONE
        }
    }

    fn descriptor(id: u64, group: u64) -> ComponentDescriptor {
        ComponentDescriptor {
            id: ComponentId::from_raw(id),
            name: format!("c{id}"),
            priority: 0,
            capabilities: Capabilities::NONE,
            started: true,
            enabled: true,
            group: GroupId::from_raw(group),
            created_frame: 1,
            created_phase: Some(Phase::Update),
        }
    }

    #[test]
    fn test_enqueue_and_drain() {
        let mut queue = InstantiationQueue::new();
        assert!(queue.is_empty());

        queue.enqueue(descriptor(1, 1), Box::new(Inert), Some(Phase::Update), 1);
        queue.enqueue(descriptor(2, 1), Box::new(Inert), Some(Phase::Update), 1);
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        let ids: Vec<u64> = drained.iter().map(|p| p.descriptor.id.raw()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(drained[0].origin_phase, Some(Phase::Update));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_clears() {
        let mut queue = InstantiationQueue::new();
        queue.enqueue(descriptor(1, 1), Box::new(Inert), None, 0);

        let _ = queue.drain();
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn awakening_is_visible_to_lookup_but_not_drained() {
        let mut queue = InstantiationQueue::new();
        queue.stage(descriptor(5, 2));
        assert!(queue.get(ComponentId::from_raw(5)).is_some());
        assert!(queue.drain().is_empty());

        let staged = queue.unstage(ComponentId::from_raw(5)).unwrap();
        assert_eq!(staged.id.raw(), 5);
        assert!(queue.get(ComponentId::from_raw(5)).is_none());
    }

    #[test]
    fn group_lookup_spans_both_lists() {
        let mut queue = InstantiationQueue::new();
        queue.stage(descriptor(1, 7));
        queue.enqueue(descriptor(2, 7), Box::new(Inert), None, 0);
        queue.enqueue(descriptor(3, 8), Box::new(Inert), None, 0);

        let mut ids = queue.ids_in_group(GroupId::from_raw(7));
        ids.sort();
        assert_eq!(ids, vec![ComponentId::from_raw(1), ComponentId::from_raw(2)]);
    }

    #[test]
    fn get_mut_edits_pending_descriptor() {
        let mut queue = InstantiationQueue::new();
        queue.enqueue(descriptor(1, 1), Box::new(Inert), None, 0);
        queue.get_mut(ComponentId::from_raw(1)).unwrap().priority = -4;
        assert_eq!(queue.drain()[0].descriptor.priority, -4);
    }
}
