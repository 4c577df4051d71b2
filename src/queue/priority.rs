//! Strict-priority transmission queue with push-out.
//!
//! One FIFO per priority class. Dequeue always serves the highest non-empty
//! class, so responses are never stuck behind new Interests on the same face.
//! Capacity is counted in packets across all classes. When the queue is full an
//! arrival may evict the oldest packet of a strictly lower class; otherwise the
//! arrival itself is refused.

use std::collections::VecDeque;

use super::{PriorityClass, QueuedPacket};

#[derive(Debug)]
pub struct PriorityTxQueue {
    capacity: usize,
    len: usize,
    classes: Vec<VecDeque<QueuedPacket>>,
}

impl PriorityTxQueue {
    pub fn new(capacity: usize, class_count: usize) -> Self {
        Self {
            capacity,
            len: 0,
            classes: (0..class_count.max(1)).map(|_| VecDeque::new()).collect(),
        }
    }

    fn slot(&self, class: PriorityClass) -> usize {
        debug_assert!(class.index() < self.classes.len(), "class out of range");
        class.index().min(self.classes.len() - 1)
    }

    /// Enqueue by class.
    ///
    /// - `Ok(None)`: queued, nothing dropped.
    /// - `Ok(Some(victim))`: queued after pushing out `victim`, the oldest
    ///   packet of the lowest non-empty class.
    /// - `Err(pkt)`: queue full and nothing of strictly lower priority to
    ///   evict; `pkt` is handed back and the queue is unchanged.
    pub fn enqueue(&mut self, pkt: QueuedPacket) -> Result<Option<QueuedPacket>, QueuedPacket> {
        let slot = self.slot(pkt.class);
        if !self.is_full() {
            self.classes[slot].push_back(pkt);
            self.len += 1;
            return Ok(None);
        }

        let Some(lowest) = self.classes.iter().rposition(|q| !q.is_empty()) else {
            return Err(pkt);
        };
        if lowest <= slot {
            return Err(pkt);
        }
        let victim = self.classes[lowest].pop_front();
        self.classes[slot].push_back(pkt);
        Ok(victim)
    }

    pub fn dequeue(&mut self) -> Option<QueuedPacket> {
        let pkt = self.classes.iter_mut().find_map(VecDeque::pop_front)?;
        self.len -= 1;
        Some(pkt)
    }

    /// The packet the next `dequeue` would return.
    pub fn peek(&self) -> Option<&QueuedPacket> {
        self.classes.iter().find_map(VecDeque::front)
    }

    /// Removes every packet, highest class first.
    pub fn drain(&mut self) -> Vec<QueuedPacket> {
        self.len = 0;
        self.classes.iter_mut().flat_map(|q| q.drain(..)).collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn len_of(&self, class: PriorityClass) -> usize {
        self.classes.get(class.index()).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
