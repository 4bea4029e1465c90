use crate::source::ListEvent;

/// A coincidence table slot. `Blank` stands for "no event here": it is
/// never a scan anchor, never matches a timing window, and never
/// counts towards a coincidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Blank,
    Event(ListEvent),
}

impl Slot {
    pub(crate) fn event(&self) -> Option<&ListEvent> {
        match self {
            Slot::Event(event) => Some(event),
            Slot::Blank => None,
        }
    }
}

/// Fixed-size circular buffer holding the most recent `capacity`
/// ingested slots. All addressing goes through [`Self::wrap`], so any
/// index is valid.
pub(crate) struct EventWindow {
    slots: Vec<Slot>,
}

impl EventWindow {
    /// A fresh window is entirely blank, which doubles as the sentinel
    /// padding for "no history yet" at stream start.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::Blank; capacity],
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Distance between the scan cursor and the insertion point.
    pub(crate) fn half(&self) -> usize {
        self.slots.len() / 2
    }

    pub(crate) fn wrap(&self, index: usize) -> usize {
        index % self.slots.len()
    }

    pub(crate) fn get(&self, index: usize) -> &Slot {
        let index = self.wrap(index);
        &self.slots[index]
    }

    pub(crate) fn set(&mut self, index: usize, slot: Slot) {
        let index = self.wrap(index);
        self.slots[index] = slot;
    }

    /// Overwrites the slot half a revolution ahead of the cursor. As
    /// the cursor sweeps the buffer once per inserted item, this is
    /// always the oldest entry.
    pub(crate) fn insert_ahead_of(&mut self, cursor: usize, slot: Slot) {
        self.set(cursor + self.half(), slot);
    }

    /// Permanently reduces the window to `len` slots. Only used when
    /// the source runs dry during the initial fill.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn event(module: u32, channel: u32, timestamp: u64) -> Slot {
        Slot::Event(ListEvent {
            module,
            channel,
            timestamp,
        })
    }

    #[test]
    fn new_window_is_blank() {
        let window = EventWindow::new(4);
        assert_eq!(window.capacity(), 4);
        for index in 0..4 {
            assert_eq!(*window.get(index), Slot::Blank);
        }
    }

    #[test]
    fn indices_wrap_around() {
        let mut window = EventWindow::new(4);
        window.set(5, event(0, 1, 100));
        assert_eq!(*window.get(1), event(0, 1, 100));
        assert_eq!(*window.get(9), event(0, 1, 100));
    }

    #[test]
    fn insertion_lands_half_a_revolution_ahead() {
        let mut window = EventWindow::new(4);
        window.insert_ahead_of(3, event(1, 2, 200));
        assert_eq!(*window.get(1), event(1, 2, 200));

        let mut window = EventWindow::new(5);
        window.insert_ahead_of(4, event(1, 3, 300));
        assert_eq!(*window.get(1), event(1, 3, 300));
    }

    #[test]
    fn truncation_shrinks_capacity_and_insertion_distance() {
        let mut window = EventWindow::new(20);
        window.truncate(13);
        assert_eq!(window.capacity(), 13);
        assert_eq!(window.half(), 6);
        assert_eq!(window.wrap(13), 0);
    }
}
