//! Token queue with insertion at arbitrary positions.
//!
//! The scanner usually appends tokens, but a simple key that turns out to be a
//! real mapping key forces a KEY token (and possibly a BLOCK-MAPPING-START)
//! into a position that has already been passed. The queue therefore supports
//! `insert` at an index in addition to the usual enqueue/dequeue pair.

use std::collections::VecDeque;

/// FIFO queue that also allows insertion at an index.
#[derive(Debug, Default)]
pub struct InsertionQueue<T> {
    items: VecDeque<T>,
}

impl<T> InsertionQueue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item at the back.
    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Remove and return the front item.
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// The front item, without removing it.
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Insert an item so that it becomes the `index`-th element.
    pub fn insert(&mut self, index: usize, item: T) {
        self.items.insert(index, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut queue = InsertionQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(3));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn insert_at_front_and_middle() {
        let mut queue = InsertionQueue::new();
        queue.enqueue('b');
        queue.enqueue('d');
        queue.insert(0, 'a');
        queue.insert(2, 'c');
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.dequeue(), Some('a'));
        assert_eq!(queue.dequeue(), Some('b'));
        assert_eq!(queue.dequeue(), Some('c'));
        assert_eq!(queue.dequeue(), Some('d'));
    }
}
