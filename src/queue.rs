use std::collections::{vec_deque, VecDeque};

/// Bounded FIFO. Backs the reorder buffer and the store buffer.
#[derive(Debug, Clone)]
pub struct Queue<T: Clone> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> Queue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[must_use]
    pub fn try_push(&mut self, item: T) -> Option<T> {
        if self.is_full() {
            return Some(item);
        }

        self.data.push_back(item);
        None
    }

    pub fn try_pop(&mut self) -> Option<T> {
        self.data.pop_front()
    }

    pub fn front(&self) -> Option<&T> {
        self.data.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.data.front_mut()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() >= self.capacity
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> vec_deque::IterMut<'_, T> {
        self.data.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_exact() {
        let mut q = Queue::new(3);
        assert_eq!(q.try_push(1), None);
        assert_eq!(q.try_push(2), None);
        assert_eq!(q.try_push(3), None);
        assert!(q.is_full());
        assert_eq!(q.try_push(4), Some(4));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_fifo_order() {
        let mut q = Queue::new(2);
        assert_eq!(q.try_push('a'), None);
        assert_eq!(q.try_push('b'), None);
        assert_eq!(q.try_pop(), Some('a'));
        assert_eq!(q.try_push('c'), None);
        assert_eq!(q.iter().copied().collect::<String>(), "bc");
        assert_eq!(q.front(), Some(&'b'));
        assert_eq!(q.try_pop(), Some('b'));
        assert_eq!(q.try_pop(), Some('c'));
        assert_eq!(q.try_pop(), None);
        assert!(q.is_empty());
    }
}
