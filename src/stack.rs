use alloc::boxed::Box;
use core::fmt;
use core::fmt::Debug;

struct Node<T> {
    value: T,
    next: Option<Box<Node<T>>>,
}

/// An owned singly linked LIFO stack.
///
/// Pushes and pops touch only the top node, so both are O(1) with no
/// reallocation of existing nodes. Deep stacks are released iteratively;
/// dropping a stack of a million elements does not recurse.
///
/// # Examples
///
/// ```
/// use twin_hash::Stack;
///
/// let mut stack = Stack::new();
/// stack.push(1);
/// stack.push(2);
/// assert_eq!(stack.peek(), Some(&2));
/// assert_eq!(stack.pop(), Some(2));
/// assert_eq!(stack.pop(), Some(1));
/// assert_eq!(stack.pop(), None);
/// ```
pub struct Stack<T> {
    top: Option<Box<Node<T>>>,
    len: usize,
}

impl<T> Stack<T> {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self { top: None, len: 0 }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the stack holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pushes `value` onto the top.
    pub fn push(&mut self, value: T) {
        let next = self.top.take();
        self.top = Some(Box::new(Node { value, next }));
        self.len += 1;
    }

    /// Removes and returns the top element.
    pub fn pop(&mut self) -> Option<T> {
        let node = self.top.take()?;
        let Node { value, next } = *node;
        self.top = next;
        self.len -= 1;
        Some(value)
    }

    /// Returns a reference to the top element.
    pub fn peek(&self) -> Option<&T> {
        self.top.as_deref().map(|node| &node.value)
    }

    /// Returns a mutable reference to the top element.
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.top.as_deref_mut().map(|node| &mut node.value)
    }

    /// Drops every element, top first.
    pub fn clear(&mut self) {
        let mut cursor = self.top.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
        self.len = 0;
    }

    /// Iterates over the elements from the top down.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            cursor: self.top.as_deref(),
        }
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Drop for Stack<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Borrowed top-down iterator over a [`Stack`].
pub struct Iter<'a, T> {
    cursor: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cursor?;
        self.cursor = node.next.as_deref();
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn test_push_pop_is_lifo() {
        let mut stack = Stack::new();
        for value in 0..10 {
            stack.push(value);
        }
        for expected in (0..10).rev() {
            assert_eq!(stack.pop(), Some(expected));
        }
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_peek_sees_the_top() {
        let mut stack = Stack::new();
        assert_eq!(stack.peek(), None);
        stack.push("bottom");
        stack.push("top");
        assert_eq!(stack.peek(), Some(&"top"));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_peek_mut_edits_the_top() {
        let mut stack = Stack::new();
        stack.push(41);
        if let Some(top) = stack.peek_mut() {
            *top += 1;
        }
        assert_eq!(stack.pop(), Some(42));
    }

    #[test]
    fn test_len_tracks_pushes_and_pops() {
        let mut stack = Stack::new();
        stack.push(1);
        stack.push(2);
        stack.push(3);
        assert_eq!(stack.len(), 3);
        stack.pop();
        assert_eq!(stack.len(), 2);
        stack.clear();
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_clear_then_reuse() {
        let mut stack = Stack::new();
        for value in 0..5 {
            stack.push(value);
        }
        stack.clear();
        assert!(stack.is_empty());
        stack.push(7);
        assert_eq!(stack.peek(), Some(&7));
    }

    #[test]
    fn test_iter_walks_top_down() {
        let mut stack = Stack::new();
        for value in [1, 2, 3] {
            stack.push(value);
        }
        let seen: Vec<&i32> = stack.iter().collect();
        assert_eq!(seen, [&3, &2, &1]);
    }

    #[test]
    fn test_deep_stack_releases_without_recursion() {
        let mut stack = Stack::new();
        for value in 0..100_000 {
            stack.push(value);
        }
        assert_eq!(stack.len(), 100_000);
        assert_eq!(stack.pop(), Some(99_999));
        drop(stack);
    }
}
