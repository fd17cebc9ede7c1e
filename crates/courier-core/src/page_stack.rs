//! Stack of named surfaces, exactly one of which is visible.

/// One named surface on the stack.
#[derive(Debug)]
pub struct PageEntry<S> {
    pub name: String,
    pub surface: S,
}

/// Ordered stack of surfaces. The bottom entry is the home surface; entries
/// above it are overlays.
#[derive(Debug)]
pub struct PageStack<S> {
    entries: Vec<PageEntry<S>>,
}

impl<S> PageStack<S> {
    /// Create a stack holding a single home surface.
    pub fn new(name: impl Into<String>, surface: S) -> Self {
        Self {
            entries: vec![PageEntry {
                name: name.into(),
                surface,
            }],
        }
    }

    /// Push an entry on top. Names need not be unique.
    pub fn push(&mut self, name: impl Into<String>, surface: S) {
        self.entries.push(PageEntry {
            name: name.into(),
            surface,
        });
    }

    /// Remove the top entry. The last remaining entry is never removed.
    pub fn pop(&mut self) -> Option<PageEntry<S>> {
        if self.entries.len() <= 1 {
            return None;
        }
        self.entries.pop()
    }

    /// Collapse the stack to a single entry.
    pub fn switch_to(&mut self, name: impl Into<String>, surface: S) {
        self.entries.clear();
        self.push(name, surface);
    }

    /// Name of the visible entry.
    pub fn top(&self) -> Option<&str> {
        self.entries.last().map(|entry| entry.name.as_str())
    }

    pub fn top_entry(&self) -> Option<&PageEntry<S>> {
        self.entries.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut PageEntry<S>> {
        self.entries.last_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the stack holds at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names from bottom to top.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// The bottom (home) entry.
    pub fn base(&self) -> Option<&PageEntry<S>> {
        self.entries.first()
    }

    /// First entry, searching from the top, whose surface satisfies `predicate`.
    pub fn find_mut(&mut self, predicate: impl Fn(&S) -> bool) -> Option<&mut PageEntry<S>> {
        self.entries
            .iter_mut()
            .rev()
            .find(|entry| predicate(&entry.surface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_never_empties() {
        let mut stack = PageStack::new("home", 0);
        assert!(stack.pop().is_none());
        assert_eq!(stack.len(), 1);

        stack.push("detail", 1);
        stack.push("confirm", 2);
        assert_eq!(stack.pop().map(|e| e.surface), Some(2));
        assert_eq!(stack.pop().map(|e| e.surface), Some(1));
        assert!(stack.pop().is_none());
        assert_eq!(stack.top(), Some("home"));
    }

    #[test]
    fn test_switch_to_collapses() {
        let mut stack = PageStack::new("dashboard", 0);
        stack.push("detail", 1);
        stack.push("detail", 2);
        stack.switch_to("messages", 3);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.top(), Some("messages"));
        assert_eq!(stack.names(), vec!["messages"]);
    }

    #[test]
    fn test_find_mut_searches_from_top() {
        let mut stack = PageStack::new("a", 1);
        stack.push("b", 2);
        stack.push("c", 1);
        let found = stack.find_mut(|s| *s == 1).map(|e| e.name.clone());
        assert_eq!(found.as_deref(), Some("c"));
    }
}
