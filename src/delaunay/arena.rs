/// A slot arena.
///
/// Triangulations are graphs full of cycles (vertices point to faces, faces point to vertices and
/// to each other), which are not very practical to express with references in Rust. Instead the
/// elements live in a [`Vec`] and refer to each other with [`usize`] indices.
///
/// Unlike a plain [`Vec`], removing an element leaves a hole in its slot instead of shifting the
/// following elements, so the indices of the remaining elements stay valid. Holes are reused by
/// later insertions.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Constructs a new empty arena.
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Constructs a new empty arena with room for `capacity` elements.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Returns the number of elements in the arena.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a new element to the arena. Returns the index of the element.
    pub(crate) fn add(&mut self, data: T) -> usize {
        self.len += 1;
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(data);
            idx
        } else {
            self.slots.push(Some(data));
            self.slots.len() - 1
        }
    }

    /// Removes the element with index `idx` and returns it, if it exists.
    pub(crate) fn remove(&mut self, idx: usize) -> Option<T> {
        let data = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(data)
    }

    /// Get a shared reference to the element with index `idx`, if it exists.
    pub(crate) fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx)?.as_ref()
    }

    /// Get an exclusive reference to the element with index `idx`, if it exists.
    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots.get_mut(idx)?.as_mut()
    }

    pub(crate) fn contains(&self, idx: usize) -> bool {
        self.get(idx).is_some()
    }

    /// Removes every element.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    /// An iterator over the arena's elements and their indices.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|data| (idx, data)))
    }

    /// A mutable iterator over the arena's elements and their indices.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_mut().map(|data| (idx, data)))
    }

    /// Gets the given index’ corresponding entry in the arena for in-place manipulation.
    pub(crate) fn entry(&mut self, idx: usize) -> Entry<'_, T> {
        Entry { idx, arena: self }
    }
}

/// A view into a single entry in an arena, which may or may not exist.
pub(crate) struct Entry<'a, T> {
    idx: usize,
    arena: &'a mut Arena<T>,
}

impl<T> Entry<'_, T> {
    pub(crate) fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut T),
    {
        if let Some(data) = self.arena.get_mut(self.idx) {
            f(data);
        }
        self
    }
}
