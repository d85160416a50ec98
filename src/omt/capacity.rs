use super::Omt;
use crate::raw::RawOmt;

impl<T> Omt<T> {
    /// Creates an empty sequence with room for at least `capacity` elements
    /// in the packed form.
    ///
    /// # Examples
    ///
    /// ```
    /// use omtree::Omt;
    ///
    /// let seq: Omt<i32> = Omt::with_capacity(32);
    /// assert!(seq.is_empty());
    /// assert!(seq.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Omt {
            raw: RawOmt::with_capacity(capacity),
        }
    }

    /// Returns the number of elements the current buffer can hold: value
    /// slots in the packed form, node slots in the tree form.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the bytes of heap owned by the sequence itself. Anything the
    /// elements point at is not counted.
    ///
    /// # Examples
    ///
    /// ```
    /// use omtree::Omt;
    ///
    /// let seq: Omt<u64> = Omt::new();
    /// assert_eq!(seq.memory_size(), core::mem::size_of::<Omt<u64>>());
    /// ```
    #[must_use]
    pub fn memory_size(&self) -> usize {
        self.raw.memory_size()
    }

    /// Returns true while the sequence is stored as a packed array rather
    /// than a tree.
    ///
    /// Bulk construction and boundary edits keep the packed form; the first
    /// mid-sequence insertion or removal switches to the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use omtree::Omt;
    ///
    /// let mut seq = Omt::from_sorted_slice(&[1, 2, 3, 4]);
    /// assert!(seq.is_packed());
    ///
    /// seq.insert_at(2, 9).unwrap();
    /// assert!(!seq.is_packed());
    /// ```
    #[must_use]
    pub fn is_packed(&self) -> bool {
        self.raw.is_packed()
    }
}
