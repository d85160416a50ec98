use core::cmp::Ordering;

use super::Omt;
use crate::{Direction, Error};

impl<T> Omt<T> {
    /// Finds the leftmost element the comparator considers equal.
    ///
    /// The comparator answers how each stored element compares against the
    /// caller's probe: `Less` for elements before it, `Equal` for matches,
    /// `Greater` for elements after it. Its answers must be monotonically
    /// non-decreasing over the sequence; if they are not, the result is an
    /// arbitrary index, but the sequence itself is never corrupted.
    ///
    /// On success, returns the smallest matching index and its element. On a
    /// miss, returns `Err` with the index where an equal element would be
    /// inserted (the smallest `Greater` position, or `self.len()`), like
    /// [`slice::binary_search`](https://doc.rust-lang.org/std/primitive.slice.html#method.binary_search).
    ///
    /// # Examples
    ///
    /// ```
    /// use omtree::Omt;
    ///
    /// let seq = Omt::from_sorted_slice(&[10, 20, 30, 40, 50]);
    /// assert_eq!(seq.find_zero(|x| x.cmp(&30)), Ok((2, &30)));
    /// assert_eq!(seq.find_zero(|x| x.cmp(&25)), Err(2));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) comparator calls.
    pub fn find_zero<F>(&self, mut h: F) -> Result<(usize, &T), usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.raw.find_zero(&mut h)
    }

    /// Finds the element bracketing the comparator's zero point from the
    /// given side.
    ///
    /// With [`Direction::Above`], returns the leftmost element the
    /// comparator answers `Greater` for; with [`Direction::Below`], the
    /// rightmost element it answers `Less` for. Returns `None` when no
    /// element is on that side. The comparator contract is the same as for
    /// [`find_zero`](Omt::find_zero).
    ///
    /// A constant comparator turns this into a positional probe: answering
    /// `Greater` everywhere finds the first element, `Less` everywhere finds
    /// the last.
    ///
    /// # Examples
    ///
    /// ```
    /// use omtree::{Direction, Omt};
    ///
    /// let seq = Omt::from_sorted_slice(&[10, 20, 30, 40, 50]);
    ///
    /// assert_eq!(seq.find(Direction::Above, |x| x.cmp(&25)), Some((2, &30)));
    /// assert_eq!(seq.find(Direction::Below, |x| x.cmp(&25)), Some((1, &20)));
    /// assert_eq!(seq.find(Direction::Below, |x| x.cmp(&5)), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) comparator calls.
    pub fn find<F>(&self, direction: Direction, mut h: F) -> Option<(usize, &T)>
    where
        F: FnMut(&T) -> Ordering,
    {
        match direction {
            Direction::Above => self.raw.find_above(&mut h),
            Direction::Below => self.raw.find_below(&mut h),
        }
    }

    /// Inserts `value` where the comparator says it belongs, rejecting
    /// duplicates.
    ///
    /// The comparator contract is the same as for
    /// [`find_zero`](Omt::find_zero). If any element compares `Equal`, the
    /// sequence is unchanged. Otherwise the value is inserted before the
    /// leftmost `Greater` element (or at the end) and its position is
    /// returned.
    ///
    /// # Errors
    ///
    /// [`Error::KeyExists`] if an element comparing `Equal` is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use omtree::Omt;
    ///
    /// let mut seq = Omt::from_sorted_slice(&[10, 20, 30]);
    /// assert_eq!(seq.insert_by(25, |x| x.cmp(&25)), Ok(2));
    /// assert_eq!(seq.insert_by(25, |x| x.cmp(&25)), Err(omtree::Error::KeyExists));
    /// assert_eq!(seq.iter().copied().collect::<Vec<_>>(), [10, 20, 25, 30]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) amortized.
    pub fn insert_by<F>(&mut self, value: T, mut h: F) -> Result<usize, Error>
    where
        F: FnMut(&T) -> Ordering,
    {
        let at = match self.raw.find_zero(&mut h) {
            Ok(_) => return Err(Error::KeyExists),
            Err(at) => at,
        };
        self.raw.insert_at(at, value);
        Ok(at)
    }
}
