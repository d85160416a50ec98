/// Search direction for [`Omt::find`](crate::Omt::find).
///
/// The comparator partitions the sequence into a `Less` prefix, an optional
/// `Equal` run, and a `Greater` suffix; `Direction` selects which boundary
/// element `find` returns.
///
/// # Examples
///
/// ```
/// use omtree::{Direction, Omt};
///
/// let seq = Omt::from_sorted_slice(&[10, 20, 30]);
///
/// // First element strictly above 15, and last element strictly below it.
/// assert_eq!(seq.find(Direction::Above, |x| x.cmp(&15)), Some((1, &20)));
/// assert_eq!(seq.find(Direction::Below, |x| x.cmp(&15)), Some((0, &10)));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Find the leftmost element for which the comparator answers
    /// [`Greater`](core::cmp::Ordering::Greater).
    Above,
    /// Find the rightmost element for which the comparator answers
    /// [`Less`](core::cmp::Ordering::Less).
    Below,
}
