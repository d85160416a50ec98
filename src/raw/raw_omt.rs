use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::mem;

use smallvec::SmallVec;

use super::node::Node;
use super::pool::{NodeIdx, NodePool};

/// Scratch buffer for flattening a subtree during a rebuild.
type IdxBuf = SmallVec<[NodeIdx; 32]>;

/// The adaptive core backing `Omt`.
///
/// A sequence lives in exactly one of two representations at a time. The
/// packed form is a deque of values in order; its front and back slack
/// absorb boundary insertions and deletions. Any mutation that would break
/// the packed layout switches to the tree form, a weight-augmented binary
/// tree over the node pool. A tree whose pool has grown far past the live
/// count is packed again before the next mutation.
#[derive(Clone)]
pub(crate) struct RawOmt<T> {
    repr: Repr<T>,
}

#[derive(Clone)]
pub(crate) enum Repr<T> {
    Packed(VecDeque<T>),
    Tree(Tree<T>),
}

#[derive(Clone)]
pub(crate) struct Tree<T> {
    pub(crate) pool: NodePool<T>,
    pub(crate) root: Option<NodeIdx>,
}

/// Identifies the slot holding a subtree's root index: the tree root itself,
/// or a child link of a live node. Recording an anchor instead of a borrow
/// lets a descent note where a rebuild is due and come back to it after the
/// mutation has finished below.
#[derive(Clone, Copy)]
enum Anchor {
    Root,
    Left(NodeIdx),
    Right(NodeIdx),
}

impl<T> RawOmt<T> {
    pub(crate) const fn new() -> Self {
        Self {
            repr: Repr::Packed(VecDeque::new()),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            repr: Repr::Packed(VecDeque::with_capacity(capacity)),
        }
    }

    /// Takes ownership of an already-sorted buffer without copying it.
    pub(crate) fn from_sorted_vec(values: Vec<T>) -> Self {
        Self {
            repr: Repr::Packed(VecDeque::from(values)),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match &self.repr {
            Repr::Packed(deque) => deque.len(),
            Repr::Tree(tree) => tree.len() as usize,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Packed(deque) => deque.capacity(),
            Repr::Tree(tree) => tree.pool.capacity(),
        }
    }

    /// Bytes of heap owned by the container, excluding what elements point at.
    pub(crate) fn memory_size(&self) -> usize {
        let heap = match &self.repr {
            Repr::Packed(deque) => deque.capacity() * mem::size_of::<T>(),
            Repr::Tree(tree) => tree.pool.memory_size(),
        };
        mem::size_of::<Self>() + heap
    }

    pub(crate) fn is_packed(&self) -> bool {
        matches!(self.repr, Repr::Packed(_))
    }

    pub(crate) fn repr(&self) -> &Repr<T> {
        &self.repr
    }

    pub(crate) fn repr_mut(&mut self) -> &mut Repr<T> {
        &mut self.repr
    }

    /// Drops every element but keeps the backing buffer.
    pub(crate) fn clear(&mut self) {
        match &mut self.repr {
            Repr::Packed(deque) => deque.clear(),
            Repr::Tree(tree) => {
                tree.pool.clear();
                tree.root = None;
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        Some(match &self.repr {
            Repr::Packed(deque) => &deque[index],
            Repr::Tree(tree) => &tree.pool.node(tree.node_at(index as u32)).value,
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        Some(match &mut self.repr {
            Repr::Packed(deque) => &mut deque[index],
            Repr::Tree(tree) => {
                let idx = tree.node_at(index as u32);
                &mut tree.pool.node_mut(idx).value
            }
        })
    }

    /// Overwrites the element at `index`, returning the previous one. The
    /// structure is unchanged. Requires `index < len`.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn set_at(&mut self, index: usize, value: T) -> T {
        match &mut self.repr {
            Repr::Packed(deque) => mem::replace(&mut deque[index], value),
            Repr::Tree(tree) => {
                let idx = tree.node_at(index as u32);
                mem::replace(&mut tree.pool.node_mut(idx).value, value)
            }
        }
    }

    /// Inserts `value` at `index`. Requires `index <= len`.
    ///
    /// Boundary insertions on the packed form are absorbed by the deque
    /// slack; anything else goes through the tree form.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn insert_at(&mut self, index: usize, value: T) {
        let after = self.len() + 1;
        self.maybe_shrink_or_convert(after);
        if let Repr::Packed(deque) = &mut self.repr {
            if index == 0 {
                deque.push_front(value);
                return;
            }
            if index == deque.len() {
                deque.push_back(value);
                return;
            }
            self.convert_to_tree();
        }
        self.tree_mut().insert_at(index as u32, value);
    }

    /// Removes and returns the element at `index`. Requires `index < len`.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn remove_at(&mut self, index: usize) -> T {
        let after = self.len() - 1;
        self.maybe_shrink_or_convert(after);
        if let Repr::Packed(deque) = &mut self.repr {
            if index == 0 {
                return deque.pop_front().expect("length checked by the caller");
            }
            if index == deque.len() - 1 {
                return deque.pop_back().expect("length checked by the caller");
            }
            self.convert_to_tree();
        }
        self.tree_mut().remove_at(index as u32)
    }

    /// Smallest index whose comparator answer is `Equal`, with the element;
    /// on a miss, the index where an equal element would be inserted.
    pub(crate) fn find_zero<F>(&self, h: &mut F) -> Result<(usize, &T), usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        match &self.repr {
            Repr::Packed(deque) => {
                let at = deque.partition_point(|v| h(v) == Ordering::Less);
                match deque.get(at) {
                    Some(value) if h(value) == Ordering::Equal => Ok((at, value)),
                    _ => Err(at),
                }
            }
            Repr::Tree(tree) => match tree.find_zero(tree.root, h) {
                Ok((at, value)) => Ok((at as usize, value)),
                Err(at) => Err(at as usize),
            },
        }
    }

    /// Leftmost element whose comparator answer is `Greater`.
    pub(crate) fn find_above<F>(&self, h: &mut F) -> Option<(usize, &T)>
    where
        F: FnMut(&T) -> Ordering,
    {
        match &self.repr {
            Repr::Packed(deque) => {
                let at = deque.partition_point(|v| h(v) != Ordering::Greater);
                deque.get(at).map(|value| (at, value))
            }
            Repr::Tree(tree) => tree.find_above(tree.root, h).map(|(at, value)| (at as usize, value)),
        }
    }

    /// Rightmost element whose comparator answer is `Less`.
    pub(crate) fn find_below<F>(&self, h: &mut F) -> Option<(usize, &T)>
    where
        F: FnMut(&T) -> Ordering,
    {
        match &self.repr {
            Repr::Packed(deque) => {
                let at = deque.partition_point(|v| h(v) == Ordering::Less);
                at.checked_sub(1).map(|at| (at, &deque[at]))
            }
            Repr::Tree(tree) => tree.find_below(tree.root, h).map(|(at, value)| (at as usize, value)),
        }
    }

    /// Splits the sequence, keeping `[0, at)` and returning `[at, len)`.
    /// Both halves end up packed. Requires `at <= len`.
    pub(crate) fn split_off(&mut self, at: usize) -> Self {
        let right = self.packed_mut().split_off(at);
        Self {
            repr: Repr::Packed(right),
        }
    }

    /// Concatenates `other` after `self`. The caller guarantees `other`'s
    /// elements follow `self`'s in the logical order.
    pub(crate) fn append(&mut self, other: Self) {
        if other.len() == 0 {
            return;
        }
        if self.len() == 0 {
            *self = other;
            return;
        }
        let mut right = match other.repr {
            Repr::Packed(deque) => deque,
            Repr::Tree(tree) => {
                let capacity = tree.pool.capacity();
                tree.into_deque(capacity)
            }
        };
        self.packed_mut().append(&mut right);
    }

    /// Rebuilds the sequence through a per-element duplication hook.
    pub(crate) fn clone_with<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&T) -> T,
    {
        let values = match &self.repr {
            Repr::Packed(deque) => deque.iter().map(&mut f).collect(),
            Repr::Tree(tree) => {
                let mut values = VecDeque::with_capacity(tree.len() as usize);
                tree.for_each_in_order(tree.root, &mut |value| values.push_back(f(value)));
                values
            }
        };
        Self {
            repr: Repr::Packed(values),
        }
    }

    pub(crate) fn into_vec(self) -> Vec<T> {
        match self.repr {
            Repr::Packed(deque) => Vec::from(deque),
            Repr::Tree(tree) => {
                let len = tree.len() as usize;
                Vec::from(tree.into_deque(len))
            }
        }
    }

    /// Shrinks or re-packs a structure whose capacity has drifted far above
    /// the length it is about to have. `after` is the length the pending
    /// mutation will leave behind.
    fn maybe_shrink_or_convert(&mut self, after: usize) {
        let target = if after <= 2 { 4 } else { 2 * after };
        match &mut self.repr {
            Repr::Packed(deque) => {
                if deque.capacity() / 2 >= target {
                    deque.shrink_to(target);
                }
            }
            Repr::Tree(tree) => {
                // Re-packs at the target size, not at the old pool capacity.
                if tree.pool.capacity() / 2 >= target {
                    let tree = mem::replace(tree, Tree::new());
                    self.repr = Repr::Packed(tree.into_deque(target));
                }
            }
        }
    }

    fn convert_to_tree(&mut self) {
        if let Repr::Packed(deque) = &mut self.repr {
            let deque = mem::take(deque);
            self.repr = Repr::Tree(Tree::from_sorted(deque));
        }
    }

    fn convert_to_packed(&mut self) {
        if let Repr::Tree(tree) = &mut self.repr {
            let tree = mem::replace(tree, Tree::new());
            let capacity = tree.pool.capacity();
            self.repr = Repr::Packed(tree.into_deque(capacity));
        }
    }

    fn packed_mut(&mut self) -> &mut VecDeque<T> {
        self.convert_to_packed();
        match &mut self.repr {
            Repr::Packed(deque) => deque,
            Repr::Tree(_) => panic!("expected packed form"),
        }
    }

    fn tree_mut(&mut self) -> &mut Tree<T> {
        self.convert_to_tree();
        match &mut self.repr {
            Repr::Tree(tree) => tree,
            Repr::Packed(_) => panic!("expected tree form"),
        }
    }
}

impl<T> Tree<T> {
    const fn new() -> Self {
        Self {
            pool: NodePool::new(),
            root: None,
        }
    }

    pub(crate) fn len(&self) -> u32 {
        self.pool.weight_of(self.root)
    }

    /// Builds a perfectly weight-balanced tree over an already-sorted
    /// sequence, consuming it in order.
    #[allow(clippy::cast_possible_truncation)]
    fn from_sorted(values: VecDeque<T>) -> Self {
        let len = values.len();
        assert!(
            len <= NodeIdx::MAX,
            "`Tree::from_sorted()` - sequence exceeds the pool limit ({})",
            NodeIdx::MAX
        );
        let mut pool = NodePool::with_capacity(values.capacity().max(len));
        let mut values = values.into_iter();
        let root = Self::build_from_sorted(&mut pool, &mut values, len as u32);
        Self { pool, root }
    }

    fn build_from_sorted<I>(pool: &mut NodePool<T>, values: &mut I, count: u32) -> Option<NodeIdx>
    where
        I: Iterator<Item = T>,
    {
        if count == 0 {
            return None;
        }
        let left_count = count / 2;
        let left = Self::build_from_sorted(pool, values, left_count);
        let value = values.next().expect("sorted source yields its promised length");
        let idx = pool.alloc(Node::new(value));
        let right = Self::build_from_sorted(pool, values, count - left_count - 1);
        let node = pool.node_mut(idx);
        node.left = left;
        node.right = right;
        node.weight = count;
        Some(idx)
    }

    /// Moves every value out in order, leaving the tree empty. The deque is
    /// sized to `capacity`, or to the live count if that is larger.
    fn into_deque(mut self, capacity: usize) -> VecDeque<T> {
        let mut out = VecDeque::with_capacity(capacity.max(self.len() as usize));
        let root = self.root.take();
        self.drain_in_order(root, &mut out);
        out
    }

    fn drain_in_order(&mut self, idx: Option<NodeIdx>, out: &mut VecDeque<T>) {
        let Some(idx) = idx else { return };
        let node = self.pool.free(idx);
        self.drain_in_order(node.left, out);
        out.push_back(node.value);
        self.drain_in_order(node.right, out);
    }

    fn for_each_in_order<F>(&self, idx: Option<NodeIdx>, f: &mut F)
    where
        F: FnMut(&T),
    {
        let Some(idx) = idx else { return };
        let node = self.pool.node(idx);
        self.for_each_in_order(node.left, f);
        f(&node.value);
        self.for_each_in_order(node.right, f);
    }

    fn subtree(&self, anchor: Anchor) -> Option<NodeIdx> {
        match anchor {
            Anchor::Root => self.root,
            Anchor::Left(parent) => self.pool.node(parent).left,
            Anchor::Right(parent) => self.pool.node(parent).right,
        }
    }

    fn set_subtree(&mut self, anchor: Anchor, subtree: Option<NodeIdx>) {
        match anchor {
            Anchor::Root => self.root = subtree,
            Anchor::Left(parent) => self.pool.node_mut(parent).left = subtree,
            Anchor::Right(parent) => self.pool.node_mut(parent).right = subtree,
        }
    }

    /// The weight-balance predicate, evaluated as if a pending mutation had
    /// already adjusted the children (`+1` for a child about to gain an
    /// element, `-1` for one about to lose). A subtree fails once one child
    /// outweighs the other by more than two to one.
    fn is_out_of_balance(&self, idx: NodeIdx, left_mod: i32, right_mod: i32) -> bool {
        let node = self.pool.node(idx);
        let left = i64::from(self.pool.weight_of(node.left)) + i64::from(left_mod);
        let right = i64::from(self.pool.weight_of(node.right)) + i64::from(right_mod);
        left + 1 < (right + 2) / 2 || right + 1 < (left + 2) / 2
    }

    /// Descends to position `index`, bumping weights on the way down and
    /// noting the highest slot whose subtree the insertion unbalances; that
    /// one subtree is rebuilt after the new leaf is linked in.
    fn insert_at(&mut self, mut index: u32, value: T) {
        let mut anchor = Anchor::Root;
        let mut rebalance: Option<Anchor> = None;
        while let Some(cur) = self.subtree(anchor) {
            let left_weight = self.pool.weight_of(self.pool.node(cur).left);
            let goes_left = index <= left_weight;
            if rebalance.is_none() {
                let (left_mod, right_mod) = if goes_left { (1, 0) } else { (0, 1) };
                if self.is_out_of_balance(cur, left_mod, right_mod) {
                    rebalance = Some(anchor);
                }
            }
            self.pool.node_mut(cur).weight += 1;
            if goes_left {
                anchor = Anchor::Left(cur);
            } else {
                index -= left_weight + 1;
                anchor = Anchor::Right(cur);
            }
        }
        let leaf = self.pool.alloc(Node::new(value));
        self.set_subtree(anchor, Some(leaf));
        if let Some(anchor) = rebalance {
            self.rebalance(anchor);
        }
    }

    fn remove_at(&mut self, index: u32) -> T {
        let mut rebalance: Option<Anchor> = None;
        let value = self.remove_under(Anchor::Root, index, &mut rebalance);
        if let Some(anchor) = rebalance {
            self.rebalance(anchor);
        }
        value
    }

    /// Removes position `index` within the subtree held by `anchor`,
    /// decrementing weights on the way down. A node with two children trades
    /// its value for its successor's and the successor node is unlinked
    /// instead.
    fn remove_under(&mut self, anchor: Anchor, index: u32, rebalance: &mut Option<Anchor>) -> T {
        let cur = self.subtree(anchor).expect("position within the subtree");
        let node = self.pool.node(cur);
        let (left, right) = (node.left, node.right);
        let left_weight = self.pool.weight_of(left);
        match index.cmp(&left_weight) {
            Ordering::Less => {
                if rebalance.is_none() && self.is_out_of_balance(cur, -1, 0) {
                    *rebalance = Some(anchor);
                }
                self.pool.node_mut(cur).weight -= 1;
                self.remove_under(Anchor::Left(cur), index, rebalance)
            }
            Ordering::Equal => match (left, right) {
                (None, keep) | (keep @ Some(_), None) => {
                    self.set_subtree(anchor, keep);
                    self.pool.free(cur).value
                }
                (Some(_), Some(_)) => {
                    if rebalance.is_none() && self.is_out_of_balance(cur, 0, -1) {
                        *rebalance = Some(anchor);
                    }
                    self.pool.node_mut(cur).weight -= 1;
                    let successor = self.remove_under(Anchor::Right(cur), 0, rebalance);
                    mem::replace(&mut self.pool.node_mut(cur).value, successor)
                }
            },
            Ordering::Greater => {
                if rebalance.is_none() && self.is_out_of_balance(cur, 0, -1) {
                    *rebalance = Some(anchor);
                }
                self.pool.node_mut(cur).weight -= 1;
                self.remove_under(Anchor::Right(cur), index - left_weight - 1, rebalance)
            }
        }
    }

    /// Flattens the subtree held by `anchor` into an in-order index buffer
    /// and reassembles it perfectly balanced, reusing the nodes.
    fn rebalance(&mut self, anchor: Anchor) {
        let root = self.subtree(anchor);
        let mut order = IdxBuf::with_capacity(self.pool.weight_of(root) as usize);
        self.fill_in_order(root, &mut order);
        let rebuilt = self.rebuild_balanced(&order);
        self.set_subtree(anchor, rebuilt);
    }

    fn fill_in_order(&self, idx: Option<NodeIdx>, out: &mut IdxBuf) {
        let Some(idx) = idx else { return };
        let node = self.pool.node(idx);
        self.fill_in_order(node.left, out);
        out.push(idx);
        self.fill_in_order(node.right, out);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn rebuild_balanced(&mut self, order: &[NodeIdx]) -> Option<NodeIdx> {
        if order.is_empty() {
            return None;
        }
        let mid = order.len() / 2;
        let left = self.rebuild_balanced(&order[..mid]);
        let right = self.rebuild_balanced(&order[mid + 1..]);
        let node = self.pool.node_mut(order[mid]);
        node.left = left;
        node.right = right;
        node.weight = order.len() as u32;
        Some(order[mid])
    }

    /// Index of the node holding position `index`. Requires `index < len`.
    fn node_at(&self, mut index: u32) -> NodeIdx {
        let mut cur = self.root.expect("position within the tree");
        loop {
            let node = self.pool.node(cur);
            let left_weight = self.pool.weight_of(node.left);
            match index.cmp(&left_weight) {
                Ordering::Less => cur = node.left.expect("weights cover the subtree"),
                Ordering::Equal => return cur,
                Ordering::Greater => {
                    index -= left_weight + 1;
                    cur = node.right.expect("weights cover the subtree");
                }
            }
        }
    }

    fn find_zero<F>(&self, idx: Option<NodeIdx>, h: &mut F) -> Result<(u32, &T), u32>
    where
        F: FnMut(&T) -> Ordering,
    {
        let Some(idx) = idx else { return Err(0) };
        let node = self.pool.node(idx);
        let left_weight = self.pool.weight_of(node.left);
        match h(&node.value) {
            Ordering::Less => match self.find_zero(node.right, h) {
                Ok((at, value)) => Ok((at + left_weight + 1, value)),
                Err(at) => Err(at + left_weight + 1),
            },
            Ordering::Greater => self.find_zero(node.left, h),
            Ordering::Equal => match self.find_zero(node.left, h) {
                // Prefer an equal element further left.
                Ok(found) => Ok(found),
                Err(_) => Ok((left_weight, &node.value)),
            },
        }
    }

    fn find_above<F>(&self, idx: Option<NodeIdx>, h: &mut F) -> Option<(u32, &T)>
    where
        F: FnMut(&T) -> Ordering,
    {
        let idx = idx?;
        let node = self.pool.node(idx);
        let left_weight = self.pool.weight_of(node.left);
        if h(&node.value) == Ordering::Greater {
            match self.find_above(node.left, h) {
                Some(found) => Some(found),
                None => Some((left_weight, &node.value)),
            }
        } else {
            self.find_above(node.right, h)
                .map(|(at, value)| (at + left_weight + 1, value))
        }
    }

    fn find_below<F>(&self, idx: Option<NodeIdx>, h: &mut F) -> Option<(u32, &T)>
    where
        F: FnMut(&T) -> Ordering,
    {
        let idx = idx?;
        let node = self.pool.node(idx);
        let left_weight = self.pool.weight_of(node.left);
        if h(&node.value) == Ordering::Less {
            match self.find_below(node.right, h) {
                Some((at, value)) => Some((at + left_weight + 1, value)),
                None => Some((left_weight, &node.value)),
            }
        } else {
            self.find_below(node.left, h)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
impl<T> RawOmt<T> {
    /// Audits the structural invariants, panicking on any violation.
    pub(crate) fn check_invariants(&self) {
        let Repr::Tree(tree) = &self.repr else { return };

        let mut live = alloc::vec::Vec::new();
        tree.audit_subtree(tree.root, &mut live);
        assert_eq!(live.len(), self.len(), "root weight disagrees with the reachable set");

        // Reachable slots and free-list slots partition the pool.
        let mut seen = alloc::vec![false; tree.pool.slot_count()];
        for index in &live {
            assert!(!seen[*index], "slot reachable twice");
            assert!(tree.pool.is_occupied(*index), "reachable slot is vacant");
            seen[*index] = true;
        }
        for position in tree.pool.free_list_positions() {
            assert!(!seen[position], "slot both reachable and free");
            seen[position] = true;
        }
        assert!(seen.iter().all(|&visited| visited), "orphaned slot");
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
impl<T> Tree<T> {
    /// Checks the weight invariant below `idx`, collecting reachable slots.
    fn audit_subtree(&self, idx: Option<NodeIdx>, live: &mut alloc::vec::Vec<usize>) -> u32 {
        let Some(idx) = idx else { return 0 };
        live.push(idx.position());
        let node = self.pool.node(idx);
        let left = self.audit_subtree(node.left, live);
        let right = self.audit_subtree(node.right, live);
        assert_eq!(node.weight, 1 + left + right, "weight invariant violated");
        node.weight
    }

    fn depth(&self, idx: Option<NodeIdx>) -> u32 {
        let Some(idx) = idx else { return 0 };
        let node = self.pool.node(idx);
        1 + self.depth(node.left).max(self.depth(node.right))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn to_vec(raw: &RawOmt<u32>) -> Vec<u32> {
        raw.clone_with(|v| *v).into_vec()
    }

    /// Forces the tree form by touching the middle. Needs three elements.
    fn tree_of(values: &[u32]) -> RawOmt<u32> {
        let mut raw = RawOmt::from_sorted_vec(values.to_vec());
        assert!(raw.len() >= 3);
        let mid = raw.len() / 2;
        let probe = raw.remove_at(mid);
        raw.insert_at(mid, probe);
        assert!(!raw.is_packed());
        raw
    }

    #[test]
    fn boundary_mutations_stay_packed() {
        let mut raw = RawOmt::from_sorted_vec(alloc::vec![1, 2, 3, 4]);
        assert!(raw.is_packed());

        raw.remove_at(0);
        raw.insert_at(0, 9);
        assert!(raw.is_packed());
        assert_eq!(to_vec(&raw), [9, 2, 3, 4]);

        raw.insert_at(4, 5);
        raw.remove_at(4);
        assert!(raw.is_packed());
        assert_eq!(to_vec(&raw), [9, 2, 3, 4]);
    }

    #[test]
    fn middle_mutation_converts_to_tree() {
        let mut raw = RawOmt::from_sorted_vec((0..16).collect());
        raw.insert_at(7, 99);
        assert!(!raw.is_packed());
        raw.check_invariants();
        assert_eq!(raw.len(), 17);
        assert_eq!(raw.get(7), Some(&99));
    }

    #[test]
    fn sparse_tree_packs_itself_again() {
        let mut raw = RawOmt::from_sorted_vec((0..64).collect());
        raw.insert_at(32, 999);
        assert!(!raw.is_packed());

        // Front removals shrink the live count under the pool capacity;
        // once the pool is four times oversized the sequence re-packs.
        while raw.len() > 8 {
            raw.remove_at(0);
        }
        assert!(raw.is_packed());
    }

    #[test]
    fn skewed_inserts_keep_the_tree_shallow() {
        let mut raw = tree_of(&[0, 1, 2]);
        for value in 3..512u32 {
            raw.insert_at(1, value);
        }
        raw.check_invariants();

        let Repr::Tree(tree) = raw.repr() else {
            panic!("mid-sequence inserts must keep the tree form")
        };
        // A two-to-one weight balance bounds the depth well under 2 lg n.
        assert!(tree.depth(tree.root) <= 20, "depth {} for 512 elements", tree.depth(tree.root));
    }

    #[test]
    fn find_zero_reports_the_leftmost_equal() {
        let raw = tree_of(&[10, 20, 20, 20, 30]);
        let found = raw.find_zero(&mut |v: &u32| v.cmp(&20));
        assert_eq!(found.map(|(at, v)| (at, *v)), Ok((1, 20)));
        assert_eq!(raw.find_zero(&mut |v: &u32| v.cmp(&25)), Err(4));
        assert_eq!(raw.find_zero(&mut |v: &u32| v.cmp(&99)), Err(5));
    }

    #[test]
    fn directional_find_brackets_a_missing_key() {
        for raw in [RawOmt::from_sorted_vec(alloc::vec![10, 20, 30, 40, 50]), tree_of(&[10, 20, 30, 40, 50])] {
            assert_eq!(raw.find_above(&mut |v: &u32| v.cmp(&25)).map(|(at, v)| (at, *v)), Some((2, 30)));
            assert_eq!(raw.find_below(&mut |v: &u32| v.cmp(&25)).map(|(at, v)| (at, *v)), Some((1, 20)));
            assert_eq!(raw.find_below(&mut |v: &u32| v.cmp(&5)), None);
            assert_eq!(raw.find_above(&mut |v: &u32| v.cmp(&55)), None);
        }
    }

    proptest! {
        /// Replays a random operation sequence against a plain `Vec` model,
        /// auditing the structural invariants after every step.
        #[test]
        fn raw_matches_vec_model(operations in prop::collection::vec(strategy(), 1..400)) {
            let mut model: Vec<u32> = Vec::new();
            let mut raw: RawOmt<u32> = RawOmt::new();

            for operation in operations {
                match operation {
                    Operation::InsertAt(at, value) => {
                        let at = at % (model.len() + 1);
                        model.insert(at, value);
                        raw.insert_at(at, value);
                    }
                    Operation::RemoveAt(at) => {
                        if model.is_empty() {
                            continue;
                        }
                        let at = at % model.len();
                        prop_assert_eq!(raw.remove_at(at), model.remove(at));
                    }
                    Operation::SetAt(at, value) => {
                        if model.is_empty() {
                            continue;
                        }
                        let at = at % model.len();
                        let old = core::mem::replace(&mut model[at], value);
                        prop_assert_eq!(raw.set_at(at, value), old);
                    }
                    Operation::Get(at) => {
                        let at = at % (model.len() + 1);
                        prop_assert_eq!(raw.get(at), model.get(at));
                    }
                    Operation::SplitAppend(at) => {
                        let at = at % (model.len() + 1);
                        let right = raw.split_off(at);
                        prop_assert_eq!(raw.len(), at);
                        raw.append(right);
                    }
                    Operation::Clear => {
                        model.clear();
                        raw.clear();
                    }
                }

                raw.check_invariants();
                prop_assert_eq!(raw.len(), model.len());
                prop_assert_eq!(to_vec(&raw), model.clone());
            }
        }

        /// Conversions in both directions preserve the sequence.
        #[test]
        fn conversion_round_trip(values in prop::collection::vec(any::<u32>(), 0..200)) {
            let mut raw = RawOmt::from_sorted_vec(values.clone());
            if !values.is_empty() {
                // Touch the middle so the packed form converts.
                let mid = values.len() / 2;
                let probe = raw.remove_at(mid);
                raw.insert_at(mid, probe);
                raw.check_invariants();
            }
            prop_assert_eq!(to_vec(&raw), values);
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        InsertAt(usize, u32),
        RemoveAt(usize),
        SetAt(usize, u32),
        Get(usize),
        SplitAppend(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            10 => (any::<usize>(), any::<u32>()).prop_map(|(at, value)| Operation::InsertAt(at, value)),
            6 => any::<usize>().prop_map(Operation::RemoveAt),
            3 => (any::<usize>(), any::<u32>()).prop_map(|(at, value)| Operation::SetAt(at, value)),
            3 => any::<usize>().prop_map(Operation::Get),
            2 => any::<usize>().prop_map(Operation::SplitAppend),
            1 => Just(Operation::Clear),
        ]
    }
}
