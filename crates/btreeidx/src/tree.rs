//! The tree algorithms themselves: search, proactive-split insert, and
//! traversal. Every function here is generic over [`NodeStore`] so the same
//! code drives both the real file-backed index and any in-memory test
//! double, mirroring the teacher's `TreeOps<'a, D: BlockDevice, A:
//! BlockAllocator>` split between algorithm and storage.

use crate::error::{BTreeError, Result};
use crate::index::NodeStore;
use crate::node::{Node, MAX_KEYS, MIN_KEYS_NONROOT};

/// Find the value associated with `key`, if present.
pub fn search<S: NodeStore>(store: &mut S, key: u64) -> Result<Option<u64>> {
    let root_id = store.root_block_id();
    if root_id == 0 {
        return Ok(None);
    }
    search_from(store, root_id, key)
}

fn search_from<S: NodeStore>(store: &mut S, block_id: u64, key: u64) -> Result<Option<u64>> {
    let node = store.read_node(block_id)?;
    match locate(&node, key) {
        Ok(idx) => Ok(Some(node.values[idx])),
        Err(idx) => {
            if node.is_leaf() {
                Ok(None)
            } else {
                search_from(store, node.children[idx], key)
            }
        }
    }
}

/// Binary search `node.keys[0..num_keys]` for `key`.
///
/// `Ok(i)` if `keys[i] == key`; `Err(i)` if not present, where `i` is the
/// index of the child subtree (or insertion point) that would contain it.
fn locate(node: &Node, key: u64) -> std::result::Result<usize, usize> {
    node.keys[..node.num_keys].binary_search(&key)
}

/// Insert `key` -> `value`. Fails with [`BTreeError::DuplicateKey`] if the
/// key is already present.
///
/// The duplicate check runs before any mutation: a key already present is
/// rejected without allocating, splitting, or writing anything, leaving the
/// tree byte-identical to before the call.
///
/// Uses proactive (top-down) splitting: on the way down from the root, any
/// full node encountered is split before descending into it, so a leaf
/// insertion never needs to propagate a split back up.
pub fn insert<S: NodeStore>(store: &mut S, key: u64, value: u64) -> Result<()> {
    if search(store, key)?.is_some() {
        return Err(BTreeError::DuplicateKey);
    }

    let root_id = store.root_block_id();

    if root_id == 0 {
        let mut root = store.allocate_node()?;
        root.num_keys = 1;
        root.keys[0] = key;
        root.values[0] = value;
        store.write_node(&root)?;
        store.set_root(root.block_id)?;
        return Ok(());
    }

    let mut root = store.read_node(root_id)?;
    if root.num_keys == MAX_KEYS {
        let new_root = split_root(store, &root)?;
        root = new_root;
    }
    insert_nonfull(store, root.block_id, key, value)
}

/// Split a full root in two, promoting its median key into a brand-new
/// root. The old root's block is kept in place as the lower half; only the
/// upper-half sibling and the new root are freshly allocated, so this
/// grows the tree by exactly two blocks. Returns the new root node.
fn split_root<S: NodeStore>(store: &mut S, root: &Node) -> Result<Node> {
    let mid = MAX_KEYS / 2;
    let median_key = root.keys[mid];
    let median_value = root.values[mid];

    let (left, right) = split_node_contents(store, root)?;

    let mut new_root = store.allocate_node()?;
    new_root.num_keys = 1;
    new_root.keys[0] = median_key;
    new_root.values[0] = median_value;
    new_root.children[0] = left.block_id;
    new_root.children[1] = right.block_id;

    reparent(store, &left, new_root.block_id)?;
    reparent(store, &right, new_root.block_id)?;

    store.write_node(&new_root)?;
    store.set_root(new_root.block_id)?;
    Ok(new_root)
}

/// Split `child` (the `child_index`-th child of `parent`) in two, inserting
/// the promoted median key into `parent` at the appropriate position.
/// `child`'s own block is kept in place as the lower half; only the
/// upper-half sibling is freshly allocated.
fn split_child<S: NodeStore>(
    store: &mut S,
    parent: &mut Node,
    child_index: usize,
    child: &Node,
) -> Result<()> {
    let mid = MAX_KEYS / 2;
    let median_key = child.keys[mid];
    let median_value = child.values[mid];

    let (left, right) = split_node_contents(store, child)?;

    // Shift parent's keys/values/children right to make room, then splice
    // in the promoted median and the new right sibling.
    for i in (child_index..parent.num_keys).rev() {
        parent.keys[i + 1] = parent.keys[i];
        parent.values[i + 1] = parent.values[i];
    }
    for i in (child_index + 1..=parent.num_keys).rev() {
        parent.children[i + 1] = parent.children[i];
    }
    parent.keys[child_index] = median_key;
    parent.values[child_index] = median_value;
    parent.children[child_index] = left.block_id;
    parent.children[child_index + 1] = right.block_id;
    parent.num_keys += 1;

    reparent(store, &left, parent.block_id)?;
    reparent(store, &right, parent.block_id)?;
    store.write_node(parent)?;
    Ok(())
}

/// Split `node`'s `MAX_KEYS` entries in place into a kept-in-place lower
/// half (reusing `node`'s own block — no block is abandoned) and a freshly
/// allocated sibling holding the upper half, dividing up its children (if
/// internal) to match. The caller is responsible for wiring the two halves
/// into the tree (promoting the median, pointing the parent at both).
fn split_node_contents<S: NodeStore>(store: &mut S, node: &Node) -> Result<(Node, Node)> {
    let mid = MAX_KEYS / 2;
    debug_assert_eq!(node.num_keys, MAX_KEYS);

    let mut left = node.clone();
    let mut right = store.allocate_node()?;
    right.parent_block_id = node.parent_block_id;

    left.num_keys = mid;
    left.keys[mid..].fill(0);
    left.values[mid..].fill(0);

    right.num_keys = MAX_KEYS - mid - 1;
    right.keys[..right.num_keys].copy_from_slice(&node.keys[mid + 1..]);
    right.values[..right.num_keys].copy_from_slice(&node.values[mid + 1..]);

    debug_assert!(left.num_keys >= MIN_KEYS_NONROOT || node.parent_block_id == 0);

    if !node.is_leaf() {
        left.children[mid + 1..].fill(0);
        right.children[..right.num_keys + 1].copy_from_slice(&node.children[mid + 1..]);

        for &child_id in &right.children[..right.num_keys + 1] {
            reparent_by_id(store, child_id, right.block_id)?;
        }
    }

    store.write_node(&left)?;
    store.write_node(&right)?;
    Ok((left, right))
}

fn reparent<S: NodeStore>(store: &mut S, node: &Node, parent_block_id: u64) -> Result<()> {
    reparent_by_id(store, node.block_id, parent_block_id)
}

fn reparent_by_id<S: NodeStore>(store: &mut S, block_id: u64, parent_block_id: u64) -> Result<()> {
    if block_id == 0 {
        return Ok(());
    }
    let mut node = store.read_node(block_id)?;
    if node.parent_block_id != parent_block_id {
        node.parent_block_id = parent_block_id;
        store.write_node(&node)?;
    }
    Ok(())
}

/// Descend from `block_id` (known not full) inserting `key` -> `value`,
/// proactively splitting any full child before descending into it.
fn insert_nonfull<S: NodeStore>(store: &mut S, block_id: u64, key: u64, value: u64) -> Result<()> {
    let mut node = store.read_node(block_id)?;
    debug_assert!(node.num_keys < MAX_KEYS);

    match locate(&node, key) {
        Ok(_) => Err(BTreeError::DuplicateKey),
        Err(idx) => {
            if node.is_leaf() {
                for i in (idx..node.num_keys).rev() {
                    node.keys[i + 1] = node.keys[i];
                    node.values[i + 1] = node.values[i];
                }
                node.keys[idx] = key;
                node.values[idx] = value;
                node.num_keys += 1;
                store.write_node(&node)?;
                Ok(())
            } else {
                let child_id = node.children[idx];
                let child = store.read_node(child_id)?;
                if child.num_keys == MAX_KEYS {
                    split_child(store, &mut node, idx, &child)?;
                    // The key we want may now belong in the promoted
                    // median itself, or in either new half; re-locate.
                    match locate(&node, key) {
                        Ok(_) => return Err(BTreeError::DuplicateKey),
                        Err(new_idx) => {
                            return insert_nonfull(store, node.children[new_idx], key, value)
                        }
                    }
                }
                insert_nonfull(store, child_id, key, value)
            }
        }
    }
}

/// A `(key, value, depth)` triple produced by [`preorder_with_depth`].
/// `depth` is `0` at the root, incrementing by one per level — used by
/// `print` for indentation and ignored by `extract`.
pub struct Visited {
    pub key: u64,
    pub value: u64,
    pub depth: usize,
}

/// Pre-order traversal of the whole tree: each node's own keys are visited
/// before its children, left to right. This is deliberately NOT sorted
/// order — it mirrors the on-disk node layout, matching the reference
/// implementation's traversal and the spec's required output order for
/// `print`/`extract`.
pub fn preorder_with_depth<S: NodeStore>(store: &mut S) -> Result<Vec<Visited>> {
    let mut out = Vec::new();
    let root_id = store.root_block_id();
    if root_id != 0 {
        visit_preorder(store, root_id, 0, &mut out)?;
    }
    Ok(out)
}

fn visit_preorder<S: NodeStore>(
    store: &mut S,
    block_id: u64,
    depth: usize,
    out: &mut Vec<Visited>,
) -> Result<()> {
    let node = store.read_node(block_id)?;
    for i in 0..node.num_keys {
        out.push(Visited {
            key: node.keys[i],
            value: node.values[i],
            depth,
        });
    }
    if !node.is_leaf() {
        for i in 0..=node.num_keys {
            let child_id = node.children[i];
            if child_id != 0 {
                visit_preorder(store, child_id, depth + 1, out)?;
            }
        }
    }
    Ok(())
}

/// Walk the whole tree checking structural invariants: key ordering within
/// each node, non-root key-count floor, and parent-pointer consistency.
/// Returns the first violation found, if any, as a human-readable message.
pub fn validate<S: NodeStore>(store: &mut S) -> Result<Option<String>> {
    let root_id = store.root_block_id();
    if root_id == 0 {
        return Ok(None);
    }
    validate_from(store, root_id, true)
}

fn validate_from<S: NodeStore>(
    store: &mut S,
    block_id: u64,
    is_root: bool,
) -> Result<Option<String>> {
    let node = store.read_node(block_id)?;

    if !is_root && node.num_keys < MIN_KEYS_NONROOT {
        return Ok(Some(format!(
            "block {block_id}: {} keys, below the minimum of {MIN_KEYS_NONROOT} for a non-root node",
            node.num_keys
        )));
    }

    for w in node.keys[..node.num_keys].windows(2) {
        if w[0] >= w[1] {
            return Ok(Some(format!(
                "block {block_id}: keys not strictly ascending ({} >= {})",
                w[0], w[1]
            )));
        }
    }

    if !node.is_leaf() {
        for i in 0..=node.num_keys {
            let child_id = node.children[i];
            if child_id == 0 {
                return Ok(Some(format!(
                    "block {block_id}: internal node missing child {i}"
                )));
            }
            let child = store.read_node(child_id)?;
            if child.parent_block_id != block_id {
                return Ok(Some(format!(
                    "block {child_id}: parent_block_id {} does not match actual parent {block_id}",
                    child.parent_block_id
                )));
            }
            if let Some(msg) = validate_from(store, child_id, false)? {
                return Ok(Some(msg));
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::BTreeIndex;
    use tempfile::NamedTempFile;

    fn opened() -> BTreeIndex {
        let tmp = NamedTempFile::new().unwrap();
        BTreeIndex::create(tmp.path()).unwrap()
    }

    #[test]
    fn insert_then_search_single_key() {
        let mut idx = opened();
        insert(&mut idx, 10, 100).unwrap();
        assert_eq!(search(&mut idx, 10).unwrap(), Some(100));
        assert_eq!(search(&mut idx, 11).unwrap(), None);
    }

    #[test]
    fn search_on_empty_tree_is_none() {
        let mut idx = opened();
        assert_eq!(search(&mut idx, 1).unwrap(), None);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut idx = opened();
        insert(&mut idx, 5, 50).unwrap();
        assert_eq!(insert(&mut idx, 5, 99).err(), Some(BTreeError::DuplicateKey));
    }

    #[test]
    fn duplicate_key_into_a_full_root_does_not_split_or_mutate() {
        let mut idx = opened();
        for k in 0..MAX_KEYS as u64 {
            insert(&mut idx, k, k * 10).unwrap();
        }
        let root_before = idx.root_block_id();
        assert_eq!(root_before, 1);

        // The root is completely full; a duplicate must be rejected before
        // the up-front split that would otherwise happen on the way down.
        assert_eq!(insert(&mut idx, 0, 999).err(), Some(BTreeError::DuplicateKey));
        assert_eq!(idx.root_block_id(), root_before);
        assert_eq!(search(&mut idx, 0).unwrap(), Some(0));
    }

    #[test]
    fn root_split_reuses_the_old_root_block_and_allocates_exactly_two_new_blocks() {
        let mut idx = opened();
        for k in 0..MAX_KEYS as u64 {
            insert(&mut idx, k, k * 10).unwrap();
        }
        assert_eq!(idx.root_block_id(), 1, "root not yet split");

        // The (MAX_KEYS + 1)-th insert forces the root split.
        insert(&mut idx, MAX_KEYS as u64, MAX_KEYS as u64 * 10).unwrap();

        // Block 1 (the old root) is reused as the left child; only the
        // right sibling (block 2) and the new root (block 3) are new.
        assert_eq!(idx.root_block_id(), 3);
        for k in 0..=MAX_KEYS as u64 {
            assert_eq!(search(&mut idx, k).unwrap(), Some(k * 10));
        }
        assert_eq!(validate(&mut idx).unwrap(), None);
    }

    #[test]
    fn inserting_past_max_keys_splits_and_stays_valid() {
        let mut idx = opened();
        for k in 0..100u64 {
            insert(&mut idx, k, k * 10).unwrap();
        }
        for k in 0..100u64 {
            assert_eq!(search(&mut idx, k).unwrap(), Some(k * 10));
        }
        assert_eq!(validate(&mut idx).unwrap(), None);
    }

    #[test]
    fn inserting_out_of_order_keys_stays_valid() {
        let mut idx = opened();
        let keys: Vec<u64> = vec![50, 10, 90, 30, 70, 20, 80, 40, 60, 5, 15, 25, 35, 45, 55];
        for &k in &keys {
            insert(&mut idx, k, k).unwrap();
        }
        for &k in &keys {
            assert_eq!(search(&mut idx, k).unwrap(), Some(k));
        }
        assert_eq!(validate(&mut idx).unwrap(), None);
    }

    #[test]
    fn preorder_visits_every_inserted_key_exactly_once() {
        let mut idx = opened();
        for k in 0..50u64 {
            insert(&mut idx, k, k + 1000).unwrap();
        }
        let visited = preorder_with_depth(&mut idx).unwrap();
        assert_eq!(visited.len(), 50);
        let mut seen: Vec<u64> = visited.iter().map(|v| v.key).collect();
        seen.sort_unstable();
        let expected: Vec<u64> = (0..50).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn survives_close_and_reopen() {
        let tmp = NamedTempFile::new().unwrap();
        {
            let mut idx = BTreeIndex::create(tmp.path()).unwrap();
            for k in 0..40u64 {
                insert(&mut idx, k, k * 2).unwrap();
            }
            idx.close().unwrap();
        }
        let mut idx = BTreeIndex::open(tmp.path()).unwrap();
        for k in 0..40u64 {
            assert_eq!(search(&mut idx, k).unwrap(), Some(k * 2));
        }
        assert_eq!(validate(&mut idx).unwrap(), None);
    }
}
