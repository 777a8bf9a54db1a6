//! SearchTreeBucket: red-black tree of entries ordered by key.
//!
//! Nodes are arena entries; `parent`, `left` and `right` are `EntryKey`s and
//! a missing child is a black leaf. Roots are passed as `&mut Option<EntryKey>`
//! because rotations and removals may replace them.
//!
//! Ordering is by key comparison only (the absent key sorts first); hashes
//! are carried along but never compared here. All walks use explicit stacks.

use crate::entry::{compare_keys, Color, Entry, EntryKey, Slots};
use core::borrow::Borrow;
use core::cmp::Ordering;

enum Probe {
    Found(EntryKey),
    Vacant {
        parent: Option<EntryKey>,
        go_left: bool,
    },
}

fn probe<K, V, Q>(slots: &Slots<K, V>, root: Option<EntryKey>, key: Option<&Q>) -> Probe
where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
{
    let mut parent = None;
    let mut go_left = false;
    let mut cur = root;
    while let Some(n) = cur {
        let node = &slots[n];
        match compare_keys(key, node.key.as_ref()) {
            Ordering::Equal => return Probe::Found(n),
            Ordering::Less => {
                go_left = true;
                cur = node.left;
            }
            Ordering::Greater => {
                go_left = false;
                cur = node.right;
            }
        }
        parent = Some(n);
    }
    Probe::Vacant { parent, go_left }
}

pub(crate) fn find<K, V, Q>(
    slots: &Slots<K, V>,
    root: Option<EntryKey>,
    key: Option<&Q>,
) -> Option<EntryKey>
where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
{
    match probe(slots, root, key) {
        Probe::Found(n) => Some(n),
        Probe::Vacant { .. } => None,
    }
}

/// Insert or replace. Returns the previous value when the key was present.
pub(crate) fn insert<K, V>(
    slots: &mut Slots<K, V>,
    root: &mut Option<EntryKey>,
    hash: u32,
    key: Option<K>,
    value: V,
) -> Option<V>
where
    K: Ord,
{
    match probe(slots, *root, key.as_ref()) {
        Probe::Found(n) => Some(core::mem::replace(&mut slots[n].value, value)),
        Probe::Vacant { parent, go_left } => {
            let n = slots.insert(Entry::new(hash, key, value));
            link(slots, root, n, parent, go_left);
            None
        }
    }
}

/// Link an already-allocated entry whose key is not yet in the tree.
pub(crate) fn attach<K, V>(slots: &mut Slots<K, V>, root: &mut Option<EntryKey>, n: EntryKey)
where
    K: Ord,
{
    let at = probe(slots, *root, slots[n].key.as_ref());
    match at {
        Probe::Vacant { parent, go_left } => {
            slots[n].unlink();
            link(slots, root, n, parent, go_left);
        }
        Probe::Found(_) => debug_assert!(false, "attach called with a duplicate key"),
    }
}

fn link<K, V>(
    slots: &mut Slots<K, V>,
    root: &mut Option<EntryKey>,
    n: EntryKey,
    parent: Option<EntryKey>,
    go_left: bool,
) {
    {
        let node = &mut slots[n];
        node.parent = parent;
        node.left = None;
        node.right = None;
        node.color = Color::Red;
    }
    match parent {
        None => *root = Some(n),
        Some(p) if go_left => slots[p].left = Some(n),
        Some(p) => slots[p].right = Some(n),
    }
    insert_fixup(slots, root, n);
}

/// Remove the entry for `key`, returning its value.
pub(crate) fn remove<K, V, Q>(
    slots: &mut Slots<K, V>,
    root: &mut Option<EntryKey>,
    key: Option<&Q>,
) -> Option<V>
where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
{
    let z = find(slots, *root, key)?;
    unlink_node(slots, root, z);
    slots.remove(z).map(|e| e.value)
}

// Detach `z` from the tree, grafting its in-order successor into its place
// when it has two children.
fn unlink_node<K, V>(slots: &mut Slots<K, V>, root: &mut Option<EntryKey>, z: EntryKey) {
    let (z_left, z_right, z_parent, z_color) = {
        let e = &slots[z];
        (e.left, e.right, e.parent, e.color)
    };

    let removed_color;
    let x;
    let x_parent;
    match (z_left, z_right) {
        (None, _) => {
            removed_color = z_color;
            x = z_right;
            x_parent = z_parent;
            transplant(slots, root, z, z_right);
        }
        (Some(_), None) => {
            removed_color = z_color;
            x = z_left;
            x_parent = z_parent;
            transplant(slots, root, z, z_left);
        }
        (Some(zl), Some(zr)) => {
            let y = minimum(slots, zr);
            removed_color = slots[y].color;
            x = slots[y].right;
            if slots[y].parent == Some(z) {
                x_parent = Some(y);
            } else {
                x_parent = slots[y].parent;
                transplant(slots, root, y, x);
                slots[y].right = Some(zr);
                slots[zr].parent = Some(y);
            }
            transplant(slots, root, z, Some(y));
            slots[y].left = Some(zl);
            slots[zl].parent = Some(y);
            slots[y].color = z_color;
        }
    }

    if removed_color == Color::Black {
        delete_fixup(slots, root, x, x_parent);
    }

    let e = &mut slots[z];
    e.parent = None;
    e.left = None;
    e.right = None;
}

/// Put `v` where `u` hangs, fixing `v`'s parent link.
fn transplant<K, V>(
    slots: &mut Slots<K, V>,
    root: &mut Option<EntryKey>,
    u: EntryKey,
    v: Option<EntryKey>,
) {
    let up = slots[u].parent;
    match up {
        None => *root = v,
        Some(p) => {
            if slots[p].left == Some(u) {
                slots[p].left = v;
            } else {
                slots[p].right = v;
            }
        }
    }
    if let Some(v) = v {
        slots[v].parent = up;
    }
}

fn minimum<K, V>(slots: &Slots<K, V>, mut n: EntryKey) -> EntryKey {
    while let Some(l) = slots[n].left {
        n = l;
    }
    n
}

fn color<K, V>(slots: &Slots<K, V>, n: Option<EntryKey>) -> Color {
    n.map_or(Color::Black, |n| slots[n].color)
}

fn set_color<K, V>(slots: &mut Slots<K, V>, n: Option<EntryKey>, c: Color) {
    if let Some(n) = n {
        slots[n].color = c;
    }
}

fn rotate_left<K, V>(slots: &mut Slots<K, V>, root: &mut Option<EntryKey>, x: EntryKey) {
    let Some(y) = slots[x].right else {
        return;
    };
    let y_left = slots[y].left;
    slots[x].right = y_left;
    if let Some(b) = y_left {
        slots[b].parent = Some(x);
    }
    transplant(slots, root, x, Some(y));
    slots[y].left = Some(x);
    slots[x].parent = Some(y);
}

fn rotate_right<K, V>(slots: &mut Slots<K, V>, root: &mut Option<EntryKey>, x: EntryKey) {
    let Some(y) = slots[x].left else {
        return;
    };
    let y_right = slots[y].right;
    slots[x].left = y_right;
    if let Some(b) = y_right {
        slots[b].parent = Some(x);
    }
    transplant(slots, root, x, Some(y));
    slots[y].right = Some(x);
    slots[x].parent = Some(y);
}

fn insert_fixup<K, V>(slots: &mut Slots<K, V>, root: &mut Option<EntryKey>, mut z: EntryKey) {
    loop {
        let Some(p) = slots[z].parent else { break };
        if slots[p].color == Color::Black {
            break;
        }
        // A red parent is never the root, so the grandparent exists.
        let Some(g) = slots[p].parent else { break };
        if slots[g].left == Some(p) {
            let uncle = slots[g].right;
            if color(slots, uncle) == Color::Red {
                slots[p].color = Color::Black;
                set_color(slots, uncle, Color::Black);
                slots[g].color = Color::Red;
                z = g;
                continue;
            }
            if slots[p].right == Some(z) {
                z = p;
                rotate_left(slots, root, z);
            }
            let p = slots[z].parent.unwrap_or(z);
            let g = slots[p].parent.unwrap_or(p);
            slots[p].color = Color::Black;
            slots[g].color = Color::Red;
            rotate_right(slots, root, g);
        } else {
            let uncle = slots[g].left;
            if color(slots, uncle) == Color::Red {
                slots[p].color = Color::Black;
                set_color(slots, uncle, Color::Black);
                slots[g].color = Color::Red;
                z = g;
                continue;
            }
            if slots[p].left == Some(z) {
                z = p;
                rotate_right(slots, root, z);
            }
            let p = slots[z].parent.unwrap_or(z);
            let g = slots[p].parent.unwrap_or(p);
            slots[p].color = Color::Black;
            slots[g].color = Color::Red;
            rotate_left(slots, root, g);
        }
    }
    set_color(slots, *root, Color::Black);
}

fn delete_fixup<K, V>(
    slots: &mut Slots<K, V>,
    root: &mut Option<EntryKey>,
    mut x: Option<EntryKey>,
    mut parent: Option<EntryKey>,
) {
    while x != *root && color(slots, x) == Color::Black {
        let Some(p) = parent else { break };
        if slots[p].left == x {
            // x carries an extra black, so its sibling is a real node.
            let Some(mut w) = slots[p].right else { break };
            if slots[w].color == Color::Red {
                slots[w].color = Color::Black;
                slots[p].color = Color::Red;
                rotate_left(slots, root, p);
                let Some(nw) = slots[p].right else { break };
                w = nw;
            }
            let (wl, wr) = (slots[w].left, slots[w].right);
            if color(slots, wl) == Color::Black && color(slots, wr) == Color::Black {
                slots[w].color = Color::Red;
                x = Some(p);
                parent = slots[p].parent;
            } else {
                if color(slots, wr) == Color::Black {
                    set_color(slots, wl, Color::Black);
                    slots[w].color = Color::Red;
                    rotate_right(slots, root, w);
                    let Some(nw) = slots[p].right else { break };
                    w = nw;
                }
                slots[w].color = slots[p].color;
                slots[p].color = Color::Black;
                let wr = slots[w].right;
                set_color(slots, wr, Color::Black);
                rotate_left(slots, root, p);
                x = *root;
                parent = None;
            }
        } else {
            let Some(mut w) = slots[p].left else { break };
            if slots[w].color == Color::Red {
                slots[w].color = Color::Black;
                slots[p].color = Color::Red;
                rotate_right(slots, root, p);
                let Some(nw) = slots[p].left else { break };
                w = nw;
            }
            let (wl, wr) = (slots[w].left, slots[w].right);
            if color(slots, wl) == Color::Black && color(slots, wr) == Color::Black {
                slots[w].color = Color::Red;
                x = Some(p);
                parent = slots[p].parent;
            } else {
                if color(slots, wl) == Color::Black {
                    set_color(slots, wr, Color::Black);
                    slots[w].color = Color::Red;
                    rotate_left(slots, root, w);
                    let Some(nw) = slots[p].left else { break };
                    w = nw;
                }
                slots[w].color = slots[p].color;
                slots[p].color = Color::Black;
                let wl = slots[w].left;
                set_color(slots, wl, Color::Black);
                rotate_right(slots, root, p);
                x = *root;
                parent = None;
            }
        }
    }
    set_color(slots, x, Color::Black);
}

/// Left-to-right walk over a tree.
pub(crate) struct InOrder {
    stack: Vec<EntryKey>,
}

impl InOrder {
    pub(crate) fn new<K, V>(slots: &Slots<K, V>, root: EntryKey) -> Self {
        let mut walk = InOrder { stack: Vec::new() };
        walk.push_left_spine(slots, Some(root));
        walk
    }

    fn push_left_spine<K, V>(&mut self, slots: &Slots<K, V>, mut n: Option<EntryKey>) {
        while let Some(k) = n {
            self.stack.push(k);
            n = slots[k].left;
        }
    }

    pub(crate) fn next<K, V>(&mut self, slots: &Slots<K, V>) -> Option<EntryKey> {
        let k = self.stack.pop()?;
        self.push_left_spine(slots, slots[k].right);
        Some(k)
    }
}

/// Node, then left subtree, then right subtree.
pub(crate) fn pre_order<K, V>(slots: &Slots<K, V>, root: EntryKey) -> Vec<EntryKey> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(k) = stack.pop() {
        out.push(k);
        let e = &slots[k];
        if let Some(r) = e.right {
            stack.push(r);
        }
        if let Some(l) = e.left {
            stack.push(l);
        }
    }
    out
}

/// Black height of the tree, or a description of the first broken
/// invariant. Used by tests.
#[cfg(test)]
pub(crate) fn check<K: Ord, V>(slots: &Slots<K, V>, root: Option<EntryKey>) -> Result<usize, String> {
    let Some(r) = root else { return Ok(1) };
    if slots[r].parent.is_some() {
        return Err("root has a parent".into());
    }
    if slots[r].color != Color::Black {
        return Err("root is red".into());
    }
    // (node, black count above it)
    let mut stack = vec![(r, 0usize)];
    let mut height = None;
    while let Some((n, above)) = stack.pop() {
        let e = &slots[n];
        let here = above + usize::from(e.color == Color::Black);
        for (child, is_left) in [(e.left, true), (e.right, false)] {
            match child {
                Some(c) => {
                    let ce = &slots[c];
                    if ce.parent != Some(n) {
                        return Err("broken parent link".into());
                    }
                    if e.color == Color::Red && ce.color == Color::Red {
                        return Err("red node with red child".into());
                    }
                    let ord = compare_keys(ce.key.as_ref(), e.key.as_ref());
                    if (is_left && ord != Ordering::Less) || (!is_left && ord != Ordering::Greater) {
                        return Err("search order violated".into());
                    }
                    stack.push((c, here));
                }
                None => match height {
                    None => height = Some(here + 1),
                    Some(h) if h != here + 1 => return Err("unequal black height".into()),
                    Some(_) => {}
                },
            }
        }
    }
    Ok(height.unwrap_or(1))
}
