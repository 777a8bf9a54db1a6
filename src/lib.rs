//! chaintree-map: a separate-chaining hash map whose crowded buckets turn
//! into red-black trees.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a key→value map built from first principles, with collision
//!   handling that degrades to `O(log n)` per bucket instead of `O(n)`.
//! - Layers:
//!   - `hash_index`: 32-bit scrambled hash of the key's native hash and
//!     the bucket index derived from it.
//!   - `chain_bucket` / `tree_bucket`: the two bucket representations,
//!     written as free functions over a shared entry arena.
//!   - `bucket_store`: bucket array, arena and length counter; owns the
//!     treeify trigger.
//!   - `resize`: doubling and relinking; explicit reservation.
//!   - `ChainTreeMap<K, V, S>`: public façade; hashes keys, renders.
//!
//! Constraints
//! - Single-threaded: mutation needs `&mut self`; no interior mutability.
//! - Capacity is a power of two, starting at [`INITIAL_CAPACITY`].
//! - A chain that reaches [`TREEIFY_THRESHOLD`] entries becomes a tree when
//!   the table has at least [`MIN_TREEIFY_CAPACITY`] buckets; smaller
//!   tables double instead. Trees never turn back into chains in place.
//! - The table doubles once `len > capacity * LOAD_FACTOR`.
//! - Keys need `Hash + Ord`; the `Ord` must agree with `Eq` and `Hash`.
//!
//! Arena and links
//! - All entries live in one `slotmap::SlotMap`. Chain `next` links and
//!   tree `parent`/`left`/`right` links are generational keys into it, so
//!   back-references never form ownership cycles.
//! - Each entry stores its hash. Resizing relinks entries using the stored
//!   hash and never calls `K: Hash`; tree placement still calls `K: Ord`.
//!
//! Absent key
//! - The map can hold one entry under an absent key (hash 0, ordered before
//!   every present key). It is reached through `put_absent`, `get_absent`
//!   and friends, and renders as `<absent>`.
//!
//! Notes and non-goals
//! - Iteration order is bucket order, then chain order or in-order tree
//!   order; it changes whenever the table resizes.
//! - No concurrent access, no persistence.
//! - Resizing never changes `len`.

mod bucket_store;
mod chain_bucket;
mod chaintree_map;
mod chaintree_map_proptest;
mod entry;
mod error;
mod hash_index;
mod iter;
mod resize;
mod tree_bucket;

// Public surface
pub use bucket_store::{INITIAL_CAPACITY, LOAD_FACTOR, MIN_TREEIFY_CAPACITY, TREEIFY_THRESHOLD};
pub use chaintree_map::{ChainTreeMap, DebugInfo};
pub use error::ReserveError;
pub use iter::{Iter, Keys, Values, ValuesMut};
