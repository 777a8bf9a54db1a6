//! Errors surfaced by explicit capacity reservation.
//!
//! Ordinary map operations never fail; only `try_reserve` and the
//! `try_with_capacity*` constructors report these.

use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ReserveError {
    /// The bucket count needed for the requested entries does not fit in `usize`.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator refused the bucket array.
    #[error("failed to allocate a table of {buckets} buckets")]
    AllocFailed { buckets: usize },
}
