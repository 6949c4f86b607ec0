//! chained-collections: a separate-chaining `HashTable` and an arena-backed
//! doubly-linked `LinkedSequence`, each with fail-fast cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Two independent, single-threaded structures sharing only the error
//!   type and the generation counter used to detect stale cursors.
//!   - HashTable<K, V, S>: bucket array of singly-linked chains of boxed
//!     entries. Grows by 1.5x (at least one bucket) before a `put` that
//!     finds `len / capacity >= load_factor`.
//!   - LinkedSequence<T>: nodes in a `SlotMap`, linked both ways by
//!     generational keys. Index lookups start from the nearer end.
//!
//! Constraints
//! - Single-threaded; no internal locking.
//! - Every structural mutation bumps a per-structure `Generation`. Value
//!   overwrites (`HashTable::put` on an existing key, `LinkedSequence::set`)
//!   count as mutations too.
//! - The absent key is a separate slot at the API level (`put_null`,
//!   `get_null`, ...) and always routes to bucket 0.
//!
//! Why detached cursors?
//! - A borrowing `Iterator` (`iter()`) already rules out mutation while it
//!   is alive, so it can never go stale. Cursors hold no borrow: they carry
//!   a position and a `Stamp` and take the structure on every call. That
//!   lets callers interleave direct mutation with iteration, and the stamp
//!   turns such misuse into `CollectionError::ConcurrentModification`.
//! - Removing through a cursor resynchronizes its stamp.
//! - Stamps also record which structure issued them; a cursor handed any
//!   other structure fails with `CollectionError::WrongCollection`.
//!
//! Resizing
//! - Entries keep their precomputed `u64` hash. A resize moves the existing
//!   boxes into a fresh bucket array (appending, so chain order is kept)
//!   and counts them; a count that disagrees with `len` surfaces as
//!   `CollectionError::InternalConsistency` instead of silently losing
//!   entries.
//!
//! Notes and non-goals
//! - Not `Send`-aware beyond what the element types provide; no
//!   synchronization and no serialization.
//! - `HashTable::keys` is naturally ordered (`BTreeSet`), which requires
//!   `K: Ord`; `iter`/`values` follow bucket order and are deterministic
//!   for a given table state only.
//! - `LinkedSequence::sub_list` takes any `RangeBounds<usize>`, so both the
//!   exclusive `a..b` and inclusive `a..=b` forms are available.

pub mod config;
pub mod error;
pub mod generation;
pub mod hash_table;
mod hash_table_proptest;
pub mod linked_sequence;
mod linked_sequence_proptest;

// Public surface
pub use config::TableConfig;
pub use error::{CollectionError, Result};
pub use hash_table::{HashTable, TableCursor};
pub use linked_sequence::{LinkedSequence, ListCursor};
