//! Use Cases Layer: Memory Management
//!
//! Places process images into a fixed-size, flat user memory pool. Every
//! process occupies one contiguous run of slots whose length is its size.
//!
//! ## Allocation Strategies
//!
//! - **[`firstfit`](firstfit/index.html)**: lowest-addressed window that fits
//!
//! - **[`bestfit`](bestfit/index.html)**: start of the smallest free run that
//!   fits, ties going to the lowest address
//!
//! - **[`nextfit`](nextfit/index.html)**: first window that fits, searching
//!   circularly from just past the previous allocation
//!
//! - **[`allocator`](allocator/index.html)**: strategy selection, the
//!   [`PlacementPolicy`] trait and allocation errors
//!
//! - **[`memory_manager`](memory_manager/index.html)**: the [`MemoryManager`]
//!   that owns the slot array and commits placements
//!
//! ## See Also
//!
//! - [`entities_process`](../../entities/entities_process/index.html): process
//!   ids and the [`MemoryOwner`](entities_process::MemoryOwner) capability

pub mod allocator;
pub mod bestfit;
pub mod firstfit;
pub mod memory_manager;
pub mod nextfit;

pub use allocator::{AllocationError, AllocationStrategy, PlacementPolicy, SearchFailure, Slot};
pub use memory_manager::{MemoryManager, Placement, Region};
