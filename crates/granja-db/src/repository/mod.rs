//! # Repository Implementations
//!
//! One repository per aggregate root:
//!
//! - [`product`] - Catalog store: CRUD, stock adjustments, low-stock scans
//! - [`order`] - The transactional order write path, listing, updates,
//!   deletes, and the dashboard aggregation
//! - [`settings`] - Read-through accessor for the singleton settings row
//! - [`user`] - Read-only summaries from the user directory

pub mod order;
pub mod product;
pub mod settings;
pub mod user;
