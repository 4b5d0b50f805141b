//! VERSA Store — in-memory implementation of the `versa-core`
//! repository contracts.
//!
//! The durable relational store is an external collaborator; this crate
//! is the reference backend the services and test suites run against.
//! All tables live behind a single `RwLock`, so every compound mutation
//! (enterprise + owner context, partner-context create/remove, default
//! demotion) holds one write guard for its whole check-then-write
//! sequence — the transactional boundary a SQL backend would provide
//! with `BEGIN`/`COMMIT`.

mod repository;
mod store;

pub use store::MemoryStore;
