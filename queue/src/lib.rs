//! Pesaflow Pending Transaction Queue
//!
//! Ordered collection of not-yet-settled financial operations. Every
//! mutation writes the full queue snapshot through the persistent store, so
//! a process restart resumes with exactly the transactions that were queued.

pub mod queue;

pub use queue::PendingQueue;
