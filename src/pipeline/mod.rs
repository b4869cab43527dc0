//! The extraction orchestration pipeline.
//!
//! Each submodule implements exactly one stage. Keeping stages separate
//! makes each independently testable and lets flows compose only what they
//! need (single-call flows skip reconcile/fanout entirely).
//!
//! ## Data Flow
//!
//! ```text
//! decode ──▶ shape ──▶ retry ──▶ client ──▶ reconcile / fanout
//! (data-URI) (payload) (backoff) (engine)   (batch completeness)
//! ```
//!
//! 1. [`decode`]    — normalise an encoded document reference into content
//!    the engine accepts, or reject it before any engine call
//! 2. [`shape`]     — build the wire payload with exactly one content carrier
//! 3. [`retry`]     — bounded-attempt exponential backoff around the call;
//!    the only stage that sleeps
//! 4. [`client`]    — schema-contract enforcement; the only stage with
//!    network I/O (through the engine boundary)
//! 5. [`reconcile`] — one result per submitted id, placeholders for drops
//! 6. [`fanout`]    — concurrent per-item calls with isolated failure

pub mod client;
pub mod decode;
pub mod fanout;
pub mod reconcile;
pub mod retry;
pub mod shape;
