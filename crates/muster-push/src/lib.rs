//! # muster-push
//!
//! Notification domain for the Muster group-event coordination backend.
//!
//! This crate implements the notification fan-out and token-lifecycle
//! protocol:
//!
//! - **Token Registry**: idempotent attach/detach bookkeeping with global
//!   single-owner tokens
//! - **Recipient Resolver**: member fan-out with sender exclusion and
//!   group-scoped honoree rules
//! - **Notification Dispatcher**: multicast send, per-token report
//!   interpretation, and stale-token cleanup
//! - **Fan-out Facade**: the composition triggers and callables invoke
//!
//! ## Guarantees
//!
//! - After `attach(u, t)` exactly one user owns `t`, and it is `u`
//! - All multi-user token mutations commit as one atomic batch
//! - One `invalidate_many` call per dispatch, however many tokens failed
//!
//! Delivery to devices is explicitly **not** guaranteed — only correct
//! targeting and token hygiene.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod dispatcher;
pub mod error;
pub mod fanout;
pub mod message;
pub mod registry;
pub mod resolver;
pub mod transport;

pub use dispatcher::{DispatchSummary, NotificationDispatcher};
pub use error::{Error, Result};
pub use fanout::NotificationFanout;
pub use message::{Channel, MessageKind, PushMessage};
pub use registry::TokenRegistry;
pub use resolver::RecipientResolver;
pub use transport::{
    MemoryTransport, MulticastReport, NoopTransport, PushTransport, SendErrorCode, SendOutcome,
};
