//! Fairway Dispatch — routes inbound envelopes to statically-typed saga
//! handlers and publishes their results.

mod dispatcher;

pub use dispatcher::{DispatchError, DispatchReceipt, Dispatcher};
