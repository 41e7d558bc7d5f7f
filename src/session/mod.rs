//! AR session abstraction for cloud anchor hosting and resolving
//!
//! The session (tracking, plane detection, rendering) lives outside this
//! crate. It only has to expose the two asynchronous cloud anchor primitives
//! described by [`ArSession`].

pub mod ar_session;
pub mod mock;
pub mod error;

pub use ar_session::{ArSession, HostCompletion, ResolveCompletion};
pub use mock::{MockSession, PendingHostTask, PendingResolveTask};
pub use error::{SessionError, SessionResult};
