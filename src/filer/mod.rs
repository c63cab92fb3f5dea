//! Basic-auth file serving subsystem.
//!
//! # Data Flow
//! ```text
//! request → auth middleware (records activity) → method handler
//!     GET  ?action=get  → file contents
//!     GET  ?action=list → JSON directory listing
//!     POST              → multipart upload under the request path
//!     DELETE            → recursive remove
//! ```
//!
//! # Design Decisions
//! - Only authenticated requests reset the inactivity window
//! - Request paths are joined under the root; `..` components are rejected
//! - Idle shutdown reuses the supervisor's tracker + watchdog pair

pub mod handler;

pub use handler::{router, FilerState};
