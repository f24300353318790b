//! Role-scoped session client for the hostel complaint portal.
//!
//! Students, wardens and admins each get an isolated session: a bearer
//! token mirror, an HTTP client that silently refreshes an expired token and
//! replays the call once, a route guard that admits protected views only
//! after a live server check, and a logout that tears everything down.
pub mod client;
pub mod config;
pub mod context;
pub mod cookies;
pub mod error;
pub mod guard;
pub mod login;
pub mod logout;
pub mod navigation;
pub mod profile;
pub mod role;
pub mod storage;
pub mod store;

pub use client::{ApiRequest, ApiResponse, RoleClient};
pub use context::{SessionContext, SessionParts};
pub use error::{SessionError, SessionResult};
pub use guard::{GuardState, RouteGuard, View};
pub use role::Role;
