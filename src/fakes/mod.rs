//! # Fake Services
//!
//! Test doubles for the authentication and cache dependencies a middleware under test
//! talks to. They return scripted results and never perform I/O.
//!
//! - [`FakeUserAuthTokenService`] - scripted session token lookups, creation, rotation
//! - [`InMemoryRemoteCache`] - process-local cache with TTLs
//!
//! Both are shared through `Arc`: the scenario keeps one handle so tests can script
//! results, and the middleware wired into the router keeps another.

mod cache;
mod token;

pub use cache::{CacheError, InMemoryRemoteCache, RemoteCache, RemoteCacheExt};
pub use token::{hash_token, FakeUserAuthTokenService, TokenError, UserToken, UserTokenService};
