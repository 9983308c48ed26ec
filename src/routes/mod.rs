// # Routes Module
//
// HTTP route handlers, grouped by API area. Each group exposes a
// `create_*_routes()` function that `server.rs` merges into the main router.
// Which of these need a bearer token is decided by the access policy, not here.

/// Health check endpoint
pub mod health;

/// Registration, login and logout
pub mod auth;

/// User lookups for authenticated callers
pub mod users;
