//! Typed user directory: fixed schema, unique `username` / `email`, full CRUD
//! under `/users`.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{client, error, model};

// === MODULE WIRING ===
pub mod module;
pub use module::UsersInfo;

// === INTERNAL MODULES ===
// Exposed for tests; other crates should go through `contract`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
