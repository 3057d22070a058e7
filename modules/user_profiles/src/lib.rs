//! Free-form user profiles: a few fixed columns plus JSON `profile`,
//! `tags` and `preferences`, merged key by key on update. Served under
//! `/api/users`.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

// === MODULE WIRING ===
pub mod module;
pub use module::UserProfiles;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
