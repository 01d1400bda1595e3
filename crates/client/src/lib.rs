//! `storefront-client`
//!
//! **Responsibility:** wiring. [`Storefront`] owns one catalog cache and one
//! cart store and is what a UI layer talks to; [`StorefrontConfig`] resolves
//! the process environment for native builds.

pub mod app;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;

pub use app::Storefront;
#[cfg(not(target_arch = "wasm32"))]
pub use config::StorefrontConfig;
