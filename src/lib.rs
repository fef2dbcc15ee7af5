//! Velore Storefront
//!
//! Client-side core of the Velore fashion store.
//!
//! ## Features
//! - Email verification with a six-cell one-time code
//! - Resend cooldown and resend cap
//! - Cart pricing (promo, shipping threshold, tax)
//! - Shop filtering and sorting

pub mod config;
pub mod domain;
pub mod services;

use thiserror::Error;

pub use config::Config;
pub use domain::aggregates::{Route, VerificationFlow, VerifyView};
pub use services::{AuthClient, VerificationSession};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Api(#[from] services::ApiError),

    #[error("Storage error: {0}")]
    Store(#[from] services::identity::StoreError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
