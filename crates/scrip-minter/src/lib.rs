//! Batch generation and validation engine for redemption codes.
//!
//! This crate turns one creation request into N independent,
//! uniquely-keyed redemption records. Core types are re-exported
//! from `scrip_core`.

pub mod error;
pub mod factory;
pub mod quota;
pub mod service;
pub mod validate;

pub use error::{MintError, ValidationError};
pub use factory::{CodeFactory, MintedBatch};
pub use quota::QuotaAllocator;
pub use service::{FieldPatch, Minter, MinterService};
pub use validate::{MintRequest, QuotaMode};
