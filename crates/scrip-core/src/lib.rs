//! Core types and traits for the scrip redemption-code subsystem.
//!
//! This crate provides the shared entity model and the collaborator
//! contracts (clock, key generator, repository) used by the minting
//! engine, the storage backends, and the admin gateway.

pub mod clock;
pub mod code;
pub mod error;
pub mod keygen;
pub mod repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use code::{CodeStatus, RedemptionCode};
pub use error::{CoreError, StorageError};
pub use keygen::{KeyGenerator, SequentialKeyGenerator, UuidKeyGenerator};
pub use repository::{CodePage, Repository};
