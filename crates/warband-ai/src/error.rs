//! Error types for the `warband-ai` crate.
//!
//! Decisions never fail with an error for an expected "cannot act" case;
//! those are [`Outcome::Declined`] values. [`AiError`] covers the few
//! primitive operations, such as resource consumption, whose failure the
//! caller translates into a decline reason.
//!
//! [`Outcome::Declined`]: crate::outcome::Outcome::Declined

use warband_types::ItemCode;

/// Errors from decision-engine primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AiError {
    /// A required item is held in insufficient quantity.
    #[error("insufficient {item}: wanted {requested} but only have {available}")]
    InsufficientResource {
        /// The short item.
        item: ItemCode,
        /// Quantity required.
        requested: u32,
        /// Quantity held.
        available: u32,
    },
}
