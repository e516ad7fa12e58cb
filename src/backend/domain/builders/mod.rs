//! # Record Builders
//!
//! Field-by-field construction of domain records from raw operator input.
//!
//! A builder owns a partially-filled record and a cursor over its required
//! fields. One line of input is fed to the current field at a time: accepted
//! values are normalized and committed and the cursor advances to the next
//! unset field; rejected values leave the cursor in place and expose
//! structured errors for the renderer. Errors belong to the current attempt
//! only - a new attempt clears the previous one's errors, and no attempt can
//! corrupt previously accepted fields.

use thiserror::Error;

use crate::backend::domain::validation::FieldError;

pub mod account_builder;
pub mod period_builder;
pub mod transaction_builder;

pub use account_builder::AccountBuilder;
pub use period_builder::{Period, PeriodBuilder};
pub use transaction_builder::TransactionBuilder;

/// The driving contract shared by every builder. The controller feeds input
/// through it and the renderer reads prompts and errors through it; neither
/// reaches into builder internals.
pub trait FieldBuilder {
    /// Name of the field the cursor currently targets, or `None` once every
    /// required field has been accepted.
    fn current_field(&self) -> Option<&'static str>;

    /// Feed one line of raw input to the current field. Returns `true` when
    /// the value was accepted and the cursor advanced.
    fn set_current_field(&mut self, raw: &str) -> bool;

    /// True once the cursor has passed the last required field.
    fn buildable(&self) -> bool {
        self.current_field().is_none()
    }

    /// Structured errors from the most recent attempt only.
    fn errors(&self) -> &[FieldError];

    /// Clear all fields, errors and the cursor. Callable from any state.
    fn reset(&mut self);
}

/// Returned when `build()` is invoked before the builder is buildable.
/// Unreachable under correct driving; kept defensive rather than panicking.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("record is incomplete: still collecting {missing}")]
    Incomplete { missing: &'static str },
}
