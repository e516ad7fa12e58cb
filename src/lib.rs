//! # claims-terminal
//!
//! An interactive, line-driven terminal for a health-services claims office.
//! Operators log in with their account number, navigate role-specific menus,
//! and build records (accounts, service claims) one validated field at a
//! time.
//!
//! The crate splits into a synchronous [`backend`] (domain models, builders,
//! services and file-backed storage) and a [`ui`] layer (the application
//! state machine, renderer and input source) driven by `main`.

pub mod backend;
pub mod ui;
