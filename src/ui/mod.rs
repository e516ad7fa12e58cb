//! Terminal interaction layer: state machine, rendering and input.

pub mod controller;
pub mod input;
pub mod renderer;
pub mod state;

pub use controller::StateController;
pub use input::{LineSource, StdinLineSource};
pub use renderer::Renderer;
pub use state::{AppState, Menu};
