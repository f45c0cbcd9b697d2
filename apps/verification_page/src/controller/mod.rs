//! Controller layer: session state, actions, the pure reducer and the store
//! that applies it.

pub mod actions;
pub mod reducer;
pub mod store;

pub use actions::{Action, ElementFields, PageLoad};
pub use reducer::{reduce, Session};
pub use store::StateStore;
