pub mod actions;
pub mod config;
pub mod error;
pub mod insight;
pub mod reducer;
pub mod state;

pub use actions::*;
pub use error::*;
pub use insight::*;
pub use reducer::*;
pub use state::*;
