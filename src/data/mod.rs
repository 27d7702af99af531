pub mod builder;
pub mod dose;
pub mod grid;
pub mod rates;
pub mod state;

pub use dose::*;
pub use grid::TimeGrid;
pub use rates::Rates;
pub use state::State;
