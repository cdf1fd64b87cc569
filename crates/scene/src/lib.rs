pub mod marker_state;
pub mod selection;
pub mod visibility;

pub use marker_state::*;
pub use selection::*;
pub use visibility::*;
