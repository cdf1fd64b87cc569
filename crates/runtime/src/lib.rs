pub mod budget;
pub mod debounce;
pub mod event_bus;
pub mod metrics;
pub mod tween;

pub use budget::*;
pub use debounce::*;
pub use event_bus::*;
pub use metrics::*;
pub use tween::*;
