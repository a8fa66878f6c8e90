//! timeline-panel: headless core of a network-traffic timeline panel.
//!
//! The crate turns sparse per-minute metric buckets into a dense grid, keeps
//! an operator selection with a padded view window, and maps keyboard, click,
//! brush and drag inputs onto debounced selection updates. Rendering, HTTP
//! transport and the dashboard bus are collaborators behind small traits.

pub mod api;
pub mod backend;
pub mod core;
pub mod error;
pub mod events;
pub mod interaction;
pub mod telemetry;

pub use api::{TimelineConfig, TimelinePanel};
pub use error::{TimelineError, TimelineResult};
