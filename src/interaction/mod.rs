mod debounce;
mod input_adapter;
mod subscription;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use debounce::Debouncer;
pub use input_adapter::{
    InputAction, InputAdapter, InputTuning, resolve_brush_range, resolve_click_range,
    resolve_drag_range, resolve_keyboard_range,
};
pub use subscription::InputSubscription;
pub(crate) use subscription::InputAttachment;

/// Keys the panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationKey {
    ArrowLeft,
    ArrowRight,
    /// Any key without a timeline binding.
    Other,
}

impl NavigationKey {
    /// Maps a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            _ => Self::Other,
        }
    }
}

/// Discrete user input delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Click on the chart body at the grid time under the pointer.
    Click { time: DateTime<Utc> },
    /// Arrow key, optionally with the resize modifier (shift) held.
    Key { key: NavigationKey, modifier: bool },
    /// Brush handles over the overview, as indices into the dense series.
    Brush { start_index: usize, end_index: usize },
    /// Body drag expressed as a fraction of the full series span.
    Drag { move_percent: f64 },
}

impl InputEvent {
    #[must_use]
    pub fn key(key: &str, modifier: bool) -> Self {
        Self::Key {
            key: NavigationKey::from_dom_key(key),
            modifier,
        }
    }
}
