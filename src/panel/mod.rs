//! Chat panel and widget chrome
//!
//! The widget opens and closes panels; a panel owns one conversation session and one
//! audio recorder, and renders them into a `PanelView`.

mod panel;
mod view;
mod widget;

pub use panel::{is_submit_key, ChatPanel, RecordingStart};
pub use view::{MessageView, PanelView};
pub use widget::{ChatWidget, DeviceProvider};
