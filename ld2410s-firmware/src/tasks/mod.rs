//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod button;
pub mod radar;
pub mod telemetry;

pub use button::query_button_task;
pub use radar::{radar_task, Radar};
pub use telemetry::telemetry_task;
