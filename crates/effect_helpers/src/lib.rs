mod app;
pub use app::*;

pub mod input;
pub mod messages;
pub mod theme;

mod host_communication;
pub use host_communication::*;

mod window_resizing;
