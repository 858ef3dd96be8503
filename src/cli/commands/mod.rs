//! Command implementations.

mod chat;
mod demo;
mod serve;
mod video;

pub use chat::run_chat;
pub use demo::run_demo;
pub use serve::run_serve;
pub use video::run_video;
