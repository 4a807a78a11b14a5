//! Input sources for fighters

pub mod scripted;
pub mod tracker;

pub use scripted::ScriptedController;
pub use tracker::InputTracker;
