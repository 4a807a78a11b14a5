//! Arena Brawl - frame-stepped simulation core for a two-fighter platform brawler
//!
//! The `game` module holds the deterministic per-frame engine
//! (`game::Simulation`) and the real-time match loop around it
//! (`game::GameMatch`). Rendering, menus and raw input polling live
//! outside this crate; they feed `Controls` in and read `MatchMsg` out.

pub mod config;
pub mod game;
pub mod input;
pub mod util;
