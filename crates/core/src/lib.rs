//! # Rollcall core
//!
//! Recurring event announcements, attendance tracking through reactions and
//! the weekly summary, independent of any concrete chat platform or database.
//!
//! - **attendance**: merges one user's reaction into an event's answers
//! - **lifecycle**: announces today's instance of each recurring template
//! - **rollover**: weekly summary and reset, at most once per week
//! - **orchestrator**: startup reconciliation, timer ticks, commands, reactions
//!
//! Collaborators are reached through the traits in [`ports`].

pub mod attendance;
pub mod commands;
pub mod errors;
pub mod find_or_create;
pub mod lifecycle;
pub mod locks;
pub mod memory;
pub mod models;
pub mod orchestrator;
pub mod ports;
pub mod provision;
pub mod render;
pub mod rollover;
pub mod timing;
