//! TaskNest Console - in-memory task management for one terminal session
//!
//! The standalone sibling of `tasknest-api`: the same task vocabulary
//! (title, description, priority, tags) without accounts, persistence,
//! or a network surface. Everything lives in a [`manager::TaskManager`]
//! owned by the process and is gone on exit.
//!
//! # Modules
//!
//! - `model` - Task data, priority levels, and validation
//! - `manager` - CRUD, search, filter, sort, and stats over the task list
//! - `ui` - Interactive menu loop and table rendering

pub mod manager;
pub mod model;
pub mod ui;
