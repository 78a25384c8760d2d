//! # TaskNest Console
//!
//! Interactive todo list for a single terminal session. Tasks are held
//! in memory only; use `tasknest-api` for the persistent, multi-user
//! service.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasknest-console
//! ```

use std::io;

use tasknest_console::manager::TaskManager;
use tasknest_console::ui;

fn main() -> io::Result<()> {
    let mut manager = TaskManager::new();
    ui::run(&mut manager, io::stdin().lock(), io::stdout().lock())
}
