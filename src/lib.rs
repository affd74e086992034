pub mod auth;
pub mod board;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod habits;
pub mod journal;
pub mod models;
pub mod store;
pub mod tui;
pub mod utils;
pub mod view;

pub use auth::{AuthProvider, Session, SessionFile};
pub use board::TaskBoard;
pub use calendar::Zone;
pub use config::Config;
pub use database::Database;
pub use models::{Habit, JournalEntry, Task, TimeSlot};
pub use utils::Profile;
