pub mod actions;
pub mod app;
pub mod config;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod history;
pub mod models;
pub mod reminders;
pub mod state;
pub mod status;
pub mod storage;
pub mod store;
pub mod ticker;
pub mod time;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use status::{Progress, SlotMark, Status, StatusMode, evaluate, progress};
pub use storage::load_data;
pub use store::DayRepository;
