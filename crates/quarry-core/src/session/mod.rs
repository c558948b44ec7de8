pub mod model;

pub use model::{ChatTurn, HistoryEntry, SessionState};
