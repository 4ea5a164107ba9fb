pub mod history;
pub mod wire;

pub use history::HistoryStore;
pub use wire::{decode_history, decode_update, encode_update};
