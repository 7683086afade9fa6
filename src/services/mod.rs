pub mod chat;
pub mod preview;
pub mod turns;
