pub mod import;
pub mod players;
pub mod stats;
