pub mod backup;
pub mod core;
pub mod exchange;
pub mod roster;
pub mod stats;
