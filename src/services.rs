pub mod cycles;
pub mod tasks;
pub mod transfer;
