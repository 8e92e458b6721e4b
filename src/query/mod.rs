pub mod output;
pub mod show;
pub mod stats;
