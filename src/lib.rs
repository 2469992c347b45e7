pub mod aggregate;
pub mod clean;
pub mod config;
pub mod district;
pub mod extract;
pub mod input;
pub mod mapping;
pub mod output;
pub mod reliability;
pub mod report;
pub mod stats;
