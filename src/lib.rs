pub mod allocator;
pub mod config;
pub mod report;
pub mod request;
pub mod simulation;
