pub mod config;
pub mod doctor;
pub mod launch;
pub mod plan;
