pub mod config;
pub mod db;
pub mod diff;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod intake;
pub mod isolation;
pub mod lint;
pub mod model;
pub mod normalize;
pub mod report;
pub mod submission;
