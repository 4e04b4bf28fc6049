pub mod runner;

pub use runner::{run, run_with_engine, ExpectedResults, Grader};
