pub mod chart;
pub mod opt;
pub mod run_wrapper;
pub mod table;
pub mod trace;

pub mod error;
