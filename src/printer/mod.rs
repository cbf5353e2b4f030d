mod printer;
mod report;

pub use printer::*;
pub use report::{Report, TIMESTAMP_FORMAT};
