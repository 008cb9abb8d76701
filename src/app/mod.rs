pub mod fan_in;
pub mod report;
