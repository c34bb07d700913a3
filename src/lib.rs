pub mod acquisition;
pub mod hid;
pub mod measurement;
pub mod mqtt;
pub mod report;
