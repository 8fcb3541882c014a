pub mod error;
pub mod serial_clock;
