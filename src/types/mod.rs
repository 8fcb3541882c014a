pub mod civil;
pub mod interval;
pub mod observation;
pub mod serial_date;
pub mod summary;
