pub mod booking;
pub mod category;
pub mod service;
pub mod slot;
