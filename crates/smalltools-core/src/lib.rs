pub mod backup;
pub mod bbox;
pub mod debug;
pub mod extract;
pub mod gif;
pub mod mirror;
pub mod sample;
