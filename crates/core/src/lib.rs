pub mod alignment;
pub mod shared;
