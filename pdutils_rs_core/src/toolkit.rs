pub mod duration;
pub mod logger;
pub mod signature;
