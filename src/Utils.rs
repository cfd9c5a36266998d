//! different utility modules used throughout the project
/// logger setup and saving of jacobians into file
pub mod logger;
