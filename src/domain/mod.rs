pub mod config_string;
pub mod registration;
pub mod token;
