pub mod directory;
pub mod mode;
pub mod ports;
pub mod services;
pub mod validation;
