pub mod directory;
pub mod worker;
