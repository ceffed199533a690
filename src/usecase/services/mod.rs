pub mod directory_service;
pub mod edit_service;
pub mod import_service;
