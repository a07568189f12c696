pub mod folder;
pub mod library;
pub mod open_file;
