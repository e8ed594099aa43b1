pub mod format;
pub mod window;
