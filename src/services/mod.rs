pub mod directory;
pub mod session;
