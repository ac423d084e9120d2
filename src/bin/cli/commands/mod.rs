pub mod bridge;
pub mod cards;
pub mod history;
pub mod import;
pub mod init;
pub mod session;
