//! Porcelain commands (user-facing operations)
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `add`: Stage files
//! - `rm`: Unstage files
//! - `commit`: Commit the staged tree

pub mod add;
pub mod commit;
pub mod init;
pub mod rm;
