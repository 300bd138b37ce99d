//! Stateful stores of a repository
//!
//! - `loose`: one compressed file per object
//! - `database`: loose objects plus attached packs
//! - `index`: staging area and its folding into trees
//! - `workspace`: working directory file enumeration
//! - `repository`: the layout tying them together

pub mod database;
pub mod index;
pub mod loose;
pub mod repository;
pub mod workspace;
