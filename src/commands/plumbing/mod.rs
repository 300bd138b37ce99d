//! Plumbing commands (low-level operations)
//!
//! Plumbing commands provide direct access to the object store, the staging
//! file and packs. They're primarily used for scripting.
//!
//! ## Commands
//!
//! - `hash-object`: Compute object ID and optionally store in database
//! - `cat-file`: Print an object's payload, type or size
//! - `ls-files`: List staged paths
//! - `write-tree`: Store the staged tree
//! - `commit-tree`: Store a commit of an existing tree
//! - `pack-objects`: Pack stored objects
//! - `verify-pack`: Check every object of a pack

pub mod cat_file;
pub mod commit_tree;
pub mod hash_object;
pub mod ls_files;
pub mod pack_objects;
pub mod verify_pack;
pub mod write_tree;
