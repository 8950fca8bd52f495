//! Small helpers shared across modules

pub mod encoding;
pub mod paths;

pub use encoding::{decode_note, read_note};
pub use paths::{join_posix, normalize_path, posix_parent};
