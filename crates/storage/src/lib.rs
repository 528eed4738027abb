//! Filesystem plumbing for exifsift.
//!
//! - [`locate`] discovers candidate files under a source tree.
//! - [`Destination`] is the skip-gate ("is a file with this base name already
//!   there?") and the entry point for copies.
//! - [`copy_file`] duplicates bytes without ever overwriting an existing file.

mod copy;
pub mod error;
mod gate;
mod locate;
mod path;

pub use crate::copy::{CopyOutcome, copy_file};
pub use crate::gate::Destination;
pub use crate::locate::{Extensions, LocateStream, locate};
pub use crate::path::{base_name, destination_for, display_name};
