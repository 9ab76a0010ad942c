//! Supervised process description and identity.
//!
//! [`ProcessSpec`] is the immutable descriptor of what to run and how;
//! [`ProcessHandle`] is the copyable pid snapshot of the running child.
//!
//! The waitable OS child itself never leaves the runtime core: ownership
//! passes from the launcher to the respawn loop at spawn time and is released
//! when the child exits or is killed. Callers only ever see the snapshot.

mod handle;
mod spec;

pub use handle::ProcessHandle;
pub use spec::ProcessSpec;
