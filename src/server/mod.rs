// Server module entry point
// Listener setup, connection handling, accept loop and graceful shutdown

pub mod banner;
pub mod connection;
pub mod listener;
pub mod network;
pub mod signal;
pub mod startup;

// `loop` is a keyword, so the module file keeps its name under another one
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used items
pub use listener::create_listener;
pub use server_loop::serve;
pub use startup::{prepare_root, run, run_until};
