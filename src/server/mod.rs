// Server module entry point
// Listener creation, connection handling, the accept loop and signals

pub mod connection;
pub mod io;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::{run, SHUTDOWN_GRACE};
pub use signal::start_signal_handler;
