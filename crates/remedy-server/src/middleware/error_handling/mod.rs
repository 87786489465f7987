//! Fallback responses for failures raised outside the handlers.

mod handlers;
mod panic;

pub use handlers::handle_error;
pub use panic::catch_panic;
