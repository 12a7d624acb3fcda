pub mod endpoint;
pub mod frame;
pub mod io;

pub use frame::{send_message, ReassemblyBuffer};
pub use io::{greedy_read, robust_write, try_greedy_read};
