//! Implementations of the CLI subcommands.

mod call;
mod dial;
mod poll;
mod status;

pub use call::call;
pub use dial::dial;
pub use poll::poll;
pub use status::status;
