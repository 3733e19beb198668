//! CLI module for the streamfeed binary.
//!
//! ```ignore
//! use streamfeed::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args())? {
//!     CliCommand::Version => handle_version_command(),
//!     CliCommand::Help => println!("{}", USAGE),
//!     CliCommand::Stream(args) => { /* run the stream */ }
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, ArgsError, CliCommand, StreamArgs, USAGE};
pub use version::{handle_version_command, VERSION};
