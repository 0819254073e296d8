// Everything the integration tests drive without a terminal: the timing
// session, the results store, and the event-loop plumbing. Screen types and
// rendering stay in the binary.
pub mod app_dirs;
pub mod config;
pub mod results;
pub mod runtime;
pub mod session;
pub mod util;
