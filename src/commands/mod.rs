//! One module per subcommand; each exposes `execute(args, config)`.

pub mod bootstrap;
pub mod migrate;
pub mod serve;
