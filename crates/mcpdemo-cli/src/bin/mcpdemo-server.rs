//! mcpdemo host: serves the demo capabilities over stdin/stdout.
//!
//! stdout carries protocol traffic only; logs go to stderr and are
//! controlled by `MCPDEMO_LOG`.

#![forbid(unsafe_code)]

use mcpdemo_core::logging::LoggingConfig;

fn main() {
    LoggingConfig::from_env().init();
    mcpdemo::build_server().run_stdio();
}
