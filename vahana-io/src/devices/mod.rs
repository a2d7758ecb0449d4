//! Environment implementations

pub mod mock;

use crate::config::Config;
use crate::core::environment::Environment;
use mock::MockEnvironment;

/// Create the environment the tick loop drives
pub fn create_environment(config: &Config) -> Box<dyn Environment> {
    Box::new(MockEnvironment::new(config))
}
