pub mod environment;
pub mod initialization;

pub use environment::{
    get_environment, initialize_logging_system, load_environment_from_path,
    load_environment_variables, ApiConfig, Environment, EnvironmentConfig,
};
pub use initialization::{initialize_application, log_initialization_complete, InitializationResult};
