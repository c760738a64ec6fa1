//! Built-in deployment profiles used when `environment` names a profile
//! that the source does not declare.

use super::{DeploymentProfile, Environment};

pub const DEFAULT_SERVER_PORT: u16 = 8080;

pub fn builtin_profile(env: Environment) -> DeploymentProfile {
    let (port_offset, db_port, prefix) = match env {
        Environment::Production | Environment::Local => (0, 27017, ""),
        Environment::Dev => (1, 27019, "dev/"),
        Environment::Dev2 => (2, 27020, "dev2/"),
        Environment::Mit => (3, 27021, "mit/"),
    };

    DeploymentProfile {
        database_uri: format!("mongodb://localhost:{db_port}"),
        server_port: DEFAULT_SERVER_PORT + port_offset,
        path_prefix: prefix.to_string(),
    }
}
