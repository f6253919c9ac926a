mod loader;
mod model;
mod validation;

pub use loader::{CONFIG_FILENAME, ConfigLoader, FileConfigLoader};
pub use model::{ApiConfig, Config, MailConfig, Period, ProxySettings, ReportConfig};
pub use validation::validate;
