pub mod app_config;
pub mod config;
pub mod records;
pub mod runs;
pub mod slug;
pub mod store;
pub mod validate;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use records::{NormalizedBrand, NormalizedProduct};
pub use runs::{OperationMetadata, RunStatus, RunType};
pub use slug::{canonicalize_url, slug_from_url, slugify};
pub use store::{BrandRef, CatalogStore, StoreError};
pub use validate::{record_preview, validate_brand, validate_product, ValidationReport};
