//! Configuration and fixture helpers shared by dataprov binaries.
//!
//! - [`settings`]: provider settings file plus `DATAPROV_*` env overrides
//! - [`fixture`]: model-to-records fixtures in JSON or YAML

pub mod fixture;
pub mod settings;

pub use fixture::{Fixture, FixtureError, fixture_from_value, load_fixture};
pub use settings::{SettingsError, apply_env_overrides, default_settings_path, load_settings, load_settings_from};
