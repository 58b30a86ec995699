// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Configuration for the local history engine
//!
//! A history directory may carry a `localhistory.toml` describing where
//! content is stored, how it is compressed, how far the line diff may go
//! before giving up, how long change sets are kept and how logging is set up.
//!
//! # Features
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides with the `LOCALHISTORY_` prefix
//! - Validation with field-level error messages
//!
//! # Example
//!
//! ```no_run
//! use localhistory_config::ConfigLoader;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new();
//!     let config = loader.load_with_overrides(".localhistory/localhistory.toml")?;
//!
//!     println!("Content stored under: {}", config.storage.path.display());
//!     println!("Compression: {}", config.storage.compression);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

// Re-export commonly used items
pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ConfigFormat, ConfigLoader, ENV_COMPRESSION, ENV_DIFF_MAX_EDIT_COST, ENV_LOG_LEVEL,
    ENV_STORAGE_PATH,
};
pub use schema::*;
pub use validation::{Validator, LOG_FORMATS, LOG_LEVELS};
