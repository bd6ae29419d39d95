//! topl-core: placeholder resolution for TOML configuration trees
//!
//! String values may reference other keys of the same tree with
//! `{{path.to.key}}`. Resolution first rewrites those references until the
//! tree stops changing, then fills what is left from caller-supplied
//! parameters, and finally reports whatever is still unresolved.
//!
//! # Example
//!
//! ```rust
//! use topl_core::{from_toml_str, resolve, Params};
//!
//! let tree = from_toml_str(r#"
//! name = "world"
//! greeting = "Hello {{name}}, from {{sender}}!"
//! "#).unwrap();
//!
//! let mut params = Params::new();
//! params.insert("sender".into(), "topl".into());
//!
//! let config = resolve(&tree, &params).unwrap();
//! assert_eq!(config.get_string("greeting").unwrap(), "Hello world, from topl!");
//! assert!(!config.has_unresolved());
//! ```

pub mod engine;
pub mod error;
pub mod loader;
pub mod params;
pub mod placeholder;
pub mod value;
pub mod walk;

mod config;

pub use config::ResolvedConfig;
pub use engine::{resolve, resolve_with_options, ResolveOptions, DEFAULT_MAX_PASSES};
pub use error::{Error, ErrorKind, Result};
pub use loader::{from_toml_str, load_file, parse_str, SourceFormat};
pub use params::{ParamSource, Params};
pub use value::Value;
pub use walk::{string_leaves, string_leaves_mut, LeafPath, Segment};
