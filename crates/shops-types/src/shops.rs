//! Shop-side policy types shared between the manager and configuration.

use serde::{Deserialize, Serialize};

/// Controls how new shops enter the manager's registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterMode {
	/// Shops are admitted only by an account holding the
	/// register/remove permission.
	#[default]
	Manual,
	/// Shops may register themselves; privileged registration still works.
	Automatic,
}

impl std::fmt::Display for RegisterMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RegisterMode::Manual => f.write_str("manual"),
			RegisterMode::Automatic => f.write_str("automatic"),
		}
	}
}
