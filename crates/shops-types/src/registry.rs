//! Registry trait for self-registering implementations.
//!
//! This module provides the base trait that pluggable implementations must
//! implement to register themselves with their configuration name and
//! factory function.

/// Base trait for implementation registries.
///
/// Each pluggable module (currently the rate sources) provides a Registry
/// struct implementing this trait, declaring its configuration name and a
/// factory function.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the key used in the TOML configuration, for example:
	/// - "pair" for rates.implementations.pair
	/// - "fixed" for rates.implementations.fixed
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
