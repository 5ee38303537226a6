//! Utilities for ConfigValidator trait implementation.
//!
//! This module provides macros that implement `ConfigValidator` for plain
//! configuration structs from a short list of field rules.

/// Macro to implement ConfigValidator with basic validation patterns.
///
/// # Example
///
/// ```rust
/// use oar_blla::core::config::ConfigValidator;
/// use oar_blla::impl_config_validator;
///
/// #[derive(Debug, Clone, Default)]
/// pub struct MyConfig {
///     pub threshold: f32,
///     pub max_lines: usize,
///     pub max_height: Option<f32>,
/// }
///
/// impl_config_validator!(MyConfig {
///     threshold: range(0.0, 1.0),
///     max_lines: min(1),
///     max_height: optional_range(1.0, 10000.0),
/// });
///
/// let config = MyConfig { threshold: 0.2, max_lines: 10, max_height: None };
/// assert!(config.validate().is_ok());
/// ```
#[macro_export]
macro_rules! impl_config_validator {
    ($type_name:ident { $($field:ident: $validator:ident $(($($args:tt)*))?),* $(,)? }) => {
        impl $crate::core::config::ConfigValidator for $type_name {
            fn validate(&self) -> Result<(), $crate::core::config::ConfigError> {
                $(
                    $crate::validate_field!(self, $field, $validator $(($($args)*))?);
                )*
                Ok(())
            }

            fn get_defaults() -> Self
            where
                Self: Sized,
            {
                Self::default()
            }
        }
    };
}

/// Helper macro for field validation.
#[macro_export]
macro_rules! validate_field {
    ($self:expr, $field:ident, range($min:expr, $max:expr)) => {
        if !($min..=$max).contains(&$self.$field) {
            return Err($crate::core::config::ConfigError::InvalidConfig {
                message: format!(
                    "{} must be between {} and {}, got {}",
                    stringify!($field),
                    $min,
                    $max,
                    $self.$field
                ),
            });
        }
    };

    ($self:expr, $field:ident, min($min_val:expr)) => {
        if $self.$field < $min_val {
            return Err($crate::core::config::ConfigError::InvalidConfig {
                message: format!("{} must be at least {}", stringify!($field), $min_val),
            });
        }
    };

    ($self:expr, $field:ident, max($max_val:expr)) => {
        if $self.$field > $max_val {
            return Err($crate::core::config::ConfigError::InvalidConfig {
                message: format!("{} must be at most {}", stringify!($field), $max_val),
            });
        }
    };

    ($self:expr, $field:ident, optional_range($min:expr, $max:expr)) => {
        if let Some(value) = $self.$field {
            if !($min..=$max).contains(&value) {
                return Err($crate::core::config::ConfigError::InvalidConfig {
                    message: format!(
                        "{} must be between {} and {}",
                        stringify!($field),
                        $min,
                        $max
                    ),
                });
            }
        }
    };

    ($self:expr, $field:ident, nested) => {
        $crate::core::config::ConfigValidator::validate(&$self.$field)?;
    };
}
