//! Builder macro for configuration types.

/// Generate a builder struct and implementation for a configuration type.
///
/// The configuration type must implement `Default`. The macro generates:
/// - A builder struct with every field wrapped in `Option`
/// - Setter methods for each field (all accept `impl Into<T>`)
/// - A `build()` method that fills unset fields from the defaults and then
///   runs the given check over the finished configuration
/// - A `builder()` method on the config type
///
/// The check has the signature `fn(&Config) -> Result<(), (&'static str, String)>`,
/// naming the offending field and the reason on failure.
///
/// Note: For `usize` fields, callers must use suffixed literals (e.g., `10usize`)
/// because `i32 -> usize` has no `Into` impl.
macro_rules! impl_builder {
    (
        $Config:ident, $Builder:ident {
            $( $(#[$doc:meta])* $field:ident : $ty:ty ),* $(,)?
        }
        check = $check:path
    ) => {
        #[derive(Debug, Default)]
        pub struct $Builder {
            $( $field: Option<$ty>, )*
        }

        impl $Config {
            pub fn builder() -> $Builder {
                $Builder::default()
            }
        }

        impl $Builder {
            $(
                $(#[$doc])*
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*

            pub fn build(self) -> Result<$Config, $crate::error::BuilderError> {
                let defaults = $Config::default();
                let config = $Config {
                    $( $field: self.$field.unwrap_or(defaults.$field), )*
                };
                $check(&config).map_err(|(field, reason)| {
                    $crate::error::BuilderError::InvalidField {
                        builder: stringify!($Builder),
                        field,
                        reason,
                    }
                })?;
                Ok(config)
            }
        }
    };
}

pub(crate) use impl_builder;
