//! Error types shared by every easel crate

use thiserror::Error;

/// Errors produced by easel operations
///
/// Every failing operation reports its error before mutating anything, so a
/// rejected call leaves the target object exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A parameter had the wrong range or shape
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A textual value (color string, enum name) could not be parsed
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// `restore()` was called more often than `save()`
    #[error("State stack underflow: restore() without a matching save()")]
    StateStackUnderflow,

    /// The matrix has no inverse
    #[error("Matrix is not invertible (determinant {determinant})")]
    SingularMatrix { determinant: f32 },

    /// A pixel buffer allocation failed
    #[error("Out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },
}

/// Coarse classification of an [`Error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidState,
    NumericalDegenerate,
    ResourceExhaustion,
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::InvalidFormat(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) | Error::InvalidFormat(_) => ErrorKind::InvalidArgument,
            Error::StateStackUnderflow => ErrorKind::InvalidState,
            Error::SingularMatrix { .. } => ErrorKind::NumericalDegenerate,
            Error::OutOfMemory { .. } => ErrorKind::ResourceExhaustion,
        }
    }
}

/// Result type for easel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reject NaN and infinities with a message naming the parameter
pub fn ensure_finite(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::invalid(format!("{name} must be finite, got {value}")))
    }
}

/// Reject values outside `[min, max]` (and non-finite values)
pub fn ensure_range(name: &str, value: f32, min: f32, max: f32) -> Result<f32> {
    ensure_finite(name, value)?;
    if value < min || value > max {
        return Err(Error::invalid(format!(
            "{name} must be within [{min}, {max}], got {value}"
        )));
    }
    Ok(value)
}

/// Declares a closed enum whose variants have canonical string names.
///
/// Generates `name()`, `ALL`, `Display` and a `FromStr` that fails with
/// [`Error::InvalidFormat`] on unknown names.
#[macro_export]
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical name of this variant
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::Error::InvalidFormat(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}
