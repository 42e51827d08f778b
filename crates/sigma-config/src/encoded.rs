//! Enumerations persisted as small integer codes.

/// Declares a `#[repr(u8)]` enum whose variants map one-to-one onto the
/// integer codes used by the persisted layouts and SysEx edit commands.
macro_rules! encoded_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        #[repr(u8)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $code, )+
        }

        impl $name {
            /// Every variant, in code order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Raw persisted code.
            #[inline]
            pub const fn code(self) -> u8 {
                self as u8
            }

            /// Decodes a raw persisted code.
            pub fn from_code(code: u16) -> Result<Self, $crate::ConfigError> {
                match code {
                    $( $code => Ok($name::$variant), )+
                    _ => Err($crate::ConfigError::InvalidCode { field: $field, value: code }),
                }
            }
        }

        impl TryFrom<u16> for $name {
            type Error = $crate::ConfigError;

            fn try_from(code: u16) -> Result<Self, Self::Error> {
                Self::from_code(code)
            }
        }
    };
}

pub(crate) use encoded_enum;
