//! Closed string-valued enums.
//!
//! Each variant serializes to a fixed text value, which is also the value
//! stored in `TEXT` columns by the remote backend.

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Stored text value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $( $text => Ok($name::$variant), )+
                    other => Err($crate::error::CoreError::Validation(format!(
                        "Unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

pub(crate) use define_text_enum;

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::error::CoreError;

    define_text_enum! {
        /// Test-only enum.
        Shade {
            Light = "LIGHT",
            Dark = "DARK",
        }
    }

    #[test]
    fn text_round_trips_through_from_str() {
        for shade in Shade::ALL {
            assert_eq!(Shade::from_str(shade.as_str()).unwrap(), *shade);
        }
    }

    #[test]
    fn unknown_text_is_a_validation_error() {
        let err = Shade::from_str("light").unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg.contains("Shade")));
    }

    #[test]
    fn serde_uses_the_text_value() {
        assert_eq!(serde_json::to_string(&Shade::Dark).unwrap(), "\"DARK\"");
    }
}
