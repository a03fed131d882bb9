//! Enums identified by a stable snake_case name.

/// Declares a fieldless enum whose variants each carry one external name.
///
/// The name drives serde, `Display`, `FromStr` and `as_str`. `ALL` lists the
/// variants in declaration order and `index` is the position in it.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant, )+
        }

        impl $name {
            pub const COUNT: usize = [$( Self::$variant ),+].len();

            /// All variants, in declaration order.
            pub const ALL: [Self; Self::COUNT] = [$( Self::$variant ),+];

            pub fn index(self) -> usize {
                self as usize
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::catalog::UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|value| value.as_str() == s)
                    .ok_or_else(|| $crate::catalog::UnknownName::new($kind, s))
            }
        }
    };
}

pub(crate) use named_enum;
