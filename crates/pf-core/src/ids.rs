//! Typed indices into the agent pool.
//!
//! Both IDs are plain `Copy` integers underneath and index straight into the
//! pool's `Vec`s.  Their `Display` form is short (`pax#12`, `kind#1`) because
//! it shows up in every log line that mentions an agent.

use std::fmt;

/// Declare an index newtype with an `INVALID` sentinel and a short
/// display prefix.
macro_rules! pool_index {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) => $prefix:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Never handed out by a pool.
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($prefix, "#{}"), self.0)
                } else {
                    f.write_str(concat!($prefix, "#-"))
                }
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

pool_index! {
    /// A passenger slot in the pool.  A recycled passenger keeps its ID.
    pub struct AgentId(u32) => "pax";
}

pool_index! {
    /// A passenger archetype: its own service profile and pool partition.
    pub struct AgentKindId(u16) => "kind";
}
