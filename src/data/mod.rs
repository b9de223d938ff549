//! Columnar element storage.
//!
//! Every mesh element kind (vertex, edge, face, loop, or the ephemeral
//! triangles of a triangulation pass) lives in an [`ElementPool`]. An element
//! is nothing but a handle; all payload, including the topology itself, is
//! stored in typed [`Attribute`] columns co-indexed with the pool's slots.
//!
//! Pools are single-writer structures. Iterating a pool borrows it, so the
//! pool cannot be mutated while an iteration is in progress.

use std::fmt::Debug;
use std::hash::Hash;

pub mod attribute;
pub mod pool;

pub use attribute::{
    Attribute, AttributeValue, ElementAttribute, ElementTupleAttribute, FlatData,
    IntTupleAttribute, PointAttribute, ShortTupleAttribute, Vec3Attribute,
    Vec3TupleAttribute,
};
pub use pool::ElementPool;

/// Stable identity of an element inside its pool.
///
/// The key never changes while the element is alive, even when the element is
/// relocated to another storage slot by a swap-removal. A key of a removed
/// element never resolves again: its generation is retired on removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// A handle type stored in an [`ElementPool`].
pub trait Element: Copy + Eq + Hash + Debug + 'static {
    /// Human readable kind, used in diagnostics and errors.
    const KIND: &'static str;

    fn from_key(key: ElementKey) -> Self;
    fn key(self) -> ElementKey;
}

/// Declares a new element handle type.
macro_rules! element_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name($crate::data::ElementKey);

        impl $crate::data::Element for $name {
            const KIND: &'static str = stringify!($name);

            #[inline]
            fn from_key(key: $crate::data::ElementKey) -> Self {
                $name(key)
            }

            #[inline]
            fn key(self) -> $crate::data::ElementKey {
                self.0
            }
        }
    };
}

pub(crate) use element_handle;
