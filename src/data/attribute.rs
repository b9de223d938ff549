//! Typed attribute columns and their handles

use crate::data::Element;
use crate::float_types::Real;
use nalgebra::{Point3, Vector3};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// A value that can be stored per element in a column.
///
/// `zero()` is the value a freshly created element (or a freshly attached
/// column) starts with.
pub trait AttributeValue: Clone + 'static {
    fn zero() -> Self;
}

impl AttributeValue for u16 {
    fn zero() -> Self {
        0
    }
}

impl AttributeValue for u32 {
    fn zero() -> Self {
        0
    }
}

impl AttributeValue for Real {
    fn zero() -> Self {
        0.0
    }
}

impl AttributeValue for Vector3<Real> {
    fn zero() -> Self {
        Vector3::zeros()
    }
}

impl AttributeValue for Point3<Real> {
    fn zero() -> Self {
        Point3::origin()
    }
}

/// Element references are empty until set.
impl<E: Element> AttributeValue for Option<E> {
    fn zero() -> Self {
        None
    }
}

impl<T: AttributeValue + Copy, const N: usize> AttributeValue for [T; N] {
    fn zero() -> Self {
        [T::zero(); N]
    }
}

/// A value that can be exported as a group of primitives for bulk upload.
pub trait FlatData: AttributeValue {
    type Primitive: Copy;

    /// Number of primitives one value expands to.
    fn width() -> usize;

    fn extend_flat(&self, out: &mut Vec<Self::Primitive>);
}

impl FlatData for u16 {
    type Primitive = u16;

    fn width() -> usize {
        1
    }

    fn extend_flat(&self, out: &mut Vec<u16>) {
        out.push(*self);
    }
}

impl FlatData for u32 {
    type Primitive = u32;

    fn width() -> usize {
        1
    }

    fn extend_flat(&self, out: &mut Vec<u32>) {
        out.push(*self);
    }
}

impl FlatData for Real {
    type Primitive = Real;

    fn width() -> usize {
        1
    }

    fn extend_flat(&self, out: &mut Vec<Real>) {
        out.push(*self);
    }
}

impl FlatData for Vector3<Real> {
    type Primitive = Real;

    fn width() -> usize {
        3
    }

    fn extend_flat(&self, out: &mut Vec<Real>) {
        out.extend_from_slice(&[self.x, self.y, self.z]);
    }
}

impl FlatData for Point3<Real> {
    type Primitive = Real;

    fn width() -> usize {
        3
    }

    fn extend_flat(&self, out: &mut Vec<Real>) {
        out.extend_from_slice(&[self.x, self.y, self.z]);
    }
}

impl<T: FlatData + Copy, const N: usize> FlatData for [T; N] {
    type Primitive = T::Primitive;

    fn width() -> usize {
        N * T::width()
    }

    fn extend_flat(&self, out: &mut Vec<T::Primitive>) {
        for value in self {
            value.extend_flat(out);
        }
    }
}

/// Typed handle to a column registered on an [`ElementPool`](super::ElementPool).
///
/// The handle is returned by `add_attribute` and resolves to its column
/// without a name lookup. It stops resolving once the column is removed, and
/// never resolves against another pool.
pub struct Attribute<E, T> {
    pub(crate) pool: u32,
    pub(crate) column: u32,
    pub(crate) serial: u32,
    _marker: PhantomData<fn() -> (E, T)>,
}

impl<E, T> Attribute<E, T> {
    pub(crate) const fn new(pool: u32, column: u32, serial: u32) -> Self {
        Attribute {
            pool,
            column,
            serial,
            _marker: PhantomData,
        }
    }
}

impl<E, T> Clone for Attribute<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> Copy for Attribute<E, T> {}

impl<E, T> PartialEq for Attribute<E, T> {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool && self.column == other.column && self.serial == other.serial
    }
}

impl<E, T> Eq for Attribute<E, T> {}

impl<E, T> fmt::Debug for Attribute<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("pool", &self.pool)
            .field("column", &self.column)
            .field("serial", &self.serial)
            .field("value", &std::any::type_name::<T>())
            .finish()
    }
}

/// Fixed-arity 16 bit integer tuple per element.
pub type ShortTupleAttribute<E, const N: usize> = Attribute<E, [u16; N]>;
/// Fixed-arity 32 bit integer tuple per element.
pub type IntTupleAttribute<E, const N: usize> = Attribute<E, [u32; N]>;
/// One 3D vector per element.
pub type Vec3Attribute<E> = Attribute<E, Vector3<Real>>;
/// Fixed-arity 3D vector tuple per element.
pub type Vec3TupleAttribute<E, const N: usize> = Attribute<E, [Vector3<Real>; N]>;
/// One 3D point per element.
pub type PointAttribute<E> = Attribute<E, Point3<Real>>;
/// Reference to one element of kind `R` per element.
pub type ElementAttribute<E, R> = Attribute<E, Option<R>>;
/// Fixed-arity tuple of element references per element.
pub type ElementTupleAttribute<E, R, const N: usize> = Attribute<E, [Option<R>; N]>;

/// Storage operations every column supports regardless of its value type.
pub(crate) trait ErasedColumn: Any {
    fn value_type(&self) -> &'static str;
    fn push_zero(&mut self);
    fn swap_remove(&mut self, slot: usize);
    fn clear(&mut self);
    fn reserve(&mut self, additional: usize);
    fn shrink_to_fit(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub(crate) struct Column<T> {
    pub(crate) data: Vec<T>,
}

impl<T: AttributeValue> Column<T> {
    pub(crate) fn filled(len: usize) -> Self {
        Column {
            data: vec![T::zero(); len],
        }
    }
}

impl<T: AttributeValue> ErasedColumn for Column<T> {
    fn value_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn push_zero(&mut self) {
        self.data.push(T::zero());
    }

    fn swap_remove(&mut self, slot: usize) {
        self.data.swap_remove(slot);
    }

    fn clear(&mut self) {
        self.data.clear();
    }

    fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    fn shrink_to_fit(&mut self) {
        self.data.shrink_to_fit();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
