//! `ElementPool`: a dense table of elements plus their attribute columns

use crate::data::attribute::{Attribute, AttributeValue, Column, ErasedColumn, FlatData};
use crate::data::{Element, ElementKey};
use crate::errors::MeshError;
use hashbrown::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone, Copy)]
struct KeyEntry {
    generation: u32,
    /// Current storage slot, `None` while the key is retired.
    slot: Option<u32>,
}

struct ColumnEntry {
    name: String,
    serial: u32,
    reserved: bool,
    data: Box<dyn ErasedColumn>,
}

/// Homogeneous table of elements with a dynamic set of named columns.
///
/// Live elements always occupy the slots `0..len()`, in storage order.
/// [`remove`](Self::remove) fills the freed slot with the last element
/// (swap-removal), so removal is O(1) but does not preserve the relative
/// order of the survivors, and the relocated element's slot index changes.
/// Element handles stay valid across such relocations; slot indices are only
/// meaningful until the next removal.
pub struct ElementPool<E: Element> {
    id: u32,
    /// slot -> key of the element stored there
    slots: Vec<ElementKey>,
    /// key index -> generation and slot
    keys: Vec<KeyEntry>,
    free_keys: Vec<u32>,
    high_water: usize,
    columns: Vec<Option<ColumnEntry>>,
    names: HashMap<String, usize>,
    next_serial: u32,
    _element: PhantomData<E>,
}

impl<E: Element> Default for ElementPool<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> fmt::Debug for ElementPool<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<(&str, &str)> = self
            .columns
            .iter()
            .flatten()
            .map(|entry| (entry.name.as_str(), entry.data.value_type()))
            .collect();

        f.debug_struct("ElementPool")
            .field("kind", &E::KIND)
            .field("len", &self.slots.len())
            .field("total_size", &self.high_water)
            .field("columns", &columns)
            .finish()
    }
}

impl<E: Element> ElementPool<E> {
    pub fn new() -> Self {
        ElementPool {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            keys: Vec::new(),
            free_keys: Vec::new(),
            high_water: 0,
            columns: Vec::new(),
            names: HashMap::new(),
            next_serial: 0,
            _element: PhantomData,
        }
    }

    /// Kind of the stored elements, e.g. `"Vertex"`.
    pub const fn kind(&self) -> &'static str {
        E::KIND
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// High-water slot count: the largest number of slots ever in use since
    /// the pool was created or last cleared. Never decreases otherwise.
    pub const fn total_size(&self) -> usize {
        self.high_water
    }

    /// Create a new live element. All columns start with their zero value.
    pub fn create(&mut self) -> E {
        let slot = self.slots.len() as u32;
        let key = match self.free_keys.pop() {
            Some(index) => {
                let entry = &mut self.keys[index as usize];
                entry.slot = Some(slot);
                ElementKey {
                    index,
                    generation: entry.generation,
                }
            },
            None => {
                let index = self.keys.len() as u32;
                self.keys.push(KeyEntry {
                    generation: 0,
                    slot: Some(slot),
                });
                ElementKey {
                    index,
                    generation: 0,
                }
            },
        };

        self.slots.push(key);
        for entry in self.columns.iter_mut().flatten() {
            entry.data.push_zero();
        }
        self.high_water = self.high_water.max(self.slots.len());

        E::from_key(key)
    }

    /// Remove an element by swap-removal.
    ///
    /// The element stored in the last slot moves into the freed slot; its
    /// handle and attribute values are kept, only its slot index changes.
    pub fn remove(&mut self, element: E) -> Result<(), MeshError> {
        let slot = self.slot_of(element).ok_or(MeshError::StaleElement { kind: E::KIND })?;

        self.slots.swap_remove(slot);
        for entry in self.columns.iter_mut().flatten() {
            entry.data.swap_remove(slot);
        }

        if let Some(moved) = self.slots.get(slot) {
            self.keys[moved.index as usize].slot = Some(slot as u32);
        }

        let key = element.key();
        let entry = &mut self.keys[key.index as usize];
        entry.slot = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_keys.push(key.index);

        Ok(())
    }

    /// Drop all elements. Column registrations are kept.
    pub fn clear(&mut self) {
        for key in &self.slots {
            let entry = &mut self.keys[key.index as usize];
            entry.slot = None;
            entry.generation = entry.generation.wrapping_add(1);
            self.free_keys.push(key.index);
        }

        self.slots.clear();
        for entry in self.columns.iter_mut().flatten() {
            entry.data.clear();
        }
        self.high_water = 0;
    }

    /// Grow backing storage so that `capacity` elements fit without reallocation.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let additional = capacity.saturating_sub(self.slots.len());
        self.slots.reserve(additional);
        for entry in self.columns.iter_mut().flatten() {
            entry.data.reserve(additional);
        }
    }

    /// Release spare storage of the slot table and all columns.
    ///
    /// Live elements are always stored without gaps, so this never moves an
    /// element and leaves `total_size()` untouched.
    pub fn compact(&mut self) {
        self.slots.shrink_to_fit();
        self.free_keys.shrink_to_fit();
        for entry in self.columns.iter_mut().flatten() {
            entry.data.shrink_to_fit();
        }
    }

    /// Whether `element` is alive in this pool.
    pub fn contains(&self, element: E) -> bool {
        self.slot_of(element).is_some()
    }

    /// Current storage slot of `element`.
    ///
    /// Only valid until the next removal; do not keep it as a key.
    pub fn slot_of(&self, element: E) -> Option<usize> {
        let key = element.key();
        let entry = self.keys.get(key.index as usize)?;
        if entry.generation != key.generation {
            return None;
        }
        entry.slot.map(|slot| slot as usize)
    }

    /// Element currently stored at `slot`.
    pub fn element_at(&self, slot: usize) -> Option<E> {
        self.slots.get(slot).map(|&key| E::from_key(key))
    }

    /// Iterate live elements in storage order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = E> + '_ {
        self.slots.iter().map(|&key| E::from_key(key))
    }

    /// Register a new column. Every live element gets the zero value.
    pub fn add_attribute<T: AttributeValue>(
        &mut self,
        name: &str,
    ) -> Result<Attribute<E, T>, MeshError> {
        self.register(name, false)
    }

    /// Register a column that cannot be removed again.
    ///
    /// Any column previously registered under `name` is dropped first.
    pub(crate) fn add_reserved_attribute<T: AttributeValue>(&mut self, name: &str) -> Attribute<E, T> {
        if let Some(column) = self.names.remove(name) {
            self.columns[column] = None;
        }
        self.insert_column(name, true)
    }

    fn register<T: AttributeValue>(
        &mut self,
        name: &str,
        reserved: bool,
    ) -> Result<Attribute<E, T>, MeshError> {
        if self.names.contains_key(name) {
            return Err(MeshError::DuplicateAttribute {
                pool: E::KIND,
                name: name.to_string(),
            });
        }
        Ok(self.insert_column(name, reserved))
    }

    /// Insert a column under a name that is known to be free.
    fn insert_column<T: AttributeValue>(&mut self, name: &str, reserved: bool) -> Attribute<E, T> {
        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);

        let entry = ColumnEntry {
            name: name.to_string(),
            serial,
            reserved,
            data: Box::new(Column::<T>::filled(self.slots.len())),
        };

        // reuse the first vacant column position
        let column = match self.columns.iter().position(Option::is_none) {
            Some(column) => {
                self.columns[column] = Some(entry);
                column
            },
            None => {
                self.columns.push(Some(entry));
                self.columns.len() - 1
            },
        };
        self.names.insert(name.to_string(), column);

        Attribute::new(self.id, column as u32, serial)
    }

    /// Look up a registered column by name.
    ///
    /// Returns `None` if no column has that name or its value type is not `T`.
    pub fn attribute<T: AttributeValue>(&self, name: &str) -> Option<Attribute<E, T>> {
        let column = *self.names.get(name)?;
        let entry = self.columns.get(column)?.as_ref()?;
        entry.data.as_any().downcast_ref::<Column<T>>()?;
        Some(Attribute::new(self.id, column as u32, entry.serial))
    }

    /// Unregister a column. Other columns and all elements are unaffected.
    pub fn remove_attribute<T: AttributeValue>(
        &mut self,
        attribute: Attribute<E, T>,
    ) -> Result<(), MeshError> {
        if !self.has_attribute(attribute) {
            return Err(MeshError::StaleAttribute { pool: E::KIND });
        }

        let column = attribute.column as usize;
        if let Some(entry) = &self.columns[column] {
            if entry.reserved {
                return Err(MeshError::ReservedAttribute {
                    pool: E::KIND,
                    name: entry.name.clone(),
                });
            }
        }

        if let Some(entry) = self.columns[column].take() {
            self.names.remove(&entry.name);
        }
        Ok(())
    }

    /// Whether `attribute` resolves to a live column of this pool.
    pub fn has_attribute<T: AttributeValue>(&self, attribute: Attribute<E, T>) -> bool {
        self.typed_column(attribute).is_some()
    }

    /// Names of all registered columns.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().flatten().map(|entry| entry.name.as_str())
    }

    pub fn get<T: AttributeValue>(&self, attribute: Attribute<E, T>, element: E) -> Option<&T> {
        let slot = self.slot_of(element)?;
        self.typed_column(attribute)?.data.get(slot)
    }

    pub fn get_mut<T: AttributeValue>(
        &mut self,
        attribute: Attribute<E, T>,
        element: E,
    ) -> Option<&mut T> {
        let slot = self.slot_of(element)?;
        self.typed_column_mut(attribute)?.data.get_mut(slot)
    }

    pub fn set<T: AttributeValue>(
        &mut self,
        attribute: Attribute<E, T>,
        element: E,
        value: T,
    ) -> Result<(), MeshError> {
        let slot = self.slot_of(element).ok_or(MeshError::StaleElement { kind: E::KIND })?;
        let column = self
            .typed_column_mut(attribute)
            .ok_or(MeshError::StaleAttribute { pool: E::KIND })?;
        column.data[slot] = value;
        Ok(())
    }

    /// The whole column in storage order, one value per live element.
    pub fn column<T: AttributeValue>(&self, attribute: Attribute<E, T>) -> Option<&[T]> {
        self.typed_column(attribute).map(|column| column.data.as_slice())
    }

    /// Materialize a column as a flat primitive array, one group per live
    /// element in storage order.
    pub fn compact_data<T: FlatData>(
        &self,
        attribute: Attribute<E, T>,
    ) -> Result<Vec<T::Primitive>, MeshError> {
        let mut out = Vec::new();
        self.compact_data_into(attribute, &mut out)?;
        Ok(out)
    }

    /// Like [`compact_data`](Self::compact_data), but overwrites `out` in
    /// place. `out` only reallocates when its capacity is too small.
    pub fn compact_data_into<T: FlatData>(
        &self,
        attribute: Attribute<E, T>,
        out: &mut Vec<T::Primitive>,
    ) -> Result<(), MeshError> {
        let column = self
            .typed_column(attribute)
            .ok_or(MeshError::StaleAttribute { pool: E::KIND })?;

        out.clear();
        out.reserve(column.data.len() * T::width());
        for value in &column.data {
            value.extend_flat(out);
        }
        Ok(())
    }

    fn typed_column<T: AttributeValue>(&self, attribute: Attribute<E, T>) -> Option<&Column<T>> {
        if attribute.pool != self.id {
            return None;
        }
        let entry = self.columns.get(attribute.column as usize)?.as_ref()?;
        if entry.serial != attribute.serial {
            return None;
        }
        entry.data.as_any().downcast_ref::<Column<T>>()
    }

    fn typed_column_mut<T: AttributeValue>(
        &mut self,
        attribute: Attribute<E, T>,
    ) -> Option<&mut Column<T>> {
        if attribute.pool != self.id {
            return None;
        }
        let entry = self.columns.get_mut(attribute.column as usize)?.as_mut()?;
        if entry.serial != attribute.serial {
            return None;
        }
        entry.data.as_any_mut().downcast_mut::<Column<T>>()
    }
}

impl<'a, E: Element> IntoIterator for &'a ElementPool<E> {
    type Item = E;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, ElementKey>, fn(&ElementKey) -> E>;

    fn into_iter(self) -> Self::IntoIter {
        fn to_element<E: Element>(key: &ElementKey) -> E {
            E::from_key(*key)
        }
        self.slots.iter().map(to_element::<E> as fn(&ElementKey) -> E)
    }
}
