//! Index buffer description and the index width state machine

/// Largest vertex index that still selects 16 bit indices.
pub const MAX_SHORT_INDEX: usize = i16::MAX as usize;

/// Width of one render index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    /// Narrowest width able to address `max_index`.
    pub const fn for_max_index(max_index: usize) -> Self {
        if max_index > MAX_SHORT_INDEX {
            IndexWidth::U32
        } else {
            IndexWidth::U16
        }
    }

    pub const fn format(self) -> IndexFormat {
        match self {
            IndexWidth::U16 => IndexFormat::UnsignedShort,
            IndexWidth::U32 => IndexFormat::UnsignedInt,
        }
    }
}

/// Which index column is currently attached to the triangle pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexState {
    #[default]
    Empty,
    U16,
    U32,
}

/// Column changes needed to move from one [`IndexState`] to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexTransition {
    pub detach: Option<IndexWidth>,
    pub attach: Option<IndexWidth>,
}

impl IndexState {
    pub const fn width(self) -> Option<IndexWidth> {
        match self {
            IndexState::Empty => None,
            IndexState::U16 => Some(IndexWidth::U16),
            IndexState::U32 => Some(IndexWidth::U32),
        }
    }

    /// Next state when indices of width `required` are emitted, together with
    /// the column to detach first and the column to attach.
    pub const fn transition(self, required: IndexWidth) -> (IndexState, IndexTransition) {
        let next = match required {
            IndexWidth::U16 => IndexState::U16,
            IndexWidth::U32 => IndexState::U32,
        };

        let transition = match (self.width(), required) {
            (Some(IndexWidth::U16), IndexWidth::U16) | (Some(IndexWidth::U32), IndexWidth::U32) => {
                IndexTransition {
                    detach: None,
                    attach: None,
                }
            },
            (current, _) => IndexTransition {
                detach: current,
                attach: Some(required),
            },
        };

        (next, transition)
    }
}

/// Primitive assembly of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    Triangles,
}

/// Expected update frequency of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    UnsignedShort,
    UnsignedInt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexData<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

/// A flat triangle index array ready for upload, three indices per triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBuffer<'a> {
    pub mode: PrimitiveMode,
    pub usage: BufferUsage,
    /// Indices per primitive.
    pub components: usize,
    pub data: IndexData<'a>,
}

impl<'a> IndexBuffer<'a> {
    pub(crate) const fn triangles(data: IndexData<'a>) -> Self {
        IndexBuffer {
            mode: PrimitiveMode::Triangles,
            usage: BufferUsage::Static,
            components: 3,
            data,
        }
    }

    pub const fn format(&self) -> IndexFormat {
        match self.data {
            IndexData::U16(_) => IndexFormat::UnsignedShort,
            IndexData::U32(_) => IndexFormat::UnsignedInt,
        }
    }

    /// Number of indices.
    pub const fn len(&self) -> usize {
        match self.data {
            IndexData::U16(data) => data.len(),
            IndexData::U32(data) => data.len(),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices widened to `u32`.
    pub fn iter(&self) -> impl Iterator<Item = u32> + 'a {
        let (short, int): (&'a [u16], &'a [u32]) = match self.data {
            IndexData::U16(data) => (data, &[]),
            IndexData::U32(data) => (&[], data),
        };
        short
            .iter()
            .map(|&i| u32::from(i))
            .chain(int.iter().copied())
    }
}
