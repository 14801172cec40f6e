use crate::error::RenderError;

/// Texture units available to one drawable: a base layer and an overlay.
pub const MAX_TEXTURE_UNITS: usize = 2;

/// Ordered texture handles, bound to units `0..len` at draw time.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSet<T> {
    handles: Vec<T>,
}

impl<T: Clone> TextureSet<T> {
    pub fn new(handles: &[T]) -> Result<Self, RenderError> {
        if handles.len() > MAX_TEXTURE_UNITS {
            return Err(RenderError::TooManyTextures {
                given: handles.len(),
                max: MAX_TEXTURE_UNITS,
            });
        }
        Ok(Self {
            handles: handles.to_vec(),
        })
    }
}

impl<T> TextureSet<T> {
    pub fn empty() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// `(unit, handle)` pairs in binding order.
    pub fn units(&self) -> impl Iterator<Item = (u32, &T)> {
        self.handles.iter().enumerate().map(|(i, t)| (i as u32, t))
    }
}

impl<T> Default for TextureSet<T> {
    fn default() -> Self {
        Self::empty()
    }
}
