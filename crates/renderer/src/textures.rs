//! The two textures a normal-mapped model samples.

use std::path::Path;

use corelib::ResourceError;

use crate::backend::{TextureProvider, TextureSlot};

/// Colour map (slot 0) and normal map (slot 1).
#[derive(Debug)]
pub struct TextureSet<T> {
    slots: [T; 2],
}

impl<T> TextureSet<T> {
    /// Load both slots in order. If the normal map fails the colour map is
    /// released before the error is returned.
    pub fn load<P>(provider: &P, color_map: &Path, normal_map: &Path) -> Result<Self, ResourceError>
    where
        P: TextureProvider<Texture = T>,
    {
        let color = provider.load_texture(color_map, TextureSlot::Color)?;
        let normal = match provider.load_texture(normal_map, TextureSlot::Normal) {
            Ok(normal) => normal,
            Err(err) => {
                log::warn!("Normal map failed, releasing colour map {:?}", color_map);
                drop(color);
                return Err(err);
            }
        };
        Ok(Self {
            slots: [color, normal],
        })
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn slot(&self, slot: TextureSlot) -> &T {
        &self.slots[slot.index()]
    }
}
