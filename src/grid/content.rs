use rand::Rng;
use rand::seq::SliceRandom;

/// Which content-column slots receive content.
///
/// Decided once per content set so that a resize keeps the same tiles
/// showing the same content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPlacement {
    slots: Vec<bool>,
}

impl ContentPlacement {
    /// `count` filled slots shuffled among `ceil(count / density)` slots
    pub fn shuffled(count: usize, density: f32, rng: &mut impl Rng) -> Self {
        if count == 0 || density <= 0.0 {
            return Self::default();
        }

        let len = ((count as f32 / density.min(1.0)).ceil() as usize).max(count);
        let mut slots = vec![false; len];
        slots[..count].fill(true);
        slots.shuffle(rng);

        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_filled(&self, slot: usize) -> bool {
        self.slots.get(slot).copied().unwrap_or(false)
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|filled| **filled).count()
    }
}
