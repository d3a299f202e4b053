//! Generation-checked slot map of live screens.

use std::fmt;

use crate::router::LiveScreen;

/// Identifies one screen for as long as it lives.
///
/// Slots are reused, but each reuse bumps the generation, so an id held by
/// a screen that is gone never resolves to its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenId {
    index: usize,
    generation: u32,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

pub(crate) struct ScreenEntry {
    pub(crate) name: &'static str,
    /// `None` while the screen is being started.
    pub(crate) screen: Option<Box<dyn LiveScreen>>,
    /// Children by container name, in embedding order.
    pub(crate) embedded: Vec<(String, ScreenId)>,
    pub(crate) embedded_in: Option<ScreenId>,
}

struct Slot {
    generation: u32,
    entry: Option<ScreenEntry>,
}

#[derive(Default)]
pub(crate) struct Registry {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Registry {
    pub(crate) fn insert(
        &mut self,
        name: &'static str,
        embedded_in: Option<ScreenId>,
    ) -> ScreenId {
        let entry = ScreenEntry {
            name,
            screen: None,
            embedded: Vec::new(),
            embedded_in,
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.entry = Some(entry);
                ScreenId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                ScreenId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    pub(crate) fn get(&self, id: ScreenId) -> Option<&ScreenEntry> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: ScreenId) -> Option<&mut ScreenEntry> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    pub(crate) fn contains(&self, id: ScreenId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn remove(&mut self, id: ScreenId) -> Option<ScreenEntry> {
        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(entry)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.entry.is_some()).count()
    }
}
