//! Fixed-capacity pool of reusable panels.

use std::{collections::VecDeque, time::Duration};

use panel_cut_core::{PanelId, PanelSnapshot, PanelState, Resolution, SpawnError};

#[derive(Clone, Debug)]
pub(crate) struct Panel {
    pub(crate) id: PanelId,
    pub(crate) state: PanelState,
    pub(crate) position_y: f32,
    pub(crate) x: f32,
    pub(crate) requires_double_tap: bool,
    pub(crate) armed_at: Option<Duration>,
    pub(crate) line_visible: bool,
}

impl Panel {
    fn parked(id: PanelId) -> Self {
        Self {
            id,
            state: PanelState::Inactive,
            position_y: 0.0,
            x: 0.0,
            requires_double_tap: false,
            armed_at: None,
            line_visible: false,
        }
    }

    pub(crate) fn launch(&mut self, spawn_y: f32, x: f32, requires_double_tap: bool) {
        self.state = PanelState::Waiting;
        self.position_y = spawn_y;
        self.x = x;
        self.requires_double_tap = requires_double_tap;
        self.armed_at = None;
        self.line_visible = true;
    }

    pub(crate) fn top_edge(&self, half_height: f32) -> f32 {
        self.position_y + half_height
    }

    pub(crate) fn is_waiting(&self) -> bool {
        self.state == PanelState::Waiting
    }

    pub(crate) fn resolve(&mut self, resolution: Resolution) {
        self.state = PanelState::Resolved(resolution);
        self.line_visible = false;
        self.armed_at = None;
    }

    fn is_active(&self) -> bool {
        self.state != PanelState::Inactive
    }

    fn snapshot(&self, half_height: f32) -> PanelSnapshot {
        PanelSnapshot {
            id: self.id,
            state: self.state,
            position_y: self.position_y,
            top_edge_y: self.top_edge(half_height),
            x: self.x,
            requires_double_tap: self.requires_double_tap,
            line_visible: self.line_visible,
        }
    }
}

/// Fixed-capacity store of panels handed out and reclaimed by the world.
///
/// Slots are created once at construction. `acquire` never grows the pool; it
/// reports [`SpawnError::PoolExhausted`] instead. Free slots are handed out in
/// the order they were returned.
#[derive(Clone, Debug)]
pub struct PanelPool {
    slots: Vec<Panel>,
    free: VecDeque<PanelId>,
}

impl PanelPool {
    /// Creates a pool holding `capacity` parked panels.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        let slots: Vec<Panel> = (0..capacity)
            .map(|index| Panel::parked(PanelId::new(index as u32)))
            .collect();
        let free = slots.iter().map(|panel| panel.id).collect();
        Self { slots, free }
    }

    /// Number of slots in the pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|panel| panel.is_active()).count()
    }

    /// Number of slots waiting in the free list.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Takes the oldest free slot and marks it waiting.
    pub fn acquire(&mut self) -> Result<PanelId, SpawnError> {
        let id = self.free.pop_front().ok_or(SpawnError::PoolExhausted)?;
        if let Some(panel) = self.slot_mut(id) {
            panel.state = PanelState::Waiting;
        }
        Ok(id)
    }

    /// Returns a slot to the free list.
    ///
    /// Releasing a slot that is not active leaves the pool untouched and
    /// returns `false`.
    pub fn release(&mut self, id: PanelId) -> bool {
        let Some(panel) = self.slot_mut(id) else {
            return false;
        };
        if !panel.is_active() {
            return false;
        }
        *panel = Panel::parked(id);
        self.free.push_back(id);
        true
    }

    /// Releases every active slot, returning their identifiers in id order.
    pub fn release_all(&mut self) -> Vec<PanelId> {
        let active: Vec<PanelId> = self
            .slots
            .iter()
            .filter(|panel| panel.is_active())
            .map(|panel| panel.id)
            .collect();
        active.into_iter().filter(|id| self.release(*id)).collect()
    }

    /// Captures the panel occupying `id`, if the slot is active.
    #[must_use]
    pub fn snapshot(&self, id: PanelId, half_height: f32) -> Option<PanelSnapshot> {
        self.slot(id)
            .filter(|panel| panel.is_active())
            .map(|panel| panel.snapshot(half_height))
    }

    /// Captures every active panel in id order.
    #[must_use]
    pub fn snapshots(&self, half_height: f32) -> Vec<PanelSnapshot> {
        self.active()
            .map(|panel| panel.snapshot(half_height))
            .collect()
    }

    pub(crate) fn active(&self) -> impl Iterator<Item = &Panel> {
        self.slots.iter().filter(|panel| panel.is_active())
    }

    pub(crate) fn active_mut(&mut self) -> impl Iterator<Item = &mut Panel> {
        self.slots.iter_mut().filter(|panel| panel.is_active())
    }

    pub(crate) fn slot_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        let index = usize::try_from(id.get()).ok()?;
        self.slots.get_mut(index)
    }

    fn slot(&self, id: PanelId) -> Option<&Panel> {
        let index = usize::try_from(id.get()).ok()?;
        self.slots.get(index)
    }
}
