use crate::foundation::core::{Canvas, PixelFormat};
use crate::foundation::error::ResourceError;
use crate::graph::model::{NodeGraph, NodeKind, PortRef};
use crate::resources::pool::{ImageDesc, PooledImage, ResourcePool};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Physical buffer slot within one frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SlotId(pub u32);

/// Assignment of every node output to a physical slot.
///
/// Slots are reused once every consumer of their previous occupant has run, and only for an
/// identical descriptor. The root output is never recycled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePlan {
    slots: Vec<ImageDesc>,
    assignments: BTreeMap<PortRef, SlotId>,
}

impl ResourcePlan {
    /// Plan buffers for `graph` at `canvas` in `format`.
    ///
    /// Fails with [`ResourceError::OversizedImage`] when a pass output would be larger than the
    /// canvas.
    pub fn build(
        graph: &NodeGraph,
        canvas: Canvas,
        format: PixelFormat,
    ) -> Result<Self, ResourceError> {
        let n = graph.nodes().len();

        // Per output, the node that reads it last.
        let mut last_reads = vec![Vec::<&PortRef>::new(); n];
        let mut last_reader = BTreeMap::<&PortRef, usize>::new();
        for e in graph.edges() {
            let at = last_reader.entry(&e.from).or_insert(0);
            *at = (*at).max(e.to.node.index());
        }
        for (port, &at) in &last_reader {
            last_reads[at].push(port);
        }

        let mut slots: Vec<ImageDesc> = Vec::new();
        let mut free = BTreeMap::<ImageDesc, Vec<SlotId>>::new();
        let mut assignments = BTreeMap::<PortRef, SlotId>::new();

        for node in graph.nodes() {
            let size = match &node.kind {
                NodeKind::EffectPass { scale, .. } => canvas.scaled(*scale),
                _ => canvas,
            };
            if !size.fits_within(canvas) {
                return Err(ResourceError::OversizedImage {
                    size,
                    ceiling: canvas,
                });
            }
            let desc = ImageDesc::new(format, size.width, size.height);

            let mut dead = Vec::new();
            for out in &node.outputs {
                let slot = match free.get_mut(&desc).and_then(Vec::pop) {
                    Some(s) => s,
                    None => {
                        slots.push(desc);
                        SlotId((slots.len() - 1) as u32)
                    }
                };
                let port = PortRef::new(node.id, out.clone());
                if node.id != graph.root() && !last_reader.contains_key(&port) {
                    dead.push(slot);
                }
                assignments.insert(port, slot);
            }

            // Unread outputs are scratch: recyclable as soon as the node has run.
            for slot in dead {
                free.entry(desc).or_default().push(slot);
            }
            for port in &last_reads[node.id.index()] {
                if let Some(&slot) = assignments.get(*port) {
                    free.entry(slots[slot.0 as usize]).or_default().push(slot);
                }
            }
        }

        Ok(Self { slots, assignments })
    }

    /// Number of physical slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Descriptor of every slot.
    pub fn slots(&self) -> &[ImageDesc] {
        &self.slots
    }

    /// Slot backing a node output.
    pub fn slot_for(&self, port: &PortRef) -> Option<SlotId> {
        self.assignments.get(port).copied()
    }

    /// Deterministic textual dump.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        s.push_str("ResourcePlan\n");
        let _ = writeln!(s, "slots: {}", self.slots.len());
        for (i, d) in self.slots.iter().enumerate() {
            let _ = writeln!(s, "  S{i}: {}x{} {:?}", d.width, d.height, d.format);
        }
        for (port, slot) in &self.assignments {
            let _ = writeln!(s, "  {port} -> S{}", slot.0);
        }
        s
    }
}

/// Buffers for one compiled frame, held until the backend finishes dispatch.
///
/// Dropping the value returns every buffer to the pool.
#[derive(Debug)]
pub struct FrameResources {
    images: Vec<PooledImage>,
}

impl FrameResources {
    /// Check out one buffer per slot of `plan`.
    pub fn acquire(plan: &ResourcePlan, pool: &ResourcePool) -> Self {
        Self {
            images: plan.slots.iter().map(|&d| pool.checkout_desc(d)).collect(),
        }
    }

    /// Buffer for `slot`.
    pub fn image(&self, slot: SlotId) -> Option<&PooledImage> {
        self.images.get(slot.0 as usize)
    }

    /// Mutable buffer for `slot`.
    pub fn image_mut(&mut self, slot: SlotId) -> Option<&mut PooledImage> {
        self.images.get_mut(slot.0 as usize)
    }

    /// Number of buffers held.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Return `true` when no buffer is held.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resources/plan.rs"]
mod tests;
