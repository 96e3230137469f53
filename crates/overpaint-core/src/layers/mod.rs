//! Layer model: ordered layers of shape references and the active layer.
//!
//! Everything in this module is pure bookkeeping. [`ops`] pairs each record
//! update with the scene side effects it needs.

pub mod ops;

use crate::shapes::ShapeId;
use serde::{Deserialize, Serialize};

/// Layer identifier, allocated as max + 1.
pub type LayerId = u32;

/// An ordered bucket of shape references. Earlier objects paint first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub objects: Vec<ShapeId>,
    pub visible: bool,
    pub grouped: bool,
}

impl Layer {
    /// A visible, ungrouped, empty layer.
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            objects: Vec::new(),
            visible: true,
            grouped: false,
        }
    }

    pub fn contains(&self, shape: ShapeId) -> bool {
        self.objects.contains(&shape)
    }
}

/// Layers in paint order plus the active layer and the ungroup request.
///
/// The active layer is always `None` or the id of an existing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerModel {
    layers: Vec<Layer>,
    active: Option<LayerId>,
    ungroup_requested: bool,
}

impl Default for LayerModel {
    /// One empty layer with id 1, active, and the ungroup request raised.
    fn default() -> Self {
        Self {
            layers: vec![Layer::new(1)],
            active: Some(1),
            ungroup_requested: true,
        }
    }
}

impl LayerModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model with no layers at all.
    pub fn empty() -> Self {
        Self {
            layers: Vec::new(),
            active: None,
            ungroup_requested: false,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn active_layer(&self) -> Option<LayerId> {
        self.active
    }

    /// The active layer record.
    pub fn active(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn ungroup_requested(&self) -> bool {
        self.ungroup_requested
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Index of a layer in paint order.
    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// The layer that references `shape`.
    pub fn layer_of(&self, shape: ShapeId) -> Option<LayerId> {
        self.layers.iter().find(|l| l.contains(shape)).map(|l| l.id)
    }

    /// Every referenced shape id: layers in order, then objects in order.
    pub fn paint_order(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.layers.iter().flat_map(|l| l.objects.iter().copied())
    }

    /// Append a new layer and make it active.
    pub fn add_layer(&mut self) -> LayerId {
        let id = self.layers.iter().map(|l| l.id).max().map_or(1, |max| max + 1);
        self.layers.push(Layer::new(id));
        self.active = Some(id);
        id
    }

    /// Remove a layer, returning it. Unknown ids are ignored.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.position(id)?;
        let removed = self.layers.remove(index);
        self.fix_active();
        Some(removed)
    }

    /// Swap the layer at `index` with the one before it.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.layers.len() {
            return false;
        }
        self.layers.swap(index - 1, index);
        true
    }

    /// Swap the layer at `index` with the one after it.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.layers.len() {
            return false;
        }
        self.layers.swap(index, index + 1);
        true
    }

    /// Activate `id` if it names an existing layer.
    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Append a shape to the active layer.
    pub fn append_object(&mut self, shape: ShapeId) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        match self.get_mut(id) {
            Some(layer) => {
                layer.objects.push(shape);
                true
            }
            None => false,
        }
    }

    /// Update a layer's visibility flag.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Replace the whole list, then repair the active layer.
    pub fn set_layers(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
        self.fix_active();
    }

    pub fn set_ungroup_requested(&mut self, requested: bool) {
        self.ungroup_requested = requested;
    }

    /// Drop a shape reference from whichever layer holds it.
    pub fn remove_object(&mut self, shape: ShapeId) -> bool {
        for layer in &mut self.layers {
            if let Some(index) = layer.objects.iter().position(|o| *o == shape) {
                layer.objects.remove(index);
                return true;
            }
        }
        false
    }

    fn fix_active(&mut self) {
        let still_there = self.active.is_some_and(|id| self.get(id).is_some());
        if !still_there {
            self.active = self.layers.first().map(|l| l.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn assert_active_valid(model: &LayerModel) {
        match model.active_layer() {
            None => assert!(model.is_empty()),
            Some(id) => assert!(model.get(id).is_some()),
        }
    }

    #[test]
    fn test_initial_state() {
        let model = LayerModel::new();
        assert_eq!(model.layers(), &[Layer::new(1)]);
        assert_eq!(model.active_layer(), Some(1));
        assert!(model.ungroup_requested());
    }

    #[test]
    fn test_add_layer_ids() {
        let mut model = LayerModel::new();
        assert_eq!(model.add_layer(), 2);
        assert_eq!(model.add_layer(), 3);
        assert_eq!(model.active_layer(), Some(3));
        model.remove_layer(2);
        assert_eq!(model.add_layer(), 4);
    }

    #[test]
    fn test_remove_only_layer_then_add() {
        let mut model = LayerModel::new();
        assert!(model.remove_layer(1).is_some());
        assert_eq!(model.active_layer(), None);
        assert_eq!(model.add_layer(), 1);
        assert_eq!(model.active_layer(), Some(1));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut model = LayerModel::new();
        let before = model.clone();
        assert!(model.remove_layer(42).is_none());
        assert_eq!(model, before);
    }

    #[test]
    fn test_active_invariant_under_sequences() {
        // Deterministic pseudo-random mix of adds and removes.
        let mut model = LayerModel::new();
        let mut seed = 7u32;
        for _ in 0..200 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            if seed % 3 == 0 {
                model.add_layer();
            } else {
                let pick = (seed >> 8) % 6;
                model.remove_layer(pick);
            }
            assert_active_valid(&model);
        }
    }

    #[test]
    fn test_remove_active_falls_back_to_first() {
        let mut model = LayerModel::new();
        model.add_layer();
        model.add_layer();
        model.remove_layer(3);
        assert_eq!(model.active_layer(), Some(1));
    }

    #[test]
    fn test_move_bounds_are_noops() {
        let mut model = LayerModel::new();
        model.add_layer();
        model.add_layer();
        let before: Vec<LayerId> = model.layers().iter().map(|l| l.id).collect();
        assert!(!model.move_up(0));
        assert!(!model.move_down(2));
        assert!(!model.move_down(17));
        let after: Vec<LayerId> = model.layers().iter().map(|l| l.id).collect();
        assert_eq!(before, after);

        assert!(model.move_up(2));
        let ids: Vec<LayerId> = model.layers().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_set_active_requires_existing() {
        let mut model = LayerModel::new();
        assert!(!model.set_active_layer(9));
        assert_eq!(model.active_layer(), Some(1));
    }

    #[test]
    fn test_append_without_active() {
        let mut model = LayerModel::empty();
        assert!(!model.append_object(Uuid::new_v4()));
    }

    #[test]
    fn test_set_layers_repairs_active() {
        let mut model = LayerModel::new();
        model.set_layers(vec![Layer::new(5), Layer::new(6)]);
        assert_eq!(model.active_layer(), Some(5));
        model.set_layers(Vec::new());
        assert_eq!(model.active_layer(), None);
    }

    #[test]
    fn test_paint_order_and_prune() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut model = LayerModel::new();
        model.append_object(a);
        model.append_object(b);
        model.add_layer();
        model.append_object(c);
        assert_eq!(model.paint_order().collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(model.layer_of(c), Some(2));
        assert!(model.remove_object(b));
        assert_eq!(model.paint_order().collect::<Vec<_>>(), vec![a, c]);
    }
}
