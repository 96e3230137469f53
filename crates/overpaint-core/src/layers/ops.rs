//! Layer operations that also touch the scene.
//!
//! Each function updates the [`LayerModel`] record and performs the matching
//! scene calls before returning, so the two never diverge between repaints.
//! Structural changes end with [`rearrange`].

use super::{Layer, LayerId, LayerModel};
use crate::scene::SceneGraph;
use crate::shapes::ShapeId;

/// Rebuild the scene's paint order from the layer model.
///
/// Ids missing from the scene are skipped and do not take up an index.
pub fn rearrange<S: SceneGraph>(model: &LayerModel, scene: &mut S) {
    let mut index = 0;
    for id in model.paint_order() {
        if scene.contains(id) {
            scene.move_to_index(id, index);
            index += 1;
        }
    }
    scene.render_all();
}

pub fn add_layer<S: SceneGraph>(model: &mut LayerModel, scene: &mut S) -> LayerId {
    let id = model.add_layer();
    log::debug!("Added layer {id}");
    rearrange(model, scene);
    id
}

/// Remove a layer and every shape it references from the scene.
pub fn remove_layer<S: SceneGraph>(model: &mut LayerModel, scene: &mut S, id: LayerId) -> bool {
    let Some(layer) = model.remove_layer(id) else {
        return false;
    };
    for shape in &layer.objects {
        scene.remove_object(*shape);
    }
    log::debug!("Removed layer {id} with {} objects", layer.objects.len());
    rearrange(model, scene);
    true
}

pub fn move_up<S: SceneGraph>(model: &mut LayerModel, scene: &mut S, index: usize) -> bool {
    let moved = model.move_up(index);
    if moved {
        rearrange(model, scene);
    }
    moved
}

pub fn move_down<S: SceneGraph>(model: &mut LayerModel, scene: &mut S, index: usize) -> bool {
    let moved = model.move_down(index);
    if moved {
        rearrange(model, scene);
    }
    moved
}

pub fn append_object<S: SceneGraph>(model: &mut LayerModel, scene: &mut S, shape: ShapeId) -> bool {
    let appended = model.append_object(shape);
    if appended {
        rearrange(model, scene);
    } else {
        log::warn!("No active layer for object {shape}");
    }
    appended
}

/// Update the flag and every referenced shape's visibility.
pub fn set_visibility<S: SceneGraph>(
    model: &mut LayerModel,
    scene: &mut S,
    id: LayerId,
    visible: bool,
) -> bool {
    if !model.set_visible(id, visible) {
        return false;
    }
    if let Some(layer) = model.get(id) {
        for shape in &layer.objects {
            scene.set_visible(*shape, visible);
        }
    }
    scene.render_all();
    true
}

/// Group or ungroup objects of a layer in place.
///
/// Grouping collapses the listed members of the layer into one group object
/// at the slot of the earliest member. Ungrouping replaces each listed group
/// with its children at the group's slot. Returns the ids added to the layer,
/// which take the layer's visibility. Grouping an already grouped layer adds
/// nothing.
pub fn set_grouped<S: SceneGraph>(
    model: &mut LayerModel,
    scene: &mut S,
    id: LayerId,
    grouped: bool,
    object_ids: &[ShapeId],
) -> Vec<ShapeId> {
    let Some(layer) = model.get_mut(id) else {
        return Vec::new();
    };
    let added = if grouped {
        group_layer(layer, scene, object_ids)
    } else {
        ungroup_layer(layer, scene, object_ids)
    };
    // New objects follow the layer's visibility.
    let visible = layer.visible;
    for shape in &added {
        scene.set_visible(*shape, visible);
    }
    rearrange(model, scene);
    added
}

fn group_layer<S: SceneGraph>(layer: &mut Layer, scene: &mut S, object_ids: &[ShapeId]) -> Vec<ShapeId> {
    if layer.grouped {
        return Vec::new();
    }
    let members: Vec<ShapeId> = layer
        .objects
        .iter()
        .copied()
        .filter(|o| object_ids.contains(o) && scene.contains(*o))
        .collect();
    let Some(first) = members.first().copied() else {
        return Vec::new();
    };
    let Some(slot) = layer.objects.iter().position(|o| *o == first) else {
        return Vec::new();
    };
    let Some(group) = scene.group(&members) else {
        return Vec::new();
    };
    layer.objects.retain(|o| !members.contains(o));
    layer.objects.insert(slot.min(layer.objects.len()), group);
    layer.grouped = true;
    log::debug!("Grouped {} objects of layer {} into {group}", members.len(), layer.id);
    vec![group]
}

fn ungroup_layer<S: SceneGraph>(layer: &mut Layer, scene: &mut S, object_ids: &[ShapeId]) -> Vec<ShapeId> {
    let mut added = Vec::new();
    for group in object_ids {
        let Some(slot) = layer.objects.iter().position(|o| o == group) else {
            continue;
        };
        let Some(children) = scene.ungroup(*group) else {
            continue;
        };
        layer.objects.splice(slot..=slot, children.iter().copied());
        added.extend(children);
    }
    layer.grouped = false;
    if !added.is_empty() {
        log::debug!("Ungrouped layer {} into {} objects", layer.id, added.len());
    }
    added
}

/// Replace every layer, then rebuild the paint order.
pub fn set_layers<S: SceneGraph>(model: &mut LayerModel, scene: &mut S, layers: Vec<Layer>) {
    model.set_layers(layers);
    rearrange(model, scene);
}

/// Raise or lower the ungroup request. Raising it ungroups a grouped active layer.
pub fn request_ungroup<S: SceneGraph>(model: &mut LayerModel, scene: &mut S, requested: bool) {
    model.set_ungroup_requested(requested);
    if !requested {
        return;
    }
    let Some(layer) = model.active().filter(|l| l.grouped) else {
        return;
    };
    let (id, objects) = (layer.id, layer.objects.clone());
    set_grouped(model, scene, id, false, &objects);
}

/// Remove shapes from the scene and prune them from their layers.
pub fn remove_objects<S: SceneGraph>(model: &mut LayerModel, scene: &mut S, ids: &[ShapeId]) {
    for id in ids {
        scene.remove_object(*id);
        model.remove_object(*id);
    }
    scene.render_all();
}

/// Remove every scene object and restore the initial layer state.
pub fn reset<S: SceneGraph>(model: &mut LayerModel, scene: &mut S) {
    for id in scene.objects() {
        scene.remove_object(id);
    }
    *model = LayerModel::default();
    rearrange(model, scene);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use crate::shapes::{Rectangle, Shape};
    use kurbo::{Point, Size};
    use uuid::Uuid;

    fn scene() -> MemoryScene {
        MemoryScene::new(Size::new(400.0, 300.0))
    }

    fn add_rect(scene: &mut MemoryScene) -> ShapeId {
        scene.add_object(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)))
    }

    #[test]
    fn test_rearrange_orders_layers_then_objects() {
        let mut scene = scene();
        let c = add_rect(&mut scene);
        let b = add_rect(&mut scene);
        let a = add_rect(&mut scene);
        let mut model = LayerModel::empty();
        model.set_layers(vec![
            Layer {
                objects: vec![a, b],
                ..Layer::new(1)
            },
            Layer {
                objects: vec![c],
                ..Layer::new(2)
            },
        ]);
        rearrange(&model, &mut scene);
        assert_eq!(scene.objects(), vec![a, b, c]);
    }

    #[test]
    fn test_rearrange_skips_stale_ids() {
        let mut scene = scene();
        let b = add_rect(&mut scene);
        let a = add_rect(&mut scene);
        let mut model = LayerModel::new();
        model.append_object(Uuid::new_v4());
        model.append_object(a);
        model.append_object(b);
        rearrange(&model, &mut scene);
        assert_eq!(scene.objects(), vec![a, b]);
    }

    #[test]
    fn test_move_up_reorders_scene() {
        let mut scene = scene();
        let mut model = LayerModel::new();
        let a = add_rect(&mut scene);
        append_object(&mut model, &mut scene, a);
        add_layer(&mut model, &mut scene);
        let b = add_rect(&mut scene);
        append_object(&mut model, &mut scene, b);
        assert_eq!(scene.objects(), vec![a, b]);

        assert!(move_up(&mut model, &mut scene, 1));
        assert_eq!(scene.objects(), vec![b, a]);
        assert!(!move_up(&mut model, &mut scene, 0));
        assert_eq!(scene.objects(), vec![b, a]);
    }

    #[test]
    fn test_remove_layer_cascades() {
        let mut scene = scene();
        let mut model = LayerModel::new();
        let a = add_rect(&mut scene);
        append_object(&mut model, &mut scene, a);
        assert!(remove_layer(&mut model, &mut scene, 1));
        assert!(scene.is_empty());
        assert_eq!(model.active_layer(), None);
        assert!(!remove_layer(&mut model, &mut scene, 1));
    }

    #[test]
    fn test_visibility_touches_scene() {
        let mut scene = scene();
        let mut model = LayerModel::new();
        let a = add_rect(&mut scene);
        append_object(&mut model, &mut scene, a);
        assert!(set_visibility(&mut model, &mut scene, 1, false));
        assert!(!scene.is_visible(a));
        assert!(model.get(1).is_some_and(|l| !l.visible));
        assert!(set_visibility(&mut model, &mut scene, 1, true));
        assert!(scene.is_visible(a));
    }

    #[test]
    fn test_group_then_ungroup_restores_members() {
        let mut scene = scene();
        let mut model = LayerModel::new();
        let ids: Vec<ShapeId> = (0..3).map(|_| add_rect(&mut scene)).collect();
        for id in &ids {
            append_object(&mut model, &mut scene, *id);
        }

        let added = set_grouped(&mut model, &mut scene, 1, true, &ids[..2]);
        assert_eq!(added.len(), 1);
        let group = added[0];
        assert_eq!(model.get(1).map(|l| l.objects.clone()), Some(vec![group, ids[2]]));
        assert_eq!(scene.objects(), vec![group, ids[2]]);

        // Repeated request adds nothing.
        assert!(set_grouped(&mut model, &mut scene, 1, true, &ids[..2]).is_empty());
        assert_eq!(model.get(1).map(|l| l.objects.len()), Some(2));

        let children = set_grouped(&mut model, &mut scene, 1, false, &[group]);
        assert_eq!(children, ids[..2].to_vec());
        let mut objects = model.get(1).map(|l| l.objects.clone()).unwrap_or_default();
        objects.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(objects, expected);
        assert!(!model.get(1).is_some_and(|l| l.grouped));

        assert!(set_grouped(&mut model, &mut scene, 1, false, &[group]).is_empty());
    }

    #[test]
    fn test_grouping_hidden_layer_keeps_it_hidden() {
        let mut scene = scene();
        let mut model = LayerModel::new();
        let a = add_rect(&mut scene);
        let b = add_rect(&mut scene);
        append_object(&mut model, &mut scene, a);
        append_object(&mut model, &mut scene, b);
        assert!(set_visibility(&mut model, &mut scene, 1, false));

        let added = set_grouped(&mut model, &mut scene, 1, true, &[a, b]);
        assert_eq!(added.len(), 1);
        assert!(!scene.is_visible(added[0]));

        let children = set_grouped(&mut model, &mut scene, 1, false, &added);
        assert_eq!(children, vec![a, b]);
        assert!(children.iter().all(|id| !scene.is_visible(*id)));

        assert!(set_visibility(&mut model, &mut scene, 1, true));
        assert!(scene.is_visible(a) && scene.is_visible(b));
    }

    #[test]
    fn test_request_ungroup_dissolves_active_group() {
        let mut scene = scene();
        let mut model = LayerModel::new();
        let a = add_rect(&mut scene);
        let b = add_rect(&mut scene);
        append_object(&mut model, &mut scene, a);
        append_object(&mut model, &mut scene, b);
        set_grouped(&mut model, &mut scene, 1, true, &[a, b]);

        request_ungroup(&mut model, &mut scene, false);
        assert!(model.get(1).is_some_and(|l| l.grouped));

        request_ungroup(&mut model, &mut scene, true);
        assert_eq!(model.get(1).map(|l| l.objects.clone()), Some(vec![a, b]));
        assert_eq!(scene.objects(), vec![a, b]);
    }

    #[test]
    fn test_remove_objects_prunes_layers() {
        let mut scene = scene();
        let mut model = LayerModel::new();
        let a = add_rect(&mut scene);
        append_object(&mut model, &mut scene, a);
        remove_objects(&mut model, &mut scene, &[a]);
        assert!(scene.is_empty());
        assert!(model.layer_of(a).is_none());
    }

    #[test]
    fn test_reset() {
        let mut scene = scene();
        let mut model = LayerModel::new();
        add_layer(&mut model, &mut scene);
        let a = add_rect(&mut scene);
        append_object(&mut model, &mut scene, a);
        reset(&mut model, &mut scene);
        assert!(scene.is_empty());
        assert_eq!(model, LayerModel::default());
    }
}
