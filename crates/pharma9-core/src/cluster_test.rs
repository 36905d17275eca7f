use std::collections::HashSet;

use super::*;
use crate::fixtures::{at, pharmacy};
use crate::ratings::{decorate, RatingBook};

fn placed(id: PharmacyId, top: f64, left: f64) -> ProjectedPharmacy {
    ProjectedPharmacy {
        pharmacy: RatedPharmacy::new(pharmacy(id, &format!("P{id}"), "Plateau"), &RatingBook::new()),
        position: ScreenPosition { top, left },
    }
}

fn all_ids(items: &[MapItem]) -> Vec<PharmacyId> {
    let mut ids: Vec<PharmacyId> = items.iter().flat_map(MapItem::pharmacy_ids).collect();
    ids.sort_unstable();
    ids
}

fn clusters(items: &[MapItem]) -> Vec<&Cluster> {
    items
        .iter()
        .filter_map(|i| match i {
            MapItem::Cluster(c) => Some(c),
            MapItem::Marker { .. } => None,
        })
        .collect()
}

fn marker_ids(items: &[MapItem]) -> Vec<PharmacyId> {
    items
        .iter()
        .filter_map(|i| match i {
            MapItem::Marker { pharmacy, .. } => Some(pharmacy.id()),
            MapItem::Cluster(_) => None,
        })
        .collect()
}

#[test]
fn empty_input_yields_empty_output() {
    assert!(cluster_markers(&[], &FocusedIds::default(), DEFAULT_GRID_SIZE).is_empty());
}

#[test]
fn lone_items_stay_markers() {
    let items = [placed(1, 10.0, 10.0), placed(2, 50.0, 50.0)];
    let out = cluster_markers(&items, &FocusedIds::default(), DEFAULT_GRID_SIZE);
    assert_eq!(out.len(), 2);
    assert!(clusters(&out).is_empty());
}

#[test]
fn same_cell_items_form_one_cluster() {
    // All three fall in cell (1, 1) with an 8% grid.
    let items = [placed(1, 9.0, 9.0), placed(2, 10.0, 12.0), placed(3, 15.9, 8.1)];
    let out = cluster_markers(&items, &FocusedIds::default(), DEFAULT_GRID_SIZE);
    assert_eq!(out.len(), 1);
    let c = clusters(&out)[0];
    assert_eq!(c.id, "cluster-1-1");
    assert_eq!(c.count, 3);
    assert_eq!(c.representative().map(RatedPharmacy::id), Some(1));
    let member_ids: Vec<_> = c.members.iter().map(RatedPharmacy::id).collect();
    assert_eq!(member_ids, vec![1, 2, 3]);
}

#[test]
fn cluster_sits_at_mean_coordinate() {
    let rated = decorate(
        &[
            at(pharmacy(1, "A", "Plateau"), 14.670, -17.440),
            at(pharmacy(2, "B", "Plateau"), 14.672, -17.436),
        ],
        &RatingBook::new(),
    );
    let projection = BoundsProjection::dakar();
    let items = ProjectedPharmacy::project(&rated, &projection);
    let out = cluster_markers(&items, &FocusedIds::default(), DEFAULT_GRID_SIZE);
    let c = clusters(&out)[0];
    assert!((c.coordinates.lat - 14.671).abs() < 1e-9);
    assert!((c.coordinates.lng + 17.438).abs() < 1e-9);
    let expected = projection.project(c.coordinates);
    assert!((c.position.top - expected.top).abs() < 1e-9);
    assert!((c.position.left - expected.left).abs() < 1e-9);
}

#[test]
fn focused_items_are_never_clustered() {
    let items = [
        placed(1, 9.0, 9.0),
        placed(2, 9.5, 9.5),
        placed(3, 10.0, 10.0),
        placed(4, 10.5, 10.5),
    ];
    let focused = FocusedIds {
        selected: Some(2),
        highlighted: Some(4),
    };
    let out = cluster_markers(&items, &focused, DEFAULT_GRID_SIZE);
    let markers = marker_ids(&out);
    assert!(markers.contains(&2));
    assert!(markers.contains(&4));
    let c = clusters(&out)[0];
    let member_ids: Vec<_> = c.members.iter().map(RatedPharmacy::id).collect();
    assert_eq!(member_ids, vec![1, 3]);
}

#[test]
fn focused_item_alone_in_dense_cell_leaves_single_marker() {
    let items = [placed(1, 9.0, 9.0), placed(2, 9.5, 9.5)];
    let focused = FocusedIds {
        selected: Some(1),
        highlighted: None,
    };
    let out = cluster_markers(&items, &focused, DEFAULT_GRID_SIZE);
    assert!(clusters(&out).is_empty());
    let mut markers = marker_ids(&out);
    markers.sort_unstable();
    assert_eq!(markers, vec![1, 2]);
}

#[test]
fn every_input_appears_exactly_once() {
    let mut items = Vec::new();
    let mut id = 0;
    for row in 0..6 {
        for col in 0..7 {
            id += 1;
            let top = f64::from(row) * 5.3 + 1.0;
            let left = f64::from(col) * 4.1 + 2.0;
            items.push(placed(id, top, left));
        }
    }
    let focused = FocusedIds {
        selected: Some(5),
        highlighted: Some(17),
    };
    let out = cluster_markers(&items, &focused, DEFAULT_GRID_SIZE);

    let ids = all_ids(&out);
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(ids.len(), items.len(), "no loss or duplication");
    assert_eq!(unique.len(), items.len());
    assert!(clusters(&out).iter().all(|c| c.count >= 2 && c.count == c.members.len()));
}

#[test]
fn invalid_grid_size_falls_back_to_default() {
    let items = [placed(1, 9.0, 9.0), placed(2, 10.0, 10.0)];
    let a = cluster_markers(&items, &FocusedIds::default(), 0.0);
    let b = cluster_markers(&items, &FocusedIds::default(), DEFAULT_GRID_SIZE);
    assert_eq!(a, b);
}

#[test]
fn bounds_projection_maps_corners() {
    let p = BoundsProjection::dakar();
    let nw = p.project(Coordinates::new(14.78, -17.53));
    let se = p.project(Coordinates::new(14.65, -17.42));
    assert!(nw.top.abs() < 1e-9 && nw.left.abs() < 1e-9);
    assert!((se.top - 100.0).abs() < 1e-9 && (se.left - 100.0).abs() < 1e-9);
}

#[test]
fn map_item_serializes_with_type_tag() {
    let items = [placed(1, 9.0, 9.0), placed(2, 9.5, 9.5), placed(3, 60.0, 60.0)];
    let out = cluster_markers(&items, &FocusedIds::default(), DEFAULT_GRID_SIZE);
    let json = serde_json::to_value(&out).unwrap();
    let types: HashSet<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["type"].as_str().unwrap().to_string())
        .collect();
    assert!(types.contains("cluster"));
    assert!(types.contains("marker"));
}
