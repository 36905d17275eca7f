//! Grid clustering of map markers.
//!
//! Pharmacies are projected to percentage-of-viewport positions, then bucketed
//! into a square grid. Crowded cells collapse into one cluster marker. The
//! selected and highlighted pharmacies are never folded into a cluster.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::ratings::RatedPharmacy;
use crate::PharmacyId;

/// Cell edge, in percent of the viewport.
pub const DEFAULT_GRID_SIZE: f64 = 8.0;

/// Position on the map surface, in percent of the viewport from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPosition {
    pub top: f64,
    pub left: f64,
}

/// Converts geographic coordinates to screen positions.
///
/// Clustering only ever sees projected positions, so a real map provider can
/// replace [`BoundsProjection`] without touching the grid logic.
pub trait MapProjection {
    fn project(&self, coordinates: Coordinates) -> ScreenPosition;
}

/// Linear interpolation over a fixed lat/lng box. North is up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsProjection {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundsProjection {
    /// Dakar peninsula, Plateau to Parcelles Assainies.
    #[must_use]
    pub const fn dakar() -> Self {
        Self {
            min_lat: 14.65,
            max_lat: 14.78,
            min_lng: -17.53,
            max_lng: -17.42,
        }
    }
}

impl Default for BoundsProjection {
    fn default() -> Self {
        Self::dakar()
    }
}

impl MapProjection for BoundsProjection {
    fn project(&self, c: Coordinates) -> ScreenPosition {
        ScreenPosition {
            top: 100.0 - ((c.lat - self.min_lat) / (self.max_lat - self.min_lat)) * 100.0,
            left: ((c.lng - self.min_lng) / (self.max_lng - self.min_lng)) * 100.0,
        }
    }
}

/// Pharmacies exempt from clustering: the selected one and the hovered one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusedIds {
    pub selected: Option<PharmacyId>,
    pub highlighted: Option<PharmacyId>,
}

impl FocusedIds {
    #[must_use]
    pub fn contains(&self, id: PharmacyId) -> bool {
        self.selected == Some(id) || self.highlighted == Some(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPharmacy {
    pub pharmacy: RatedPharmacy,
    pub position: ScreenPosition,
}

impl ProjectedPharmacy {
    pub fn project<P>(items: &[RatedPharmacy], projection: &P) -> Vec<Self>
    where
        P: MapProjection + ?Sized,
    {
        items
            .iter()
            .map(|p| Self {
                position: projection.project(p.pharmacy.coordinates),
                pharmacy: p.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub id: String,
    pub count: usize,
    /// Arithmetic mean of the members' coordinates.
    pub coordinates: Coordinates,
    pub position: ScreenPosition,
    /// Members in bucket-insertion order.
    pub members: Vec<RatedPharmacy>,
}

impl Cluster {
    /// The member a click on this cluster selects: the first one bucketed.
    #[must_use]
    pub fn representative(&self) -> Option<&RatedPharmacy> {
        self.members.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapItem {
    Marker {
        pharmacy: RatedPharmacy,
        position: ScreenPosition,
    },
    Cluster(Cluster),
}

impl MapItem {
    /// Ids represented by this item, one for a marker, all members for a cluster.
    #[must_use]
    pub fn pharmacy_ids(&self) -> Vec<PharmacyId> {
        match self {
            MapItem::Marker { pharmacy, .. } => vec![pharmacy.id()],
            MapItem::Cluster(cluster) => cluster.members.iter().map(RatedPharmacy::id).collect(),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(position: ScreenPosition, grid_size: f64) -> (i64, i64) {
    (
        (position.top / grid_size).floor() as i64,
        (position.left / grid_size).floor() as i64,
    )
}

#[allow(clippy::cast_precision_loss)]
fn build_cluster(cell: (i64, i64), members: Vec<ProjectedPharmacy>) -> Cluster {
    let n = members.len() as f64;
    let (mut lat, mut lng, mut top, mut left) = (0.0, 0.0, 0.0, 0.0);
    for m in &members {
        lat += m.pharmacy.pharmacy.coordinates.lat;
        lng += m.pharmacy.pharmacy.coordinates.lng;
        top += m.position.top;
        left += m.position.left;
    }

    Cluster {
        id: format!("cluster-{}-{}", cell.0, cell.1),
        count: members.len(),
        coordinates: Coordinates::new(lat / n, lng / n),
        position: ScreenPosition {
            top: top / n,
            left: left / n,
        },
        members: members.into_iter().map(|m| m.pharmacy).collect(),
    }
}

/// Group projected pharmacies into markers and clusters.
///
/// Every input appears exactly once in the output, either as a standalone
/// marker or as a cluster member. A non-positive or non-finite `grid_size`
/// falls back to [`DEFAULT_GRID_SIZE`].
#[must_use]
pub fn cluster_markers(
    items: &[ProjectedPharmacy],
    focused: &FocusedIds,
    grid_size: f64,
) -> Vec<MapItem> {
    let grid_size = if grid_size.is_finite() && grid_size > 0.0 {
        grid_size
    } else {
        DEFAULT_GRID_SIZE
    };

    let mut cell_index: HashMap<(i64, i64), usize> = HashMap::new();
    let mut cells: Vec<((i64, i64), Vec<ProjectedPharmacy>)> = Vec::new();
    let mut standalone: Vec<&ProjectedPharmacy> = Vec::new();

    for item in items {
        if focused.contains(item.pharmacy.id()) {
            standalone.push(item);
            continue;
        }

        let cell = cell_of(item.position, grid_size);
        let idx = *cell_index.entry(cell).or_insert_with(|| {
            cells.push((cell, Vec::new()));
            cells.len() - 1
        });
        cells[idx].1.push(item.clone());
    }

    let mut out = Vec::with_capacity(cells.len() + standalone.len());
    for (cell, mut members) in cells {
        if members.len() == 1 {
            if let Some(only) = members.pop() {
                out.push(MapItem::Marker {
                    pharmacy: only.pharmacy,
                    position: only.position,
                });
            }
        } else {
            out.push(MapItem::Cluster(build_cluster(cell, members)));
        }
    }

    for item in standalone {
        out.push(MapItem::Marker {
            pharmacy: item.pharmacy.clone(),
            position: item.position,
        });
    }

    out
}

#[cfg(test)]
#[path = "cluster_test.rs"]
mod tests;
