//! Small hand-built catalogs shared by the unit tests.

use crate::catalog::{Catalog, Hours, PharmacyRecord};
use crate::geo::Coordinates;
use crate::PharmacyId;

pub(crate) fn pharmacy(id: PharmacyId, name: &str, neighborhood: &str) -> PharmacyRecord {
    PharmacyRecord {
        id,
        name: name.to_string(),
        owner: format!("Dr. Owner {id}"),
        address: format!("{id} Rue Test"),
        neighborhood: neighborhood.to_string(),
        phone: format!("+221 33 800 00 {id:02}"),
        coordinates: Coordinates::new(14.70, -17.45),
        on_duty: false,
        hours: Hours {
            standard: "08:00 - 22:00".to_string(),
            on_duty: "24h/24".to_string(),
        },
    }
}

pub(crate) fn at(mut p: PharmacyRecord, lat: f64, lng: f64) -> PharmacyRecord {
    p.coordinates = Coordinates::new(lat, lng);
    p
}

pub(crate) fn on_duty(mut p: PharmacyRecord) -> PharmacyRecord {
    p.on_duty = true;
    p
}

/// Three pharmacies in {Plateau, Medina, Plateau}; only the first is on duty.
pub(crate) fn three_pharmacies() -> Catalog {
    Catalog {
        pharmacies: vec![
            on_duty(at(pharmacy(1, "Pharmacie Alpha", "Plateau"), 14.668, -17.437)),
            at(pharmacy(2, "Pharmacie Beta", "Medina"), 14.685, -17.451),
            at(pharmacy(3, "Pharmacie Gamma", "Plateau"), 14.672, -17.431),
        ],
        reviews: vec![],
    }
}
