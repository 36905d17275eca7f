use pharma9_core::{parse_catalog, BoundsProjection, RatingAccumulator, DEFAULT_GRID_SIZE};
use pharma9_store::{JsonFileStore, MemoryStore, StoreError};

use super::*;

const CATALOG: &str = r#"
pharmacies:
  - id: 1
    name: Pharmacie Alpha
    owner: Dr. Diop
    address: 1 Avenue Pompidou
    neighborhood: Plateau
    phone: "+221 33 821 00 01"
    coordinates: { lat: 14.668, lng: -17.437 }
    on_duty: true
    hours: { standard: "08:00 - 22:00", on_duty: "24h/24" }
  - id: 2
    name: Pharmacie Beta
    owner: Dr. Ndiaye
    address: 2 Rue 11
    neighborhood: Médina
    phone: "+221 33 822 00 02"
    coordinates: { lat: 14.685, lng: -17.451 }
    on_duty: false
    hours: { standard: "08:00 - 22:00", on_duty: "24h/24" }
  - id: 3
    name: Pharmacie Gamma
    owner: Dr. Sow
    address: 3 Rue Carnot
    neighborhood: Plateau
    phone: "+221 33 823 00 03"
    coordinates: { lat: 14.672, lng: -17.431 }
    on_duty: false
    hours: { standard: "08:00 - 22:00", on_duty: "24h/24" }
reviews:
  - id: 1
    pharmacy_id: 1
    reviewer_name: Awa
    rating: 5
    comment: Très accueillant.
    created_at: 2024-03-01T10:00:00Z
  - id: 2
    pharmacy_id: 1
    reviewer_name: Moussa
    rating: 4
    comment: Ouvert la nuit.
    created_at: 2024-05-12T22:30:00Z
"#;

fn catalog() -> Arc<Catalog> {
    Arc::new(parse_catalog(CATALOG).unwrap())
}

fn session() -> LocatorSession<MemoryStore> {
    LocatorSession::open(catalog(), MemoryStore::new())
}

fn ids(items: &[RatedPharmacy]) -> Vec<PharmacyId> {
    items.iter().map(RatedPharmacy::id).collect()
}

struct BrokenStore;

impl RatingPersistence for BrokenStore {
    fn load(&self) -> RatingBook {
        RatingBook::new()
    }

    fn save(&self, _book: &RatingBook) -> Result<(), StoreError> {
        Err(StoreError::Io {
            path: "/nowhere".to_string(),
            source: std::io::Error::other("disk full"),
        })
    }
}

#[test]
fn fresh_session_lists_catalog_in_order_without_ratings() {
    let s = session();
    let results = s.results();
    assert_eq!(ids(&results), vec![1, 2, 3]);
    assert!(results.iter().all(|r| r.average_rating.is_none()));
}

#[test]
fn search_and_duty_filter_narrow_results() {
    let mut s = session();
    s.set_search("phar");
    s.set_duty(DutyFilter::OnDuty);
    assert_eq!(ids(&s.results()), vec![1]);
}

#[test]
fn neighborhood_options_ignore_active_filters() {
    let mut s = session();
    s.set_duty(DutyFilter::OnDuty);
    assert_eq!(
        s.neighborhoods(),
        vec!["Tous les quartiers", "Médina", "Plateau"]
    );
}

#[test]
fn origin_change_reorders_distance_sort() {
    let mut s = session();
    s.set_sort(SortMode::Distance);
    assert_eq!(ids(&s.results()), vec![1, 2, 3], "no origin keeps order");

    s.set_origin(Some(Coordinates::new(14.685, -17.451)));
    assert_eq!(s.results()[0].id(), 2);

    s.set_origin(Some(Coordinates::new(14.672, -17.431)));
    assert_eq!(s.results()[0].id(), 3);
}

#[test]
fn two_ratings_average_and_update_open_detail() {
    let mut s = session();
    s.select(2).unwrap();

    s.rate(2, 4).unwrap();
    let after = s.rate(2, 2).unwrap();

    assert_eq!(after.rating_count, Some(2));
    assert!((after.average_rating.unwrap() - 3.0).abs() < 1e-9);

    let detail = s.selected().unwrap();
    assert_eq!(detail.rating_count, Some(2));
    assert_eq!(
        s.book().get(2),
        Some(&RatingAccumulator {
            total_stars: 6,
            count: 2
        })
    );
}

#[test]
fn rating_feeds_rating_sort() {
    let mut s = session();
    s.set_sort(SortMode::Rating);
    s.rate(3, 5).unwrap();
    s.rate(2, 3).unwrap();
    assert_eq!(ids(&s.results()), vec![3, 2, 1]);
}

#[test]
fn invalid_stars_leave_book_untouched() {
    let mut s = session();
    assert!(s.rate(1, 0).is_err());
    assert!(s.rate(1, 6).is_err());
    assert!(s.book().is_empty());
}

#[test]
fn unknown_pharmacy_is_rejected() {
    let mut s = session();
    let err = s.rate(99, 3).unwrap_err();
    assert!(err.is_unknown_pharmacy());
    assert!(s.select(99).unwrap_err().is_unknown_pharmacy());
    assert!(s.book().is_empty());
}

#[test]
fn failed_save_keeps_the_rating_in_memory() {
    let mut s = LocatorSession::open(catalog(), BrokenStore);
    let updated = s.rate(1, 5).unwrap();
    assert_eq!(updated.rating_count, Some(1));
    assert_eq!(s.book().len(), 1);
}

#[test]
fn ratings_survive_reopening_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ratings.json");

    let mut first = LocatorSession::open(catalog(), JsonFileStore::new(&path));
    first.rate(1, 4).unwrap();
    drop(first);

    let second = LocatorSession::open(catalog(), JsonFileStore::new(&path));
    let alpha = &second.results()[0];
    assert_eq!(alpha.rating_count, Some(1));
    assert!((alpha.average_rating.unwrap() - 4.0).abs() < 1e-9);
}

#[test]
fn reviews_for_selected_are_newest_first() {
    let mut s = session();
    assert!(s.reviews_for_selected().is_empty());

    s.select(1).unwrap();
    let names: Vec<&str> = s
        .reviews_for_selected()
        .iter()
        .map(|r| r.reviewer_name.as_str())
        .collect();
    assert_eq!(names, vec!["Moussa", "Awa"]);

    s.close_detail();
    assert!(s.selected().is_none());
}

#[test]
fn selected_pharmacy_is_never_clustered() {
    let mut s = session();
    // A grid wide enough to put everything in one cell.
    let grid = 1_000.0;
    let items = s.markers(&BoundsProjection::dakar(), grid);
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], MapItem::Cluster(_)));

    s.select(1).unwrap();
    let items = s.markers(&BoundsProjection::dakar(), grid);
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .any(|i| matches!(i, MapItem::Marker { pharmacy, .. } if pharmacy.id() == 1)));
}

#[test]
fn activating_a_cluster_selects_its_first_member() {
    let mut s = session();
    let items = s.markers(&BoundsProjection::dakar(), 1_000.0);
    let opened = s.activate(&items[0]).unwrap();
    assert_eq!(opened.id(), 1);
    assert_eq!(s.view().selected_id, Some(1));
}

#[test]
fn markers_follow_the_filtered_list() {
    let mut s = session();
    s.set_neighborhood(NeighborhoodFilter::from_label("Médina"));
    let items = s.markers(&BoundsProjection::dakar(), DEFAULT_GRID_SIZE);
    let all: Vec<PharmacyId> = items.iter().flat_map(MapItem::pharmacy_ids).collect();
    assert_eq!(all, vec![2]);
}
