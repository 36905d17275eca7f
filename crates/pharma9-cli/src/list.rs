//! Read-only list, neighborhood, and map commands.

use pharma9_core::{BoundsProjection, Coordinates, MapItem, RatedPharmacy};
use pharma9_session::LocatorSession;
use pharma9_store::RatingPersistence;

/// `4.5 (2)` for rated pharmacies, a dash otherwise.
pub(crate) fn fmt_rating(pharmacy: &RatedPharmacy) -> String {
    match (pharmacy.average_rating, pharmacy.rating_count) {
        (Some(avg), Some(count)) => format!("{avg:.1} ({count})"),
        _ => "\u{2014}".to_string(),
    }
}

pub(crate) fn fmt_distance(pharmacy: &RatedPharmacy, origin: Option<Coordinates>) -> String {
    origin.map_or_else(
        || "\u{2014}".to_string(),
        |o| format!("{:.2} km", pharmacy.distance_from(o)),
    )
}

pub(crate) fn print_table(results: &[RatedPharmacy], origin: Option<Coordinates>) {
    println!(
        "{:<5}{:<32}{:<22}{:<10}{:<10}DISTANCE",
        "ID", "NAME", "NEIGHBORHOOD", "STATUS", "RATING"
    );
    for p in results {
        println!(
            "{:<5}{:<32}{:<22}{:<10}{:<10}{}",
            p.id(),
            p.pharmacy.name,
            p.pharmacy.neighborhood,
            p.pharmacy.status_label(),
            fmt_rating(p),
            fmt_distance(p, origin)
        );
    }
}

/// Print the filtered, sorted pharmacy list.
pub(crate) fn run_list<S: RatingPersistence>(session: &LocatorSession<S>) {
    let results = session.results();
    if results.is_empty() {
        println!("no pharmacies match the current filters");
        return;
    }
    print_table(&results, session.view().origin);
}

pub(crate) fn run_neighborhoods<S: RatingPersistence>(session: &LocatorSession<S>) {
    for name in session.neighborhoods() {
        println!("{name}");
    }
}

/// Print map items for the filtered list.
///
/// # Errors
///
/// Returns an error if JSON output was requested and serialization fails.
pub(crate) fn run_markers<S: RatingPersistence>(
    session: &LocatorSession<S>,
    grid_size: f64,
    json: bool,
) -> anyhow::Result<()> {
    let items = session.markers(&BoundsProjection::dakar(), grid_size);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!(
        "{:<9}{:<16}{:<7}{:<9}{:<9}MEMBERS",
        "TYPE", "ID", "COUNT", "TOP", "LEFT"
    );
    for item in &items {
        match item {
            MapItem::Marker { pharmacy, position } => println!(
                "{:<9}{:<16}{:<7}{:<9.2}{:<9.2}{}",
                "marker",
                pharmacy.id(),
                1,
                position.top,
                position.left,
                pharmacy.pharmacy.name
            ),
            MapItem::Cluster(cluster) => {
                let names: Vec<&str> = cluster
                    .members
                    .iter()
                    .map(|m| m.pharmacy.name.as_str())
                    .collect();
                println!(
                    "{:<9}{:<16}{:<7}{:<9.2}{:<9.2}{}",
                    "cluster",
                    cluster.id,
                    cluster.count,
                    cluster.position.top,
                    cluster.position.left,
                    names.join(", ")
                );
            }
        }
    }

    Ok(())
}
