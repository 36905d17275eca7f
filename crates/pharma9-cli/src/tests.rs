use pharma9_core::{Hours, PharmacyRecord, RatedPharmacy, RatingBook, Stars};

use super::*;
use crate::list::{fmt_distance, fmt_rating};

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["pharma9-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn list_defaults_to_all_duty_and_distance_sort() {
    let cli = Cli::try_parse_from(["pharma9-cli", "list"]).expect("expected valid cli args");
    let Some(Commands::List { filters }) = cli.command else {
        panic!("expected list command");
    };
    assert_eq!(filters.search, "");
    assert_eq!(filters.duty, DutyFilter::All);
    assert_eq!(filters.sort, SortMode::Distance);
    assert!(filters.neighborhood.is_none());
    assert!(filters.origin.is_none());
    assert!(!filters.no_origin);
}

#[test]
fn list_parses_filters_sort_and_origin() {
    let cli = Cli::try_parse_from([
        "pharma9-cli",
        "list",
        "-q",
        "phar",
        "--duty",
        "on_duty",
        "--neighborhood",
        "Plateau",
        "--sort",
        "rating",
        "--origin",
        "14.69,-17.44",
    ])
    .expect("expected valid cli args");
    let Some(Commands::List { filters }) = cli.command else {
        panic!("expected list command");
    };
    assert_eq!(filters.search, "phar");
    assert_eq!(filters.duty, DutyFilter::OnDuty);
    assert_eq!(filters.neighborhood.as_deref(), Some("Plateau"));
    assert_eq!(filters.sort, SortMode::Rating);
    assert_eq!(filters.origin, Some(Coordinates::new(14.69, -17.44)));
}

#[test]
fn list_rejects_unknown_sort_mode() {
    assert!(Cli::try_parse_from(["pharma9-cli", "list", "--sort", "price"]).is_err());
}

#[test]
fn list_rejects_out_of_range_origin() {
    assert!(Cli::try_parse_from(["pharma9-cli", "list", "--origin", "95,-17.4"]).is_err());
}

#[test]
fn origin_conflicts_with_no_origin() {
    assert!(Cli::try_parse_from([
        "pharma9-cli",
        "list",
        "--origin",
        "14.7,-17.4",
        "--no-origin"
    ])
    .is_err());
}

#[test]
fn parses_rate_command() {
    let cli = Cli::try_parse_from(["pharma9-cli", "rate", "4", "5"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Rate { id: 4, stars: 5 })
    ));
}

#[test]
fn parses_show_and_share_commands() {
    let cli = Cli::try_parse_from(["pharma9-cli", "show", "2"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Show { id: 2 })));

    let cli = Cli::try_parse_from(["pharma9-cli", "share", "2", "--copy"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Share { id: 2, copy: true })
    ));
}

#[test]
fn parses_markers_with_focus_and_grid() {
    let cli = Cli::try_parse_from([
        "pharma9-cli",
        "markers",
        "--selected",
        "3",
        "--highlighted",
        "7",
        "--grid",
        "12.5",
        "--json",
    ])
    .expect("expected valid cli args");
    let Some(Commands::Markers {
        selected,
        highlighted,
        grid,
        json,
        ..
    }) = cli.command
    else {
        panic!("expected markers command");
    };
    assert_eq!(selected, Some(3));
    assert_eq!(highlighted, Some(7));
    assert_eq!(grid, Some(12.5));
    assert!(json);
}

#[test]
fn markers_grid_falls_back_to_config() {
    let cli = Cli::try_parse_from(["pharma9-cli", "markers"]).expect("expected valid cli args");
    let Some(Commands::Markers { grid, .. }) = cli.command else {
        panic!("expected markers command");
    };
    assert!(grid.is_none());
}

#[test]
fn parses_watch_with_limit() {
    let cli = Cli::try_parse_from(["pharma9-cli", "watch", "--limit", "3", "--duty", "standard"])
        .expect("expected valid cli args");
    let Some(Commands::Watch { filters, limit }) = cli.command else {
        panic!("expected watch command");
    };
    assert_eq!(limit, 3);
    assert_eq!(filters.duty, DutyFilter::Standard);
}

#[test]
fn global_paths_parse_after_subcommand() {
    let cli = Cli::try_parse_from([
        "pharma9-cli",
        "neighborhoods",
        "--catalog",
        "/tmp/catalog.yaml",
        "--ratings",
        "/tmp/ratings.json",
    ])
    .expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Neighborhoods)));
    assert_eq!(cli.catalog, Some(PathBuf::from("/tmp/catalog.yaml")));
    assert_eq!(cli.ratings, Some(PathBuf::from("/tmp/ratings.json")));
}

fn rated(book: &RatingBook) -> RatedPharmacy {
    let record = PharmacyRecord {
        id: 1,
        name: "Pharmacie du Plateau".to_string(),
        owner: "Dr. Diop".to_string(),
        address: "12 Avenue Pompidou".to_string(),
        neighborhood: "Plateau".to_string(),
        phone: "+221 33 821 00 01".to_string(),
        coordinates: Coordinates::new(14.668, -17.437),
        on_duty: true,
        hours: Hours {
            standard: "08:00 - 22:00".to_string(),
            on_duty: "24h/24".to_string(),
        },
    };
    RatedPharmacy::new(record, book)
}

#[test]
fn fmt_rating_shows_dash_until_rated() {
    let mut book = RatingBook::new();
    assert_eq!(fmt_rating(&rated(&book)), "\u{2014}");

    book.record(1, Stars::new(5).expect("stars"));
    book.record(1, Stars::new(4).expect("stars"));
    assert_eq!(fmt_rating(&rated(&book)), "4.5 (2)");
}

#[test]
fn fmt_distance_needs_an_origin() {
    let p = rated(&RatingBook::new());
    assert_eq!(fmt_distance(&p, None), "\u{2014}");
    assert_eq!(
        fmt_distance(&p, Some(Coordinates::new(14.668, -17.437))),
        "0.00 km"
    );
}
