//! Single-pharmacy commands: show, rate, share.

use std::io::IsTerminal;

use pharma9_core::{PharmacyId, SharePayload};
use pharma9_session::{
    share_pharmacy, Clipboard, ClipboardError, LocatorSession, ShareError, ShareOutcome,
    ShareTarget,
};
use pharma9_store::RatingPersistence;

use crate::list::fmt_rating;

/// Show one pharmacy's detail view with its reviews.
///
/// # Errors
///
/// Returns an error if `id` is not in the catalog.
pub(crate) fn run_show<S: RatingPersistence>(
    session: &mut LocatorSession<S>,
    id: PharmacyId,
) -> anyhow::Result<()> {
    let rated = session.select(id)?;
    let p = &rated.pharmacy;

    println!("{} [{}]", p.name, p.status_label());
    println!("Owner:      {}", p.owner);
    println!("Address:    {} ({})", p.address, p.neighborhood);
    println!("Phone:      {}", p.phone);
    println!("Hours:      {}", p.current_hours());
    println!("Rating:     {}", fmt_rating(&rated));
    println!("Directions: {}", p.directions_url());

    let reviews = session.reviews_for_selected();
    println!();
    if reviews.is_empty() {
        println!("no reviews yet");
        return Ok(());
    }
    println!("{:<12}{:<20}{:<7}COMMENT", "DATE", "REVIEWER", "STARS");
    for review in reviews {
        println!(
            "{:<12}{:<20}{:<7}{}",
            review.created_at.format("%Y-%m-%d").to_string(),
            review.reviewer_name,
            review.rating,
            review.comment
        );
    }

    Ok(())
}

/// Record a star rating and print the updated aggregate.
///
/// # Errors
///
/// Returns an error if `stars` is outside 1..=5 or `id` is not in the catalog.
pub(crate) fn run_rate<S: RatingPersistence>(
    session: &mut LocatorSession<S>,
    id: PharmacyId,
    stars: u8,
) -> anyhow::Result<()> {
    let updated = session.rate(id, stars)?;
    println!(
        "rated {} with {stars} star(s); now {}",
        updated.pharmacy.name,
        fmt_rating(&updated)
    );
    Ok(())
}

/// Terminal "share sheet": prints the payload when stdout is interactive.
struct TerminalShare {
    force_copy: bool,
}

impl ShareTarget for TerminalShare {
    fn share(&self, payload: &SharePayload) -> Result<(), ShareError> {
        if self.force_copy || !std::io::stdout().is_terminal() {
            return Err(ShareError::Unavailable);
        }
        println!("{}\n{}\n{}", payload.title, payload.text, payload.url);
        Ok(())
    }
}

/// Writes the copy-fallback text to stdout for piping into a clipboard tool.
struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        use std::io::Write;

        let mut out = std::io::stdout().lock();
        writeln!(out, "{text}").map_err(|e| ClipboardError(e.to_string()))
    }
}

/// Share a pharmacy, falling back to the copy text.
///
/// # Errors
///
/// Returns an error if `id` is not in the catalog.
pub(crate) fn run_share<S: RatingPersistence>(
    session: &LocatorSession<S>,
    id: PharmacyId,
    public_url: &str,
    force_copy: bool,
) -> anyhow::Result<()> {
    let record = session
        .catalog()
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("pharmacy {id} not found"))?;
    let url = format!("{}/pharmacies/{id}", public_url.trim_end_matches('/'));

    match share_pharmacy(&TerminalShare { force_copy }, &StdoutClipboard, record, &url) {
        ShareOutcome::Shared => {}
        ShareOutcome::Copied(notice) | ShareOutcome::Failed(notice) => eprintln!("{notice}"),
    }
    Ok(())
}
