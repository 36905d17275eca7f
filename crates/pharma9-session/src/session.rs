use std::sync::Arc;

use pharma9_core::{
    apply_rating, cluster_markers, decorate, neighborhood_options, query, Catalog, Coordinates,
    DutyFilter, Filters, FocusedIds, MapItem, MapProjection, NeighborhoodFilter, PharmacyId,
    ProjectedPharmacy, RatedPharmacy, RatingBook, ReviewRecord, SortMode, Stars,
};
use pharma9_store::RatingPersistence;

use crate::SessionError;

/// Process-local UI state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search: String,
    pub duty: DutyFilter,
    pub neighborhood: NeighborhoodFilter,
    pub sort: SortMode,
    pub selected_id: Option<PharmacyId>,
    pub highlighted_id: Option<PharmacyId>,
    pub origin: Option<Coordinates>,
    pub watching: bool,
}

impl ViewState {
    #[must_use]
    pub fn filters(&self) -> Filters {
        Filters {
            search: self.search.clone(),
            duty: self.duty,
            neighborhood: self.neighborhood.clone(),
        }
    }

    #[must_use]
    pub fn focused(&self) -> FocusedIds {
        FocusedIds {
            selected: self.selected_id,
            highlighted: self.highlighted_id,
        }
    }
}

/// One user's locator: catalog, rating book, and view state.
///
/// Every derived view is recomputed from the current state on demand, so a
/// rating or an origin change is reflected by the next call.
pub struct LocatorSession<S> {
    catalog: Arc<Catalog>,
    store: S,
    book: RatingBook,
    rated: Vec<RatedPharmacy>,
    view: ViewState,
}

impl<S: RatingPersistence> LocatorSession<S> {
    /// Load the persisted book and decorate the catalog with it.
    pub fn open(catalog: Arc<Catalog>, store: S) -> Self {
        let book = store.load();
        let rated = decorate(&catalog.pharmacies, &book);
        tracing::debug!(
            pharmacies = catalog.len(),
            rated = book.len(),
            "locator session opened"
        );
        Self {
            catalog,
            store,
            book,
            rated,
            view: ViewState::default(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn book(&self) -> &RatingBook {
        &self.book
    }

    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.view.search = term.into();
    }

    pub fn set_duty(&mut self, duty: DutyFilter) {
        self.view.duty = duty;
    }

    pub fn set_neighborhood(&mut self, neighborhood: NeighborhoodFilter) {
        self.view.neighborhood = neighborhood;
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.view.sort = sort;
    }

    pub fn set_origin(&mut self, origin: Option<Coordinates>) {
        self.view.origin = origin;
    }

    pub fn set_watching(&mut self, watching: bool) {
        self.view.watching = watching;
    }

    /// The filtered, sorted list.
    #[must_use]
    pub fn results(&self) -> Vec<RatedPharmacy> {
        query(
            &self.rated,
            &self.view.filters(),
            self.view.sort,
            self.view.origin,
        )
    }

    /// Picker options over the whole catalog, independent of the filters.
    #[must_use]
    pub fn neighborhoods(&self) -> Vec<String> {
        neighborhood_options(&self.catalog.pharmacies)
    }

    /// Map items for the current result list.
    #[must_use]
    pub fn markers<P>(&self, projection: &P, grid_size: f64) -> Vec<MapItem>
    where
        P: MapProjection + ?Sized,
    {
        let projected = ProjectedPharmacy::project(&self.results(), projection);
        cluster_markers(&projected, &self.view.focused(), grid_size)
    }

    /// Open the detail view of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when `id` is not in the catalog.
    pub fn select(&mut self, id: PharmacyId) -> Result<RatedPharmacy, SessionError> {
        let rated = self.rated_by_id(id).ok_or_else(|| SessionError::unknown(id))?;
        self.view.selected_id = Some(id);
        Ok(rated)
    }

    /// Select whatever a click on `item` opens: the marker's pharmacy, or a
    /// cluster's first member.
    pub fn activate(&mut self, item: &MapItem) -> Option<RatedPharmacy> {
        let id = match item {
            MapItem::Marker { pharmacy, .. } => pharmacy.id(),
            MapItem::Cluster(cluster) => cluster.representative()?.id(),
        };
        self.select(id).ok()
    }

    pub fn close_detail(&mut self) {
        self.view.selected_id = None;
    }

    pub fn highlight(&mut self, id: Option<PharmacyId>) {
        self.view.highlighted_id = id;
    }

    /// The open detail view, derived from the current book.
    #[must_use]
    pub fn selected(&self) -> Option<RatedPharmacy> {
        self.view.selected_id.and_then(|id| self.rated_by_id(id))
    }

    /// Written reviews of the selected pharmacy, newest first.
    #[must_use]
    pub fn reviews_for_selected(&self) -> Vec<&ReviewRecord> {
        self.view
            .selected_id
            .map(|id| self.catalog.reviews_for(id))
            .unwrap_or_default()
    }

    /// Record a star rating and persist the book.
    ///
    /// The returned record reflects the post-update aggregate. A failed save
    /// is logged and the in-memory book is kept, so the rating still counts
    /// for the rest of the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when `stars` is outside 1..=5 or `id` is not
    /// in the catalog. Neither case touches the book.
    pub fn rate(&mut self, id: PharmacyId, stars: u8) -> Result<RatedPharmacy, SessionError> {
        let stars = Stars::new(stars)?;
        if self.catalog.get(id).is_none() {
            return Err(SessionError::unknown(id));
        }

        self.book = apply_rating(&self.book, id, stars);
        if let Err(e) = self.store.save(&self.book) {
            tracing::warn!(pharmacy_id = id, error = %e, "failed to persist rating book");
        }

        for rated in self.rated.iter_mut().filter(|r| r.id() == id) {
            rated.refresh(&self.book);
        }

        let updated = self.rated_by_id(id).ok_or_else(|| SessionError::unknown(id))?;
        tracing::info!(
            pharmacy_id = id,
            stars = stars.get(),
            count = updated.rating_count.unwrap_or(0),
            "rating recorded"
        );
        Ok(updated)
    }

    fn rated_by_id(&self, id: PharmacyId) -> Option<RatedPharmacy> {
        self.rated.iter().find(|r| r.id() == id).cloned()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
