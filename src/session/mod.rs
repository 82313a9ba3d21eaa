use serde::Serialize;
use thiserror::Error;

use crate::filter::{self, Eligibility};
use crate::model::{Movie, Person, Planet};
use crate::ordinal::OrdinalIndex;
use crate::pagination::{self, DEFAULT_PAGE_SIZE};
use crate::source::{Endpoints, RecordSource, SourceError, Transport};

pub const LOAD_FAILED_MESSAGE: &str = "Unable to load data. Check your connection or try again later.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Loading,
    Ready,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceData {
    Pending,
    Ready {
        movies: Vec<Movie>,
        planets: Vec<Planet>,
    },
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub text: String,
    pub movie: Option<usize>,
    pub planet: Option<usize>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.movie.is_none() && self.planet.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageState {
    pub index: usize,
    pub page_size: usize,
    pub page_count: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("characters are not loaded yet")]
    NotReady,

    #[error("movie and planet lists are unavailable")]
    ReferencesUnavailable,

    #[error("unknown movie {ordinal}, expected 1-{available}")]
    UnknownMovie { ordinal: usize, available: usize },

    #[error("unknown planet {ordinal}, expected 1-{available}")]
    UnknownPlanet { ordinal: usize, available: usize },
}

/// Read-only view handed to the rendering boundary.
#[derive(Clone, Debug, Serialize)]
pub struct DerivedView<'a> {
    pub status: Status,
    pub error_message: Option<&'a str>,
    pub page_items: Vec<&'a Person>,
    pub page_count: usize,
    pub current_page_index: usize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub filters: &'a FilterState,
}

/// Owns the dataset and the browsing state of one session.
///
/// Every mutation recomputes the filtered positions and the page bookkeeping
/// before returning, so `derived_view` always reflects a single consistent
/// state.
#[derive(Clone, Debug)]
pub struct Session {
    status: Status,
    error_message: Option<String>,
    people: Vec<Person>,
    index: OrdinalIndex,
    references: ReferenceData,
    filters: FilterState,
    eligibility: Eligibility,
    filtered: Vec<usize>,
    page: PageState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Session {
    pub fn new(page_size: usize) -> Self {
        Self {
            status: Status::Loading,
            error_message: None,
            people: Vec::new(),
            index: OrdinalIndex::default(),
            references: ReferenceData::Pending,
            filters: FilterState::default(),
            eligibility: Eligibility::inactive(),
            filtered: Vec::new(),
            page: PageState {
                index: 0,
                page_size: page_size.max(1),
                page_count: 1,
            },
        }
    }

    /// Fetches people and the movie/planet reference lists concurrently and
    /// applies both results.
    pub async fn load<T: Transport>(&mut self, source: &RecordSource<T>, endpoints: &Endpoints) {
        let people = source.fetch_all::<Person>(&endpoints.people);
        let references = async {
            let (movies, planets) = tokio::join!(
                source.fetch_all::<Movie>(&endpoints.films),
                source.fetch_all::<Planet>(&endpoints.planets)
            );
            Ok::<_, SourceError>((movies?, planets?))
        };
        let (people, references) = tokio::join!(people, references);
        self.complete_load(people);
        self.complete_references(references);
    }

    pub fn complete_load(&mut self, result: Result<Vec<Person>, SourceError>) {
        if self.status != Status::Loading {
            tracing::debug!(status = ?self.status, "ignoring load completion");
            return;
        }
        match result {
            Ok(people) => {
                tracing::info!(count = people.len(), "characters loaded");
                self.index = OrdinalIndex::build(people.iter().map(|p| p.url.as_str()));
                self.people = people;
                self.status = Status::Ready;
                self.error_message = None;
                self.recompute();
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load characters");
                self.status = Status::Failed;
                self.error_message = Some(LOAD_FAILED_MESSAGE.to_string());
                self.people.clear();
                self.index = OrdinalIndex::default();
                self.filtered.clear();
            }
        }
    }

    /// Stores the movie and planet lists. A failure here only disables the
    /// reference filters.
    pub fn complete_references(&mut self, result: Result<(Vec<Movie>, Vec<Planet>), SourceError>) {
        match result {
            Ok((movies, planets)) => {
                tracing::info!(movies = movies.len(), planets = planets.len(), "reference lists loaded");
                self.references = ReferenceData::Ready { movies, planets };
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load reference lists");
                self.references = ReferenceData::Failed(e.to_string());
                self.filters.movie = None;
                self.filters.planet = None;
            }
        }
        self.recompute_eligibility();
        self.recompute();
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.page.page_size);
    }

    pub fn on_text_filter_change(&mut self, value: &str) {
        self.filters.text = value.to_string();
        self.page.index = 0;
        self.recompute();
    }

    pub fn on_movie_selected(&mut self, ordinal: Option<usize>) -> Result<(), SessionError> {
        if let Some(ordinal) = ordinal {
            let available = self.movies().ok_or(SessionError::ReferencesUnavailable)?.len();
            if ordinal == 0 || ordinal > available {
                return Err(SessionError::UnknownMovie { ordinal, available });
            }
        }
        self.filters.movie = ordinal;
        self.on_reference_selection_changed();
        Ok(())
    }

    pub fn on_planet_selected(&mut self, ordinal: Option<usize>) -> Result<(), SessionError> {
        if let Some(ordinal) = ordinal {
            let available = self.planets().ok_or(SessionError::ReferencesUnavailable)?.len();
            if ordinal == 0 || ordinal > available {
                return Err(SessionError::UnknownPlanet { ordinal, available });
            }
        }
        self.filters.planet = ordinal;
        self.on_reference_selection_changed();
        Ok(())
    }

    /// Moves to `index` without touching the filters; returns the effective
    /// (clamped) page index.
    pub fn on_page_change(&mut self, index: usize) -> usize {
        self.page.index = index.min(self.page.page_count - 1);
        self.page.index
    }

    pub fn on_next_page(&mut self) -> usize {
        self.on_page_change(self.page.index.saturating_add(1))
    }

    pub fn on_previous_page(&mut self) -> usize {
        self.on_page_change(self.page.index.saturating_sub(1))
    }

    pub fn on_reset_filters(&mut self) {
        self.filters = FilterState::default();
        self.page.index = 0;
        self.recompute_eligibility();
        self.recompute();
    }

    fn on_reference_selection_changed(&mut self) {
        self.page.index = 0;
        self.recompute_eligibility();
        self.recompute();
    }

    fn recompute_eligibility(&mut self) {
        self.eligibility = match &self.references {
            ReferenceData::Ready { movies, planets } => filter::compute_eligible_identities(
                self.filters.movie,
                self.filters.planet,
                movies,
                planets,
            ),
            _ => Eligibility::inactive(),
        };
    }

    fn recompute(&mut self) {
        self.filtered = if self.status == Status::Ready {
            filter::apply(&self.people, &self.index, &self.filters.text, &self.eligibility)
        } else {
            Vec::new()
        };
        let window = pagination::reconcile(self.filtered.len(), self.page.page_size, self.page.index);
        self.page.page_count = window.page_count;
        self.page.index = window.page_index;
    }

    pub fn derived_view(&self) -> DerivedView<'_> {
        let window = pagination::reconcile(self.filtered.len(), self.page.page_size, self.page.index);
        let page_items = self.filtered[window.start..window.end]
            .iter()
            .map(|i| &self.people[*i])
            .collect();
        DerivedView {
            status: self.status,
            error_message: self.error_message.as_deref(),
            page_items,
            page_count: window.page_count,
            current_page_index: window.page_index,
            filtered_count: self.filtered.len(),
            total_count: self.people.len(),
            filters: &self.filters,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn eligibility(&self) -> &Eligibility {
        &self.eligibility
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn movies(&self) -> Option<&[Movie]> {
        match &self.references {
            ReferenceData::Ready { movies, .. } => Some(movies),
            _ => None,
        }
    }

    pub fn planets(&self) -> Option<&[Planet]> {
        match &self.references {
            ReferenceData::Ready { planets, .. } => Some(planets),
            _ => None,
        }
    }

    pub fn reference_error(&self) -> Option<&str> {
        match &self.references {
            ReferenceData::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Case-insensitive exact lookup by name.
    pub fn person(&self, name: &str) -> Option<&Person> {
        let wanted = name.trim().to_lowercase();
        self.people.iter().find(|p| p.name.to_lowercase() == wanted)
    }
}
