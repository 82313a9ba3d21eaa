use std::collections::HashSet;

use crate::model::{Movie, Person, Planet};
use crate::ordinal::OrdinalIndex;

/// Result of reference-based filtering.
///
/// `active == false` means no reference restriction applies, which is not the
/// same as an active restriction with no references.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Eligibility {
    pub references: Vec<String>,
    pub active: bool,
}

impl Eligibility {
    pub fn inactive() -> Self {
        Self::default()
    }
}

fn dedup_in_order<'a, I>(refs: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for r in refs {
        if seen.insert(r.as_str()) {
            out.push(r.clone());
        }
    }
    out
}

/// Combines the selected movie and planet (1-based ordinals into the fetched
/// collections) into the eligible reference list.
///
/// With both selected the result is the intersection, iterated in the movie's
/// character order. A selection that does not resolve contributes an empty list.
pub fn compute_eligible_identities(
    movie: Option<usize>,
    planet: Option<usize>,
    movies: &[Movie],
    planets: &[Planet],
) -> Eligibility {
    const EMPTY: &[String] = &[];
    let lookup = |ordinal: usize, len: usize| ordinal.checked_sub(1).filter(|i| *i < len);

    let characters = movie.map(|m| {
        lookup(m, movies.len())
            .map(|i| movies[i].characters.as_slice())
            .unwrap_or(EMPTY)
    });
    let residents = planet.map(|p| {
        lookup(p, planets.len())
            .map(|i| planets[i].residents.as_slice())
            .unwrap_or(EMPTY)
    });

    let references = match (characters, residents) {
        (None, None) => return Eligibility::inactive(),
        (Some(characters), None) => dedup_in_order(characters),
        (None, Some(residents)) => dedup_in_order(residents),
        (Some(characters), Some(residents)) => {
            let residents: HashSet<&str> = residents.iter().map(|r| r.as_str()).collect();
            dedup_in_order(
                characters
                    .iter()
                    .filter(|c| residents.contains(c.as_str())),
            )
        }
    };
    Eligibility {
        references,
        active: true,
    }
}

/// Case-insensitive substring match; an empty filter matches everything.
pub fn name_matches(name: &str, text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    name.to_lowercase().contains(&text.to_lowercase())
}

/// Positions of the records that pass both the reference restriction and the
/// text filter.
///
/// With an active restriction the result follows the eligible list's order and
/// references that do not resolve through `index` are dropped. Otherwise it
/// follows dataset order.
pub fn apply(
    people: &[Person],
    index: &OrdinalIndex,
    text: &str,
    eligibility: &Eligibility,
) -> Vec<usize> {
    if !eligibility.active {
        return people
            .iter()
            .enumerate()
            .filter(|(_, p)| name_matches(&p.name, text))
            .map(|(i, _)| i)
            .collect();
    }

    let mut seen: HashSet<usize> = HashSet::new();
    let mut out = Vec::new();
    for reference in eligibility.references.iter() {
        let Some(position) = index.resolve(reference).filter(|p| *p < people.len()) else {
            tracing::debug!(reference = reference.as_str(), "dropping unresolved reference");
            continue;
        };
        if !seen.insert(position) {
            continue;
        }
        if name_matches(&people[position].name, text) {
            out.push(position);
        }
    }
    out
}
