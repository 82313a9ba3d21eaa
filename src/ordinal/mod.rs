use std::collections::HashMap;

/// Parses the ordinal identity out of a resource URL.
///
/// The API addresses every record as `<collection>/<n>/`, where `n` is the
/// record's 1-based position in its collection. A single trailing slash is
/// allowed; anything else after the number, or a number of zero, is rejected.
pub fn ordinal_from_url(url: &str) -> Option<usize> {
    let trimmed = url.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    let segment = trimmed.rsplit('/').next()?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match segment.parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// Maps ordinal identities to positions in a fetched collection.
#[derive(Clone, Debug, Default)]
pub struct OrdinalIndex {
    positions: HashMap<usize, usize>,
}

impl OrdinalIndex {
    pub fn build<'a, I>(urls: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut positions = HashMap::new();
        for (position, url) in urls.into_iter().enumerate() {
            let Some(ordinal) = ordinal_from_url(url) else {
                tracing::debug!(url, position, "record url has no ordinal identity");
                continue;
            };
            if ordinal != position + 1 {
                tracing::debug!(url, position, ordinal, "record ordinal differs from fetch position");
            }
            positions.entry(ordinal).or_insert(position);
        }
        Self { positions }
    }

    /// Position of the record referenced by `url`, if it is known.
    pub fn resolve(&self, url: &str) -> Option<usize> {
        let ordinal = ordinal_from_url(url)?;
        self.positions.get(&ordinal).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
