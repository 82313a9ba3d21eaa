use serde::Deserialize;
use serde::Serialize;

/// A character record as returned by the `people` listing.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Person {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    pub homeworld: String,
    pub films: Vec<String>,
    pub species: Vec<String>,
    pub vehicles: Vec<String>,
    pub starships: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
}

impl Person {
    /// Height in meters, when the API reports a number of centimeters.
    pub fn height_meters(&self) -> Option<f64> {
        self.height.trim().parse::<f64>().ok().map(|cm| cm / 100.0)
    }

    /// Calendar date part of `created`.
    pub fn created_date(&self) -> &str {
        self.created.split('T').next().unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Movie {
    pub title: String,
    pub characters: Vec<String>,
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Planet {
    pub name: String,
    pub residents: Vec<String>,
    pub url: String,
}

/// One page of a listing endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct Listing<T> {
    pub count: usize,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}
