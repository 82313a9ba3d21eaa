use serde::Serialize;

use crate::model::{Movie, Person, Planet};
use crate::session::{DerivedView, Status};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

fn summarize_filters(view: &DerivedView<'_>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if !view.filters.text.is_empty() {
        parts.push(format!("name~\"{}\"", view.filters.text));
    }
    if let Some(movie) = view.filters.movie {
        parts.push(format!("movie={movie}"));
    }
    if let Some(planet) = view.filters.planet {
        parts.push(format!("planet={planet}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// One line per character on the current page followed by a page footer.
pub fn render_text(view: &DerivedView<'_>) -> String {
    let mut out = String::new();
    match view.status {
        Status::Loading => {
            out.push_str("loading...\n");
            return out;
        }
        Status::Failed => {
            out.push_str(view.error_message.unwrap_or("failed to load data"));
            out.push('\n');
            return out;
        }
        Status::Ready => {}
    }

    if view.page_items.is_empty() {
        out.push_str("no characters match the current filters\n");
    }
    for p in view.page_items.iter() {
        out.push_str(&format!(
            "{:<24} {:>6} {:>6}  {:<8} {}\n",
            p.name, p.height, p.mass, p.birth_year, p.gender
        ));
    }
    out.push_str(&format!(
        ":: Page {}/{} :: {} of {} characters",
        view.current_page_index + 1,
        view.page_count,
        view.filtered_count,
        view.total_count
    ));
    if let Some(filters) = summarize_filters(view) {
        out.push_str(" :: ");
        out.push_str(&filters);
    }
    out.push('\n');
    out
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    serde_json::to_vec_pretty(value).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_movies(movies: &[Movie]) -> String {
    let mut out = String::new();
    for (i, m) in movies.iter().enumerate() {
        out.push_str(&format!("{:>3}  {} ({} characters)\n", i + 1, m.title, m.characters.len()));
    }
    out
}

pub fn render_planets(planets: &[Planet]) -> String {
    let mut out = String::new();
    for (i, p) in planets.iter().enumerate() {
        out.push_str(&format!("{:>3}  {} ({} residents)\n", i + 1, p.name, p.residents.len()));
    }
    out
}

fn format_kv(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("{:<16}: {}\n", label, value));
}

/// Detail view built only from the fetched record.
pub fn render_detail(person: &Person) -> String {
    let mut out = String::new();
    format_kv(&mut out, "Name", &person.name);
    let height = match person.height_meters() {
        Some(m) => format!("{m} m"),
        None => person.height.clone(),
    };
    format_kv(&mut out, "Height", &height);
    format_kv(&mut out, "Mass", &format!("{} kg", person.mass));
    format_kv(&mut out, "Birth year", &person.birth_year);
    format_kv(&mut out, "Gender", &person.gender);
    format_kv(&mut out, "Hair color", &person.hair_color);
    format_kv(&mut out, "Skin color", &person.skin_color);
    format_kv(&mut out, "Eye color", &person.eye_color);
    format_kv(&mut out, "Films", &person.films.len().to_string());
    format_kv(&mut out, "Vehicles", &person.vehicles.len().to_string());
    format_kv(&mut out, "Starships", &person.starships.len().to_string());
    format_kv(&mut out, "Created", person.created_date());
    out
}
