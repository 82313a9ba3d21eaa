use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::model::{Movie, Person, Planet};
use crate::session::{Session, Status};
use crate::source::{Endpoints, HttpTransport, RecordSource, SourceError, Transport};

const PEOPLE: &str = "http://swapi.test/api/people/";
const FILMS: &str = "http://swapi.test/api/films/";
const PLANETS: &str = "http://swapi.test/api/planets/";

fn person_url(n: usize) -> String {
    format!("{PEOPLE}{n}/")
}

#[derive(Clone)]
enum Reply {
    Body(Vec<u8>),
    Status(u16),
}

#[derive(Default)]
struct MemoryTransport {
    routes: HashMap<String, (Duration, Reply)>,
    requested: Mutex<Vec<String>>,
}

impl MemoryTransport {
    fn route(mut self, url: &str, delay_ms: u64, body: serde_json::Value) -> Self {
        self.routes.insert(
            url.to_string(),
            (Duration::from_millis(delay_ms), Reply::Body(body.to_string().into_bytes())),
        );
        self
    }

    fn fail(mut self, url: &str, status: u16) -> Self {
        self.routes
            .insert(url.to_string(), (Duration::ZERO, Reply::Status(status)));
        self
    }

    /// Serves `count` people split into pages of ten, with later pages
    /// answering faster than earlier ones.
    fn people(self, collection: &str, count: usize) -> Self {
        let pages = count.div_ceil(10);
        let mut out = self.route(collection, 0, json!({"count": count, "results": []}));
        for page in 1..=pages {
            let results: Vec<_> = ((page - 1) * 10 + 1..=(page * 10).min(count))
                .map(|n| json!({"name": format!("Person {n}"), "url": person_url(n)}))
                .collect();
            let delay = ((pages - page) as u64) * 15;
            out = out.route(
                &format!("{collection}?page={page}"),
                delay,
                json!({"count": count, "results": results}),
            );
        }
        out
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.requested.lock().unwrap().push(url.to_string());
        let (delay, reply) = self
            .routes
            .get(url)
            .cloned()
            .unwrap_or((Duration::ZERO, Reply::Status(404)));
        tokio::time::sleep(delay).await;
        match reply {
            Reply::Body(body) => Ok(body),
            Reply::Status(status) => Err(SourceError::Status {
                url: url.to_string(),
                status,
                reason: String::new(),
            }),
        }
    }
}

fn endpoints() -> Endpoints {
    Endpoints {
        people: PEOPLE.to_string(),
        films: FILMS.to_string(),
        planets: PLANETS.to_string(),
    }
}

fn with_references(transport: MemoryTransport) -> MemoryTransport {
    transport
        .route(FILMS, 0, json!({"count": 1, "results": []}))
        .route(
            &format!("{FILMS}?page=1"),
            0,
            json!({"count": 1, "results": [
                {"title": "A New Hope", "characters": [person_url(1), person_url(4)]}
            ]}),
        )
        .route(PLANETS, 0, json!({"count": 2, "results": []}))
        .route(
            &format!("{PLANETS}?page=1"),
            0,
            json!({"count": 2, "results": [
                {"name": "Tatooine", "residents": [person_url(1)]},
                {"name": "Alderaan", "residents": [person_url(4), person_url(9)]}
            ]}),
        )
}

#[tokio::test]
async fn fetch_all_keeps_page_order() {
    let source = RecordSource::new(MemoryTransport::default().people(PEOPLE, 23));
    let people: Vec<Person> = source.fetch_all(PEOPLE).await.unwrap();
    assert_eq!(people.len(), 23);
    for (i, p) in people.iter().enumerate() {
        assert_eq!(crate::ordinal::ordinal_from_url(&p.url), Some(i + 1));
    }
    let requested = source.transport().requested();
    assert_eq!(requested.len(), 4);
    assert_eq!(requested[0], PEOPLE);
}

#[tokio::test]
async fn fetch_all_with_one_request_at_a_time() {
    let source = RecordSource::new(MemoryTransport::default().people(PEOPLE, 31))
        .with_concurrency(1)
        .with_rate(1000);
    let people: Vec<Person> = source.fetch_all(PEOPLE).await.unwrap();
    assert_eq!(people.len(), 31);
    assert_eq!(people[30].name, "Person 31");
}

#[tokio::test]
async fn fetch_all_of_empty_collection_skips_pages() {
    let source = RecordSource::new(MemoryTransport::default().route(
        PEOPLE,
        0,
        json!({"count": 0, "results": []}),
    ));
    let people: Vec<Person> = source.fetch_all(PEOPLE).await.unwrap();
    assert!(people.is_empty());
    assert_eq!(source.transport().requested().len(), 1);
}

#[tokio::test]
async fn fetch_all_fails_when_any_page_fails() {
    let transport = MemoryTransport::default()
        .people(PEOPLE, 23)
        .fail(&format!("{PEOPLE}?page=2"), 500);
    let source = RecordSource::new(transport);
    let err = source.fetch_all::<Person>(PEOPLE).await.unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 500, .. }));
}

#[tokio::test]
async fn fetch_all_rejects_implausible_count() {
    let source = RecordSource::new(MemoryTransport::default().route(
        PEOPLE,
        0,
        json!({"count": 100_000_000_000_000_000u64, "results": []}),
    ));
    let err = source.fetch_all::<Person>(PEOPLE).await.unwrap_err();
    assert!(matches!(
        err,
        SourceError::ImplausibleCount { count: 100_000_000_000_000_000, .. }
    ));
    assert_eq!(source.transport().requested().len(), 1);
}

#[tokio::test]
async fn fetch_all_honours_max_pages() {
    let source = RecordSource::new(MemoryTransport::default().people(PEOPLE, 31)).with_max_pages(3);
    let err = source.fetch_all::<Person>(PEOPLE).await.unwrap_err();
    assert!(matches!(
        err,
        SourceError::ImplausibleCount { page_count: 4, max_pages: 3, .. }
    ));

    let source = RecordSource::new(MemoryTransport::default().people(PEOPLE, 30)).with_max_pages(3);
    assert_eq!(source.fetch_all::<Person>(PEOPLE).await.unwrap().len(), 30);
}

#[tokio::test]
async fn fetch_all_reports_undecodable_pages() {
    let transport = MemoryTransport::default()
        .route(PEOPLE, 0, json!({"count": 1, "results": []}))
        .route(&format!("{PEOPLE}?page=1"), 0, json!({"unexpected": true}));
    let source = RecordSource::new(transport);
    let err = source.fetch_all::<Person>(PEOPLE).await.unwrap_err();
    assert!(matches!(err, SourceError::Decode { .. }));
}

#[tokio::test]
async fn fetch_all_honours_api_page_size() {
    let transport = MemoryTransport::default()
        .route(PEOPLE, 0, json!({"count": 3, "results": []}))
        .route(
            &format!("{PEOPLE}?page=1"),
            0,
            json!({"count": 3, "results": [{"name": "a"}, {"name": "b"}]}),
        )
        .route(
            &format!("{PEOPLE}?page=2"),
            0,
            json!({"count": 3, "results": [{"name": "c"}]}),
        );
    let source = RecordSource::new(transport).with_api_page_size(2);
    let people: Vec<Person> = source.fetch_all(PEOPLE).await.unwrap();
    let names: Vec<_> = people.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn session_load_filters_across_collections() {
    let source = RecordSource::new(with_references(MemoryTransport::default().people(PEOPLE, 23)));
    let mut session = Session::default();
    session.load(&source, &endpoints()).await;

    assert_eq!(session.status(), Status::Ready);
    assert_eq!(session.movies().map(<[Movie]>::len), Some(1));
    assert_eq!(session.planets().map(<[Planet]>::len), Some(2));

    session.on_movie_selected(Some(1)).unwrap();
    session.on_planet_selected(Some(2)).unwrap();
    let view = session.derived_view();
    let urls: Vec<_> = view.page_items.iter().map(|p| p.url.clone()).collect();
    assert_eq!(urls, vec![person_url(4)]);
}

#[tokio::test]
async fn session_load_failure_sets_failed() {
    let source = RecordSource::new(with_references(
        MemoryTransport::default().fail(PEOPLE, 503),
    ));
    let mut session = Session::default();
    session.load(&source, &endpoints()).await;
    let view = session.derived_view();
    assert_eq!(view.status, Status::Failed);
    assert!(view.error_message.is_some_and(|m| !m.is_empty()));
    assert!(view.page_items.is_empty());
}

#[tokio::test]
async fn session_reference_failure_is_scoped() {
    let transport = MemoryTransport::default()
        .people(PEOPLE, 23)
        .fail(FILMS, 500)
        .route(PLANETS, 0, json!({"count": 0, "results": []}));
    let source = RecordSource::new(transport);
    let mut session = Session::default();
    session.load(&source, &endpoints()).await;

    assert_eq!(session.status(), Status::Ready);
    assert!(session.reference_error().is_some());
    assert_eq!(session.derived_view().page_count, 3);
    session.on_text_filter_change("sky");
    assert_eq!(session.derived_view().filtered_count, 0);
}

#[tokio::test]
async fn session_text_search_matches_case_insensitively() {
    let transport = MemoryTransport::default()
        .route(PEOPLE, 0, json!({"count": 2, "results": []}))
        .route(
            &format!("{PEOPLE}?page=1"),
            0,
            json!({"count": 2, "results": [
                {"name": "Luke Skywalker", "url": person_url(1)},
                {"name": "Leia Organa", "url": person_url(2)}
            ]}),
        );
    let source = RecordSource::new(with_references(transport));
    let mut session = Session::default();
    session.load(&source, &endpoints()).await;
    session.on_text_filter_change("sky");
    let names: Vec<_> = session
        .derived_view()
        .page_items
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(names, vec!["Luke Skywalker"]);
}

/// Answers each request on `listener` from `routes` (keyed by request target)
/// and closes the connection.
async fn serve(listener: TcpListener, routes: HashMap<String, (u16, String)>) {
    loop {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        let routes = routes.clone();
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let head = String::from_utf8_lossy(&buf).to_string();
            let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
            let (status, body) = routes
                .get(&target)
                .cloned()
                .unwrap_or((404, "{}".to_string()));
            let reason = if status == 200 { "OK" } else { "Not Found" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        });
    }
}

fn local_transport() -> HttpTransport {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    HttpTransport::new(client)
}

#[tokio::test]
async fn http_transport_reads_pages_and_maps_status() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut routes = HashMap::new();
    routes.insert(
        "/api/people/".to_string(),
        (200, json!({"count": 12, "results": []}).to_string()),
    );
    let page = |range: std::ops::RangeInclusive<usize>| {
        let results: Vec<_> = range
            .map(|n| json!({"name": format!("Person {n}"), "url": format!("http://{addr}/api/people/{n}/")}))
            .collect();
        json!({"count": 12, "results": results}).to_string()
    };
    routes.insert("/api/people/?page=1".to_string(), (200, page(1..=10)));
    routes.insert("/api/people/?page=2".to_string(), (200, page(11..=12)));
    tokio::spawn(serve(listener, routes));

    let transport = local_transport();
    let missing = transport.get(&format!("http://{addr}/api/missing/")).await;
    assert!(matches!(missing, Err(SourceError::Status { status: 404, .. })));

    let source = RecordSource::new(transport);
    let people: Vec<Person> = source
        .fetch_all(&format!("http://{addr}/api/people/"))
        .await
        .unwrap();
    assert_eq!(people.len(), 12);
    assert_eq!(people[11].name, "Person 12");
}

#[tokio::test]
async fn http_transport_reports_connection_errors() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let transport = local_transport();
    let err = transport
        .get(&format!("http://{addr}/api/people/"))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Transport { .. }));
}

#[test]
fn proxy_setup_errors_are_reported() {
    assert!(matches!(
        HttpTransport::build(Some("::not a proxy::"), 5),
        Err(SourceError::ProxySetup { .. })
    ));
}
