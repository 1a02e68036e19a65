//! Integration tests for the resource stores using wiremock
//!
//! These tests drive the stores over real HTTP against mocked SWAPI
//! endpoints, checking caching, ordering, error normalization and batch
//! resolution end to end.

use holonet::resource::{Film, Person, Planet, ResourceStore, StoreOptions, Stores};
use holonet::swapi::{SwapiClient, SwapiHttpClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SwapiClient {
    SwapiClient::new(&format!("{}/api", server.uri())).expect("client should build")
}

fn entity_url(server: &MockServer, path: &str) -> String {
    format!("{}/api/{}", server.uri(), path)
}

/// Test module for list and detail endpoints
mod store_tests {
    use super::*;

    /// list_all sorts films by episode and only hits the network once
    #[tokio::test]
    async fn test_list_all_sorted_and_cached() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/films/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "next": null,
                "previous": null,
                "results": [
                    {"title": "The Empire Strikes Back", "episode_id": 5, "url": entity_url(&server, "films/2/")},
                    {"title": "A New Hope", "episode_id": 4, "url": entity_url(&server, "films/1/")}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store: ResourceStore<Film, SwapiHttpClient> =
            ResourceStore::new(&client(&server), StoreOptions::default());

        let films = store.list_all().await;
        assert_eq!(films.len(), 2);
        assert_eq!(films[0].episode_id, 4);
        assert_eq!(films[1].episode_id, 5);
        assert!(store.list_loaded());
        assert!(!store.loading());

        let cached = store.list_all().await;
        assert_eq!(cached, films);
    }

    /// get_by_id requests the canonical URL exactly once
    #[tokio::test]
    async fn test_get_by_id_hits_network_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/people/2/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "C-3PO",
                "height": "167",
                "homeworld": entity_url(&server, "planets/1/"),
                "url": entity_url(&server, "people/2/")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store: ResourceStore<Person, SwapiHttpClient> =
            ResourceStore::new(&client(&server), StoreOptions::default());

        let first = store.get_by_id("2").await.expect("person should load");
        assert_eq!(first.name, "C-3PO");

        let second = store.get_by_id("2").await.expect("person should be cached");
        assert_eq!(second, first);
        assert_eq!(store.detail(), Some(first));
    }

    /// Pagination is followed only when enabled
    #[tokio::test]
    async fn test_follow_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/planets/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "next": null,
                "previous": entity_url(&server, "planets/"),
                "results": [{"name": "Yavin IV", "url": entity_url(&server, "planets/3/")}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/planets/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "next": entity_url(&server, "planets/?page=2"),
                "previous": null,
                "results": [
                    {"name": "Alderaan", "url": entity_url(&server, "planets/2/")},
                    {"name": "Tatooine", "url": entity_url(&server, "planets/1/")}
                ]
            })))
            .mount(&server)
            .await;

        let single: ResourceStore<Planet, SwapiHttpClient> =
            ResourceStore::new(&client(&server), StoreOptions::default());
        assert_eq!(single.list_all().await.len(), 2);

        let all: ResourceStore<Planet, SwapiHttpClient> =
            ResourceStore::new(&client(&server), StoreOptions { follow_pages: true });
        let names: Vec<String> = all.list_all().await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Tatooine", "Alderaan", "Yavin IV"]);
    }
}

/// Test module for error normalization at the store boundary
mod error_tests {
    use super::*;

    /// 404 with a SWAPI detail body
    #[tokio::test]
    async fn test_404_uses_backend_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/people/999/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
            .mount(&server)
            .await;

        let store: ResourceStore<Person, SwapiHttpClient> =
            ResourceStore::new(&client(&server), StoreOptions::default());

        assert!(store.get_by_id("999").await.is_none());
        assert_eq!(store.error().as_deref(), Some("Error 404: Not found"));
        assert!(!store.loading());
    }

    /// 5xx collapses to one generic message and the list degrades to empty
    #[tokio::test]
    async fn test_503_degrades_list() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/films/"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let store: ResourceStore<Film, SwapiHttpClient> =
            ResourceStore::new(&client(&server), StoreOptions::default());

        assert!(store.list_all().await.is_empty());
        assert_eq!(
            store.error().as_deref(),
            Some("Server error. Please try again later.")
        );
        assert!(!store.list_loaded());
    }

    /// Rate limiting without a JSON body
    #[tokio::test]
    async fn test_429_without_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/films/1/"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let store: ResourceStore<Film, SwapiHttpClient> =
            ResourceStore::new(&client(&server), StoreOptions::default());

        assert!(store.get_by_id("1").await.is_none());
        assert_eq!(store.error().as_deref(), Some("Error 429: Unknown error"));
    }

    /// Nothing listening: no status is obtainable
    #[tokio::test]
    async fn test_unreachable_host() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SwapiClient::new(&format!("http://{}/api", addr)).unwrap();
        let store: ResourceStore<Film, SwapiHttpClient> =
            ResourceStore::new(&client, StoreOptions::default());

        assert!(store.list_all().await.is_empty());
        assert_eq!(store.error().as_deref(), Some("Network error! Are you online?"));
        assert!(!store.loading());
    }

    /// A 200 whose body is not the expected shape
    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/films/1/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let store: ResourceStore<Film, SwapiHttpClient> =
            ResourceStore::new(&client(&server), StoreOptions::default());

        assert!(store.get_by_id("1").await.is_none());
        assert_eq!(store.error().as_deref(), Some("Unexpected response format."));
    }
}

/// Test module for batch resolution
mod batch_tests {
    use super::*;

    async fn mount_person(server: &MockServer, id: u32, name: &str, delay_ms: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/api/people/{}/", id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": name, "url": entity_url(server, &format!("people/{}/", id))}))
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    /// One failing URL does not sink the batch
    #[tokio::test]
    async fn test_partial_failure() {
        let server = MockServer::start().await;
        mount_person(&server, 1, "Luke Skywalker", 0).await;
        mount_person(&server, 3, "R2-D2", 20).await;

        Mock::given(method("GET"))
            .and(path("/api/people/2/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store: ResourceStore<Person, SwapiHttpClient> =
            ResourceStore::new(&client(&server), StoreOptions::default());

        store
            .resolve_many(
                [
                    entity_url(&server, "people/1/"),
                    entity_url(&server, "people/2/"),
                    entity_url(&server, "people/3/"),
                ],
                3,
            )
            .await;

        let mut names: Vec<String> = store.list().into_iter().map(|p| p.name).collect();
        names.sort();
        assert_eq!(names, vec!["Luke Skywalker", "R2-D2"]);
        assert_eq!(
            store.error().as_deref(),
            Some("Server error. Please try again later.")
        );
        assert!(!store.loading());
    }

    /// Duplicate and overlapping requests for one URL hit the server once
    #[tokio::test]
    async fn test_overlapping_batches_deduplicate() {
        let server = MockServer::start().await;
        mount_person(&server, 1, "Luke Skywalker", 100).await;
        mount_person(&server, 2, "C-3PO", 50).await;

        let store: ResourceStore<Person, SwapiHttpClient> =
            ResourceStore::new(&client(&server), StoreOptions::default());
        let luke = entity_url(&server, "people/1/");
        let threepio = entity_url(&server, "people/2/");

        tokio::join!(
            store.resolve_many([luke.clone(), threepio.clone(), luke.clone()], 2),
            store.resolve_many([luke.clone()], 2),
        );
        store.resolve_many([luke.clone(), threepio.clone()], 2).await;

        assert_eq!(store.list().len(), 2);
        assert_eq!(store.select(&[threepio, luke]).len(), 2);
    }

    /// A film detail resolves its characters and planets through the other stores
    #[tokio::test]
    async fn test_cross_reference_resolution() {
        let server = MockServer::start().await;
        mount_person(&server, 1, "Luke Skywalker", 10).await;
        mount_person(&server, 2, "C-3PO", 0).await;

        Mock::given(method("GET"))
            .and(path("/api/films/1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "A New Hope",
                "episode_id": 4,
                "characters": [entity_url(&server, "people/1/"), entity_url(&server, "people/2/")],
                "planets": [entity_url(&server, "planets/1/")],
                "url": entity_url(&server, "films/1/")
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/planets/1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Tatooine",
                "url": entity_url(&server, "planets/1/")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stores = Stores::new(&client(&server), StoreOptions::default());
        let (film, resolution) = stores.load_detail(&stores.films, "1", 5).await;
        let film = film.expect("film should load");
        resolution.settled().await;

        let cast: Vec<String> = stores
            .people
            .select(&film.characters)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(cast, vec!["Luke Skywalker", "C-3PO"]);
        assert_eq!(
            stores.planets.label_for(film.planets.first().map(String::as_str)),
            "Tatooine"
        );

        // Loading the same film again is served entirely from cache
        let (again, resolution) = stores.load_detail(&stores.films, "1", 5).await;
        assert_eq!(again, Some(film));
        resolution.settled().await;
    }
}
