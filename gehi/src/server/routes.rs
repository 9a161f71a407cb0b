//! Router composition. Lifecycle and middleware live in `imagery_server`.

use super::handlers::{ImageryState, ok_json, serve_availability, serve_download, serve_dump, serve_info};
use axum::{
	Router,
	routing::{get, post},
};
use gehi_core::ExecutionCoordinator;

/// Attach the imagery endpoints under `/api/imagery/`.
pub fn add_imagery_to_app(app: Router, coordinator: ExecutionCoordinator) -> Router {
	let imagery_app = Router::new()
		.route("/api/imagery/info", get(serve_info))
		.route("/api/imagery/availability", post(serve_availability))
		.route("/api/imagery/download", post(serve_download))
		.route("/api/imagery/dump", post(serve_dump))
		.with_state(ImageryState { coordinator });
	app.merge(imagery_app)
}

/// Attach `/api/status`.
pub fn add_api_to_app(app: Router) -> Router {
	let api_app = Router::new().route("/api/status", get(|| async { ok_json("{\"status\":\"ready\"}") }));
	app.merge(api_app)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::server::{INVALID_LOCATION_MESSAGE, MISSING_BODY_MESSAGE};
	use axum::{
		body::{Body, to_bytes},
		http::{Request, StatusCode, header},
	};
	use flate2::read::GzDecoder;
	use gehi_core::{MockEngine, NO_TILES_MESSAGE, TempStorage};
	use pretty_assertions::assert_eq;
	use std::{io::Read, sync::Arc};
	use tempfile::TempDir;
	use tower::ServiceExt;

	const CORNERS: &str = r#""zoom": 17,
		"lowerLeft": { "latitude": 10, "longitude": 10 },
		"upperRight": { "latitude": 11, "longitude": 11 }"#;

	struct Fixture {
		engine: Arc<MockEngine>,
		temp: TempDir,
		app: Router,
	}

	impl Fixture {
		fn new(engine: MockEngine) -> Self {
			let engine = Arc::new(engine);
			let temp = TempDir::new().unwrap();
			let coordinator =
				ExecutionCoordinator::new(engine.clone()).with_temp_storage(TempStorage::new(temp.path().join("work")));
			let app = add_api_to_app(add_imagery_to_app(Router::new(), coordinator));
			Self { engine, temp, app }
		}

		fn temp_entries(&self) -> usize {
			std::fs::read_dir(self.temp.path().join("work")).map_or(0, Iterator::count)
		}

		async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
			let response = self.app.clone().oneshot(request).await.unwrap();
			let status = response.status();
			let headers = response.headers().clone();
			let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
			(status, body, headers)
		}

		async fn get(&self, uri: &str) -> (StatusCode, String) {
			let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
			let (status, body, _) = self.send(request).await;
			(status, String::from_utf8(body).unwrap())
		}

		async fn post(&self, uri: &str, json: &str) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
			let request = Request::builder()
				.method("POST")
				.uri(uri)
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(json.to_owned()))
				.unwrap();
			self.send(request).await
		}

		async fn post_text(&self, uri: &str, json: &str) -> (StatusCode, String) {
			let (status, body, _) = self.post(uri, json).await;
			(status, String::from_utf8(body).unwrap())
		}
	}

	#[tokio::test]
	async fn api_status() {
		let fixture = Fixture::new(MockEngine::new());
		assert_eq!(
			fixture.get("/api/status").await,
			(StatusCode::OK, String::from("{\"status\":\"ready\"}"))
		);
	}

	#[tokio::test]
	async fn info_returns_stdout() {
		let fixture = Fixture::new(MockEngine::new().with_stdout("Dates:\n  2023/05/01\n"));
		let (status, body) = fixture
			.get("/api/imagery/info?location=37.58289,-106.52305&zoom=17&provider=Wayback&noCache=true")
			.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, "Dates:\n  2023/05/01\n");

		let operation = fixture.engine.last_operation().unwrap();
		assert_eq!(operation.provider(), gehi_core::Provider::Wayback);
		assert!(operation.no_cache());
		assert_eq!(operation.zoom().get(), 17);
	}

	#[tokio::test]
	async fn info_rejects_bad_location() {
		let fixture = Fixture::new(MockEngine::new());
		for uri in [
			"/api/imagery/info?zoom=17",
			"/api/imagery/info?location=37.5&zoom=17",
			"/api/imagery/info?location=a,b&zoom=17",
		] {
			assert_eq!(
				fixture.get(uri).await,
				(StatusCode::BAD_REQUEST, String::from(INVALID_LOCATION_MESSAGE))
			);
		}
		assert_eq!(fixture.engine.runs(), 0);
	}

	#[tokio::test]
	async fn info_rejects_bad_zoom() {
		let fixture = Fixture::new(MockEngine::new());
		assert_eq!(
			fixture.get("/api/imagery/info?location=1,2&zoom=24").await,
			(
				StatusCode::BAD_REQUEST,
				String::from("Zoom level: 24 is too large. Max zoom is 23")
			)
		);
		assert_eq!(fixture.engine.runs(), 0);
	}

	#[tokio::test]
	async fn availability_with_only_stderr() {
		let fixture = Fixture::new(MockEngine::new().with_stderr("No imagery available"));
		let (status, body) = fixture
			.post_text("/api/imagery/availability", &format!("{{ {CORNERS} }}"))
			.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body, "No imagery available");
	}

	#[tokio::test]
	async fn availability_failure() {
		let fixture = Fixture::new(MockEngine::new().with_stdout("partial").with_failure("tool crashed"));
		let (status, body) = fixture
			.post_text("/api/imagery/availability", &format!("{{ {CORNERS} }}"))
			.await;
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body, "partial\n\ntool crashed");
	}

	#[tokio::test]
	async fn availability_validation_messages() {
		let fixture = Fixture::new(MockEngine::new());
		let (status, body) = fixture
			.post_text("/api/imagery/availability", r#"{ "zoom": 0 }"#)
			.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(
			body,
			"Zoom level: 0 is too small. Min zoom is 1\nAn area of interest must be specified either with the 'region' option or the 'lower-left' and 'upper-right' options"
		);
		assert_eq!(fixture.engine.runs(), 0);
	}

	#[tokio::test]
	async fn missing_body() {
		let fixture = Fixture::new(MockEngine::new());
		assert_eq!(
			fixture.post_text("/api/imagery/download", "").await,
			(StatusCode::BAD_REQUEST, String::from(MISSING_BODY_MESSAGE))
		);
	}

	#[tokio::test]
	async fn download_streams_the_image() {
		let fixture = Fixture::new(MockEngine::new().with_file(b"GeoTIFF"));
		let (status, body, headers) = fixture
			.post(
				"/api/imagery/download",
				&format!(r#"{{ {CORNERS}, "dates": ["2023-05-01"], "fileName": "my:scene" }}"#),
			)
			.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, b"GeoTIFF");
		assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "image/tiff");
		assert_eq!(
			headers.get(header::CONTENT_DISPOSITION).unwrap(),
			"attachment; filename=\"my_scene.tif\""
		);
		assert_eq!(fixture.temp_entries(), 0);
	}

	#[tokio::test]
	async fn download_without_dates() {
		let fixture = Fixture::new(MockEngine::new().with_file(b"GeoTIFF"));
		let (status, body) = fixture
			.post_text("/api/imagery/download", &format!("{{ {CORNERS} }}"))
			.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body, "At least one date must be specified.");
		assert_eq!(fixture.engine.runs(), 0);
	}

	#[tokio::test]
	async fn download_without_output() {
		let fixture = Fixture::new(MockEngine::new().with_stderr("nothing to stitch"));
		let (status, body) = fixture
			.post_text(
				"/api/imagery/download",
				&format!(r#"{{ {CORNERS}, "dates": ["2023-05-01"] }}"#),
			)
			.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body, "nothing to stitch");
		assert_eq!(fixture.temp_entries(), 0);
	}

	#[tokio::test]
	async fn download_failure_removes_partial_file() {
		let fixture = Fixture::new(MockEngine::new().with_file(b"half").with_failure("network down"));
		let (status, body) = fixture
			.post_text(
				"/api/imagery/download",
				&format!(r#"{{ {CORNERS}, "dates": ["2023-05-01"] }}"#),
			)
			.await;
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body, "network down");
		assert_eq!(fixture.temp_entries(), 0);
	}

	#[tokio::test]
	async fn dump_streams_an_archive() {
		let fixture = Fixture::new(
			MockEngine::new()
				.with_dump_file("17/1/2.jpg", b"tile a")
				.with_dump_file("17/1/3.jpg", b"tile b"),
		);
		let (status, body, headers) = fixture
			.post(
				"/api/imagery/dump",
				&format!(r#"{{ {CORNERS}, "dates": ["2023-05-01"], "archiveName": "tiles" }}"#),
			)
			.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/gzip");
		assert_eq!(
			headers.get(header::CONTENT_DISPOSITION).unwrap(),
			"attachment; filename=\"tiles.tar.gz\""
		);

		let mut archive = tar::Archive::new(GzDecoder::new(body.as_slice()));
		let mut names = Vec::new();
		for entry in archive.entries().unwrap() {
			let mut entry = entry.unwrap();
			if entry.header().entry_type().is_file() {
				let mut content = String::new();
				entry.read_to_string(&mut content).unwrap();
				let name = entry.path().unwrap().to_string_lossy().trim_start_matches("./").to_string();
				names.push((name, content));
			}
		}
		names.sort();
		assert_eq!(
			names,
			vec![
				(String::from("17/1/2.jpg"), String::from("tile a")),
				(String::from("17/1/3.jpg"), String::from("tile b")),
			]
		);
		assert_eq!(fixture.temp_entries(), 0);
	}

	#[tokio::test]
	async fn dump_without_tiles() {
		let fixture = Fixture::new(MockEngine::new());
		let (status, body) = fixture
			.post_text("/api/imagery/dump", &format!(r#"{{ {CORNERS}, "dates": ["2023-05-01"] }}"#))
			.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body, NO_TILES_MESSAGE);
		assert_eq!(fixture.temp_entries(), 0);
	}
}
