//! HTTP handlers of the imagery endpoints and small response helpers.
//!
//! Text operations answer with the captured output, file operations stream
//! the produced file and delete it once the body is dropped. CORS headers are
//! left to the `CorsLayer`.

use axum::{
	body::{Body, Bytes},
	extract::{Query, State},
	http::{HeaderMap, HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
};
use futures::StreamExt;
use gehi_core::{
	AvailabilityRequest, DownloadRequest, DumpRequest, ExecutionCoordinator, FileRunResult, GeoPoint, InfoRequest,
	Provider, RunResult, TempPath, ValidationError,
};
use serde::{Deserialize, de::DeserializeOwned};
use tokio_util::{io::ReaderStream, sync::CancellationToken};

pub const INVALID_LOCATION_MESSAGE: &str = "Invalid location format. Use location=LAT,LONG";
pub const MISSING_BODY_MESSAGE: &str = "Request body is required.";
pub const NO_OUTPUT_MESSAGE: &str = "Command did not return any output.";

const MIME_TIFF: &str = "image/tiff";
const MIME_GZIP: &str = "application/gzip";

#[derive(Clone, Debug)]
pub struct ImageryState {
	pub coordinator: ExecutionCoordinator,
}

/// Query string of `GET info`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InfoQuery {
	pub location: Option<String>,
	pub zoom: i32,
	pub provider: Provider,
	pub no_cache: bool,
}

pub async fn serve_info(State(state): State<ImageryState>, Query(query): Query<InfoQuery>) -> Response<Body> {
	log::debug!("handle info request: {query:?}");

	let Some(location) = query.location.as_deref().and_then(|text| text.parse::<GeoPoint>().ok()) else {
		return error_with(StatusCode::BAD_REQUEST, INVALID_LOCATION_MESSAGE);
	};
	let request = InfoRequest {
		provider: query.provider,
		no_cache: query.no_cache,
		zoom: query.zoom,
		location,
	};

	let cancel = CancellationToken::new();
	let _cancel_on_drop = cancel.clone().drop_guard();
	match state.coordinator.run_info(&request, &cancel).await {
		Ok(result) => text_result(&result),
		Err(e) => validation_failed(&e),
	}
}

pub async fn serve_availability(State(state): State<ImageryState>, body: Bytes) -> Response<Body> {
	let request: AvailabilityRequest = match parse_body(&body) {
		Ok(request) => request,
		Err(response) => return response,
	};
	log::debug!("handle availability request: {request:?}");

	let cancel = CancellationToken::new();
	let _cancel_on_drop = cancel.clone().drop_guard();
	match state.coordinator.run_availability(&request, &cancel).await {
		Ok(result) => text_result(&result),
		Err(e) => validation_failed(&e),
	}
}

pub async fn serve_download(State(state): State<ImageryState>, body: Bytes) -> Response<Body> {
	let request: DownloadRequest = match parse_body(&body) {
		Ok(request) => request,
		Err(response) => return response,
	};
	log::debug!("handle download request: {request:?}");

	let cancel = CancellationToken::new();
	let _cancel_on_drop = cancel.clone().drop_guard();
	match state.coordinator.run_download(&request, &cancel).await {
		Ok(result) => file_result(result, MIME_TIFF, &request.attachment_name()).await,
		Err(e) => validation_failed(&e),
	}
}

pub async fn serve_dump(State(state): State<ImageryState>, body: Bytes) -> Response<Body> {
	let request: DumpRequest = match parse_body(&body) {
		Ok(request) => request,
		Err(response) => return response,
	};
	log::debug!("handle dump request: {request:?}");

	let cancel = CancellationToken::new();
	let _cancel_on_drop = cancel.clone().drop_guard();
	match state.coordinator.run_dump(&request, &cancel).await {
		Ok(result) => file_result(result, MIME_GZIP, &request.attachment_name()).await,
		Err(e) => validation_failed(&e),
	}
}

// --- small helpers -----------------------------------------------------------

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response<Body>> {
	if body.iter().all(u8::is_ascii_whitespace) {
		return Err(error_with(StatusCode::BAD_REQUEST, MISSING_BODY_MESSAGE));
	}
	serde_json::from_slice(body).map_err(|e| {
		log::debug!("rejecting request body: {e}");
		error_with(StatusCode::BAD_REQUEST, &format!("Invalid request body: {e}"))
	})
}

fn validation_failed(error: &ValidationError) -> Response<Body> {
	log::debug!("send 400 for invalid request: {error}");
	error_with(StatusCode::BAD_REQUEST, &error.to_string())
}

fn text_result(result: &RunResult) -> Response<Body> {
	if result.is_failure() {
		log::warn!("send 500 for failed operation");
		return error_with(StatusCode::INTERNAL_SERVER_ERROR, &result.diagnostic());
	}
	if !result.stdout.is_empty() {
		return ok_text(&result.stdout);
	}
	if !result.stderr.is_empty() {
		return error_with(StatusCode::BAD_REQUEST, &result.stderr);
	}
	error_with(StatusCode::BAD_REQUEST, NO_OUTPUT_MESSAGE)
}

/// Dropping `result` on an error path deletes whatever file it owns.
async fn file_result(mut result: FileRunResult, mime: &'static str, file_name: &str) -> Response<Body> {
	if result.run.is_failure() {
		log::warn!("send 500 for failed operation");
		return error_with(StatusCode::INTERNAL_SERVER_ERROR, &result.run.diagnostic());
	}
	if !result.has_usable_output().await {
		log::debug!("send 400, operation produced no usable output");
		return error_with(StatusCode::BAD_REQUEST, &result.run.diagnostic());
	}
	match result.take_output() {
		Some(output) => ok_file(output, mime, file_name).await,
		None => error_with(StatusCode::BAD_REQUEST, &result.run.diagnostic()),
	}
}

/// Stream `output` as an attachment. The file is deleted when the body is dropped.
async fn ok_file(output: TempPath, mime: &'static str, file_name: &str) -> Response<Body> {
	let file = match tokio::fs::File::open(output.path()).await {
		Ok(file) => file,
		Err(e) => {
			log::warn!("send 500, failed to open {:?}: {e}", output.path());
			return error_500();
		}
	};
	let length = file.metadata().await.map(|meta| meta.len()).ok();

	let disposition = match HeaderValue::try_from(format!("attachment; filename=\"{file_name}\"")) {
		Ok(value) => value,
		Err(e) => {
			log::warn!("send 500, invalid attachment name '{file_name}': {e}");
			return error_500();
		}
	};

	let mut headers = HeaderMap::new();
	headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
	headers.insert(header::CONTENT_DISPOSITION, disposition);
	if let Some(length) = length {
		headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
	}

	let stream = ReaderStream::new(file).map(move |chunk| {
		let _keep_until_streamed = &output;
		chunk
	});

	log::debug!("send {mime} attachment '{file_name}'");
	(headers, Body::from_stream(stream)).into_response()
}

fn ok_text(text: &str) -> Response<Body> {
	(
		StatusCode::OK,
		[(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
		text.to_owned(),
	)
		.into_response()
}

/// Tiny JSON helper used by the API routes.
pub fn ok_json(message: &str) -> Response<Body> {
	(
		StatusCode::OK,
		[(header::CONTENT_TYPE, "application/json")],
		message.to_owned(),
	)
		.into_response()
}

fn error_with(status: StatusCode, message: &str) -> Response<Body> {
	(
		status,
		[(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
		message.to_owned(),
	)
		.into_response()
}

fn error_500() -> Response<Body> {
	error_with(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::anyhow;
	use axum::body::to_bytes;

	async fn body_text(response: Response<Body>) -> String {
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		String::from_utf8(bytes.to_vec()).unwrap()
	}

	fn run(stdout: &str, stderr: &str, failure: Option<&str>) -> RunResult {
		RunResult {
			stdout: stdout.into(),
			stderr: stderr.into(),
			failure: failure.map(|f| anyhow!("{f}")),
		}
	}

	#[tokio::test]
	async fn text_result_status_mapping() {
		let resp = text_result(&run("2023/05/01", "warning", None));
		assert_eq!(resp.status(), StatusCode::OK);
		assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain; charset=utf-8");
		assert_eq!(body_text(resp).await, "2023/05/01");

		let resp = text_result(&run("", "No imagery", None));
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
		assert_eq!(body_text(resp).await, "No imagery");

		let resp = text_result(&run("", "", None));
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
		assert_eq!(body_text(resp).await, NO_OUTPUT_MESSAGE);

		let resp = text_result(&run("partial", "", Some("boom")));
		assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body_text(resp).await, "partial\n\nboom");
	}

	#[tokio::test]
	async fn failed_file_result_deletes_the_file() {
		let dir = assert_fs::TempDir::new().unwrap();
		let path = dir.path().join("out.tif");
		std::fs::write(&path, b"tiff").unwrap();

		let result = FileRunResult {
			run: run("", "", Some("disk full")),
			output: Some(TempPath::new(path.clone())),
		};
		let resp = file_result(result, MIME_TIFF, "a.tif").await;
		assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body_text(resp).await, "disk full");
		assert!(!path.exists());
	}

	#[tokio::test]
	async fn empty_file_result_is_a_client_error() {
		let dir = assert_fs::TempDir::new().unwrap();
		let path = dir.path().join("out.tif");
		std::fs::write(&path, b"").unwrap();

		let result = FileRunResult {
			run: run("", "", None),
			output: Some(TempPath::new(path.clone())),
		};
		let resp = file_result(result, MIME_TIFF, "a.tif").await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
		assert_eq!(body_text(resp).await, "Operation failed.");
		assert!(!path.exists());
	}

	#[tokio::test]
	async fn streamed_file_is_deleted_after_the_body() {
		let dir = assert_fs::TempDir::new().unwrap();
		let path = dir.path().join("out.tif");
		std::fs::write(&path, b"tiff data").unwrap();

		let result = FileRunResult {
			run: run("", "", None),
			output: Some(TempPath::new(path.clone())),
		};
		let resp = file_result(result, MIME_TIFF, "scene.tif").await;
		assert_eq!(resp.status(), StatusCode::OK);
		let headers = resp.headers();
		assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "image/tiff");
		assert_eq!(
			headers.get(header::CONTENT_DISPOSITION).unwrap(),
			"attachment; filename=\"scene.tif\""
		);
		assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), "9");
		assert!(path.exists());

		assert_eq!(body_text(resp).await, "tiff data");
		assert!(!path.exists());
	}

	#[test]
	fn parse_body_errors() {
		let resp = parse_body::<DownloadRequest>(&Bytes::from_static(b"  ")).unwrap_err();
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

		let resp = parse_body::<DownloadRequest>(&Bytes::from_static(b"{ nope")).unwrap_err();
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

		let request = parse_body::<DownloadRequest>(&Bytes::from_static(b"{}")).unwrap();
		assert_eq!(request.scale_factor, 1.0);
	}

	#[test]
	fn ok_json_sets_content_type() {
		let resp = ok_json(r#"{"status":"ready"}"#);
		assert_eq!(resp.status(), StatusCode::OK);
		assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
	}
}
