use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::Config;
use crate::handlers;
use crate::services::MasterServices;

pub fn router(services: MasterServices, config: Config) -> Router {
    let max_body_size = config.upload.max_body_size;

    Router::new()
        // Worker routes
        .route("/worker/register", post(handlers::register_worker))
        .route("/worker/pulse", post(handlers::pulse))

        // Work package routes
        .route("/work", post(handlers::get_work))
        .route("/work/raw", post(handlers::get_raw_work))
        .route(
            "/work/:work_id/sequence/:sequence_id/:worker_id",
            get(handlers::get_sequence),
        )
        .route("/work/:work_id/status", get(handlers::get_work_status))
        .route("/work/:work_id/result", post(handlers::submit_result))

        // Job routes
        .route("/job/format/json", post(handlers::submit_json_job))
        .route("/job/format/multipart", post(handlers::submit_multipart_job))
        .route("/job/:job_id/status", get(handlers::get_job_status))
        .route("/job/:job_id/result", get(handlers::get_job_result))
        .route("/job/:job_id", delete(handlers::delete_job))

        // Upload limits from config
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))

        .with_state((services, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(config: Config) -> Router {
        let services = MasterServices::new(&config);
        router(services, config)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // rejections from axum and tower-http come back as plain text
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    fn job_body() -> Value {
        json!({
            "sequences": {"t1": "ACGTACGT", "q1": "ACGT"},
            "queries": [{"target": "t1", "query": "q1"}],
            "match_score": 1,
            "mismatch_penalty": 1,
            "gap_penalty": 1
        })
    }

    #[tokio::test]
    async fn test_worker_round_trip() {
        let app = app(Config::default());

        let (status, job) = send(&app, Method::POST, "/job/format/json", Some(job_body())).await;
        assert_eq!(status, StatusCode::OK);
        let job_id = job["id"].as_str().unwrap().to_string();

        let (status, worker) = send(
            &app,
            Method::POST,
            "/worker/register",
            Some(json!({"benchmark_result": 100})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let worker_id = worker["id"].clone();

        let (status, package) = send(&app, Method::POST, "/work", Some(json!({"id": worker_id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(package["queries"], json!([{"target": "t1", "query": "q1"}]));
        assert_eq!(package["sequences"]["t1"], "ACGTACGT");
        let work_id = package["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, Method::GET, &format!("/job/{}/result", job_id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let result = json!({
            "alignments": [{
                "combination": {"target": "t1", "query": "q1"},
                "alignment": {
                    "query_alignment": "ACGT",
                    "target_alignment": "ACGT",
                    "length": 4,
                    "score": 4,
                    "maxX": 3,
                    "maxY": 3
                }
            }]
        });
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/work/{}/result", work_id),
            Some(result),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, job_status) = send(&app, Method::GET, &format!("/job/{}/status", job_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job_status["state"], "DONE");
        assert_eq!(job_status["progress"], 1.0);

        let (status, job_result) = send(&app, Method::GET, &format!("/job/{}/result", job_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job_result["alignments"][0]["alignments"][0]["score"], 4);

        // nothing left, the answer is null
        let (status, package) = send(&app, Method::POST, "/work", Some(json!({"id": worker_id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(package.is_null());
    }

    #[tokio::test]
    async fn test_raw_work_and_sequence_fetch() {
        let app = app(Config::default());
        send(&app, Method::POST, "/job/format/json", Some(job_body())).await;
        let (_, worker) = send(
            &app,
            Method::POST,
            "/worker/register",
            Some(json!({"benchmark_result": 100})),
        )
        .await;
        let worker_id = worker["id"].as_str().unwrap().to_string();

        let (status, package) = send(&app, Method::POST, "/work/raw", Some(json!({"id": worker_id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(package.get("sequences").is_none());
        let work_id = package["id"].as_str().unwrap().to_string();

        let (status, sequence) = send(
            &app,
            Method::GET,
            &format!("/work/{}/sequence/q1/{}", work_id, worker_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sequence, "ACGT");

        let (status, work_status) =
            send(&app, Method::GET, &format!("/work/{}/status", work_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(work_status["percentage_done"], 0.0);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let app = app(Config::default());
        let unknown = uuid::Uuid::new_v4();

        let (status, body) = send(&app, Method::POST, "/worker/pulse", Some(json!({"id": unknown}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].as_str().unwrap().contains("not found"));

        let (status, _) = send(&app, Method::POST, "/work", Some(json!({"id": unknown}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, &format!("/job/{}/status", unknown), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/work/{}/result", unknown),
            Some(json!({"alignments": []})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_job_with_missing_sequence_is_rejected() {
        let app = app(Config::default());
        let mut body = job_body();
        body["queries"] = json!([{"target": "t1", "query": "nope"}]);

        let (status, _) = send(&app, Method::POST, "/job/format/json", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_job() {
        let app = app(Config::default());
        let (_, job) = send(&app, Method::POST, "/job/format/json", Some(job_body())).await;
        let job_id = job["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, Method::DELETE, &format!("/job/{}", job_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, &format!("/job/{}/status", job_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_job_disabled() {
        let mut config = Config::default();
        config.job.enable_deletion = false;
        let app = app(config);
        let (_, job) = send(&app, Method::POST, "/job/format/json", Some(job_body())).await;
        let job_id = job["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, Method::DELETE, &format!("/job/{}", job_id), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, Method::GET, &format!("/job/{}/status", job_id), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_multipart_job_submission() {
        let app = app(Config::default());
        let boundary = "X-DLSA-BOUNDARY";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"sequences\"; filename=\"seqs.fasta\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             >t1\nACGTACGT\n>q1\nACGT\n\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"request\"\r\n\r\n\
             {{\"queries\":[{{\"target\":\"t1\",\"query\":\"q1\"}}],\"match_score\":1,\"mismatch_penalty\":1,\"gap_penalty\":1}}\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/job/format/multipart")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let job: Value = serde_json::from_slice(&bytes).unwrap();
        let job_id = job["id"].as_str().unwrap().to_string();

        let (status, job_status) = send(&app, Method::GET, &format!("/job/{}/status", job_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job_status["state"], "IN_QUEUE");
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut config = Config::default();
        config.upload.max_body_size = 64;
        let app = app(config);

        let (status, _) = send(&app, Method::POST, "/job/format/json", Some(job_body())).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
