use crate::{
    common::data::{ErrorResponse, IssueRef},
    server::{
        fixtures::{self, CannedResponse},
        handler::Error::{
            ParamDecodeError, ParamError, ResponseBodyConversionError, ResponseBodySerializeError,
        },
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use hyper::{Method, Request, Response};
use path_tree::{Path, PathTree};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot serialize response body: {0}")]
    ResponseBodySerializeError(serde_json::Error),
    #[error("cannot convert response body: {0}")]
    ResponseBodyConversionError(http::Error),
    #[error("expected URL parameter '{0}' not found")]
    ParamError(&'static str),
    #[error("Failed to decode param '{0}'")]
    ParamDecodeError(String),
}

enum RoutePath {
    Issue,
    IssueAssignees,
}

#[async_trait]
pub trait Handler {
    async fn handle(&self, req: Request<Bytes>) -> Result<Response<Bytes>, Error>;
}

/// Routes buffered requests to the canned issue endpoints.
pub struct IssueMockHandler {
    path_tree: PathTree<RoutePath>,
}

#[async_trait]
impl Handler for IssueMockHandler {
    async fn handle(&self, req: Request<Bytes>) -> Result<Response<Bytes>, Error> {
        tracing::trace!("Routing incoming request: {:?}", req);

        let path = trim_trailing_slash(req.uri().path());

        if let Some((matched_path, params)) = self.path_tree.find(path) {
            let route = match (matched_path, req.method()) {
                (RoutePath::Issue, &Method::GET | &Method::HEAD) => Some(RoutePath::Issue),
                (RoutePath::IssueAssignees, &Method::POST) => Some(RoutePath::IssueAssignees),
                _ => None,
            };

            if let Some(route) = route {
                // Parameters are only decoded once both path and method matched.
                let issue = match issue_ref(&params) {
                    Ok(issue) => issue,
                    Err(err @ ParamDecodeError(_)) => {
                        return response(StatusCode::BAD_REQUEST, Some(ErrorResponse::new(&err)));
                    }
                    Err(err) => return Err(err),
                };

                return match route {
                    RoutePath::Issue => self.handle_get_issue(issue, &req),
                    RoutePath::IssueAssignees => self.handle_add_assignees(issue, &req),
                };
            }
        }

        self.catch_all(&req)
    }
}

impl Default for IssueMockHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueMockHandler {
    pub fn new() -> Self {
        let mut path_tree: PathTree<RoutePath> = PathTree::new();
        #[allow(unused_must_use)]
        {
            path_tree.insert("/repos/:owner/:repo/issues/:issue_number", RoutePath::Issue);
            path_tree.insert(
                "/repos/:owner/:repo/issues/:issue_number/assignees",
                RoutePath::IssueAssignees,
            );
        }

        Self { path_tree }
    }

    fn handle_get_issue(
        &self,
        issue: IssueRef,
        req: &Request<Bytes>,
    ) -> Result<Response<Bytes>, Error> {
        tracing::info!("Mock intercepted: {} {}", req.method(), issue);
        tracing::info!("Request headers: {}", headers_to_json(req.headers()));

        let canned = fixtures::get_issue(&issue, req.headers());
        canned_response(canned)
    }

    fn handle_add_assignees(
        &self,
        issue: IssueRef,
        req: &Request<Bytes>,
    ) -> Result<Response<Bytes>, Error> {
        tracing::info!("Mock intercepted: POST {}/assignees", issue);
        tracing::info!("Request body: {}", String::from_utf8_lossy(req.body()));
        tracing::info!("Request headers: {}", headers_to_json(req.headers()));

        let canned = fixtures::add_assignees(&issue, req.headers(), req.body());
        canned_response(canned)
    }

    fn catch_all(&self, req: &Request<Bytes>) -> Result<Response<Bytes>, Error> {
        tracing::debug!("No route for {} {}", req.method(), req.uri().path());
        response(StatusCode::NOT_FOUND, Some(ErrorResponse::new("Not Found")))
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

/// Looks up a route parameter and percent-decodes it.
fn param(name: &'static str, tree_path: &Path) -> Result<String, Error> {
    let raw = tree_path
        .params()
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v)
        .ok_or(ParamError(name))?;

    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ParamDecodeError(raw.to_string()))
}

fn issue_ref(tree_path: &Path) -> Result<IssueRef, Error> {
    Ok(IssueRef::new(
        param("owner", tree_path)?,
        param("repo", tree_path)?,
        param("issue_number", tree_path)?,
    ))
}

fn canned_response(canned: CannedResponse) -> Result<Response<Bytes>, Error> {
    response(canned.status, Some(canned.body))
}

fn response<T>(status: StatusCode, body: Option<T>) -> Result<Response<Bytes>, Error>
where
    T: Serialize,
{
    let mut builder = Response::builder().status(status);

    if let Some(body_obj) = body {
        builder = builder.header("content-type", "application/json");

        let body_bytes =
            serde_json::to_vec(&body_obj).map_err(|e| ResponseBodySerializeError(e))?;

        return builder
            .body(Bytes::from(body_bytes))
            .map_err(|e| ResponseBodyConversionError(e));
    }

    builder
        .body(Bytes::new())
        .map_err(|e| ResponseBodyConversionError(e))
}

/// Renders request headers as a JSON object for the diagnostic log. Values that are not
/// valid UTF-8 are replaced lossily, repeated headers keep the last value.
fn headers_to_json(headers: &HeaderMap) -> Value {
    let map: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod test {
    use super::*;
    use http::header::{AUTHORIZATION, CONTENT_TYPE};
    use serde_json::json;

    fn request(method: &str, uri: &str, auth: Option<&str>, body: &str) -> Request<Bytes> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if !body.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        builder.body(Bytes::from(body.to_string())).unwrap()
    }

    fn json_body(res: &Response<Bytes>) -> Value {
        serde_json::from_slice(res.body()).expect("cannot deserialize response body")
    }

    #[tokio::test]
    async fn routes_get_issue() {
        let handler = IssueMockHandler::new();

        let res = handler
            .handle(request(
                "GET",
                "/repos/test-owner/test-repo/issues/2",
                Some("Bearer abc"),
                "",
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "application/json");
        assert_eq!(json_body(&res), json!({ "assignees": [{ "login": "test-user" }] }));
    }

    #[tokio::test]
    async fn routes_add_assignees() {
        let handler = IssueMockHandler::new();

        let res = handler
            .handle(request(
                "POST",
                "/repos/test-owner/test-repo/issues/1/assignees",
                Some("Bearer abc"),
                r#"{"assignees":["alice"]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(json_body(&res), json!({ "assignees": [{ "login": "alice" }] }));
    }

    #[tokio::test]
    async fn add_assignees_echoes_non_string_login() {
        let handler = IssueMockHandler::new();

        for (body, login) in [
            (r#"{"assignees":[42]}"#, json!(42)),
            (r#"{"assignees":[null]}"#, Value::Null),
        ] {
            let res = handler
                .handle(request(
                    "POST",
                    "/repos/test-owner/test-repo/issues/1/assignees",
                    Some("Bearer abc"),
                    body,
                ))
                .await
                .unwrap();

            assert_eq!(res.status(), StatusCode::CREATED, "{}", body);
            assert_eq!(json_body(&res), json!({ "assignees": [{ "login": login }] }));
        }
    }

    #[tokio::test]
    async fn add_assignees_ignores_non_json_content_type() {
        let handler = IssueMockHandler::new();

        let req = Request::builder()
            .method("POST")
            .uri("/repos/test-owner/test-repo/issues/1/assignees")
            .header(AUTHORIZATION, "Bearer abc")
            .header(CONTENT_TYPE, "text/plain")
            .body(Bytes::from(r#"{"assignees":["alice"]}"#))
            .unwrap();

        let res = handler.handle(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(&res), json!({ "message": "Forbidden" }));
    }

    #[tokio::test]
    async fn head_is_answered_like_get() {
        let handler = IssueMockHandler::new();

        let head = handler
            .handle(request(
                "HEAD",
                "/repos/test-owner/test-repo/issues/2",
                Some("Bearer abc"),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(head.headers()["content-type"], "application/json");

        let unauthorized = handler
            .handle(request("HEAD", "/repos/test-owner/test-repo/issues/2", None, ""))
            .await
            .unwrap();
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

        let unknown = handler
            .handle(request(
                "HEAD",
                "/repos/test-owner/test-repo/issues/3",
                Some("Bearer abc"),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn path_parameters_are_percent_decoded() {
        let handler = IssueMockHandler::new();

        let get = handler
            .handle(request(
                "GET",
                "/repos/test%2Downer/test-repo/issues/%31",
                Some("Bearer abc"),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(get.status(), StatusCode::OK);
        assert_eq!(json_body(&get), json!({ "assignees": [] }));

        let post = handler
            .handle(request(
                "POST",
                "/repos/test-owner/test%2drepo/issues/1/assignees",
                Some("Bearer abc"),
                r#"{"assignees":["alice"]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(post.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn undecodable_path_parameter_is_bad_request() {
        let handler = IssueMockHandler::new();

        let res = handler
            .handle(request(
                "GET",
                "/repos/test-owner/%FF/issues/1",
                Some("Bearer abc"),
                "",
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&res), json!({ "message": "Failed to decode param '%FF'" }));

        let wrong_method = handler
            .handle(request("PUT", "/repos/test-owner/%FF/issues/1", None, ""))
            .await
            .unwrap();
        assert_eq!(wrong_method.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tolerates_trailing_slash() {
        let handler = IssueMockHandler::new();

        let res = handler
            .handle(request(
                "GET",
                "/repos/test-owner/test-repo/issues/1/",
                Some("Bearer abc"),
                "",
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(&res), json!({ "assignees": [] }));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_without_auth_check() {
        let handler = IssueMockHandler::new();

        for uri in ["/", "/repos/test-owner/test-repo", "/repos/a/b/issues/1/labels"] {
            let res = handler.handle(request("GET", uri, None, "")).await.unwrap();
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(json_body(&res), json!({ "message": "Not Found" }));
        }
    }

    #[tokio::test]
    async fn method_mismatch_is_not_found() {
        let handler = IssueMockHandler::new();

        let post_issue = handler
            .handle(request(
                "POST",
                "/repos/test-owner/test-repo/issues/1",
                Some("Bearer abc"),
                r#"{"assignees":["alice"]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(post_issue.status(), StatusCode::NOT_FOUND);

        let get_assignees = handler
            .handle(request(
                "GET",
                "/repos/test-owner/test-repo/issues/1/assignees",
                Some("Bearer abc"),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(get_assignees.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(&get_assignees), json!({ "message": "Not Found" }));
    }

    #[tokio::test]
    async fn unauthorized_on_both_routes() {
        let handler = IssueMockHandler::new();

        let get = handler
            .handle(request(
                "GET",
                "/repos/test-owner/test-repo/issues/1",
                Some("Token abc"),
                "",
            ))
            .await
            .unwrap();
        let post = handler
            .handle(request(
                "POST",
                "/repos/test-owner/test-repo/issues/1/assignees",
                None,
                r#"{"assignees":["alice"]}"#,
            ))
            .await
            .unwrap();

        for res in [get, post].iter() {
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                json_body(res),
                json!({ "message": "Unauthorized: Missing or invalid Bearer token" })
            );
        }
    }

    #[test]
    fn headers_render_as_json_object() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        headers.insert("x-request-id", "42".parse().unwrap());

        assert_eq!(
            headers_to_json(&headers),
            json!({ "authorization": "Bearer abc", "x-request-id": "42" })
        );
    }

    #[test]
    fn trailing_slash_is_trimmed_once() {
        assert_eq!(trim_trailing_slash("/"), "/");
        assert_eq!(trim_trailing_slash("/repos/a/"), "/repos/a");
        assert_eq!(trim_trailing_slash("/repos/a"), "/repos/a");
    }
}
