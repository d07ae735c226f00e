use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Query, Request},
    http::{HeaderMap, HeaderValue, header},
};
use serde::de::DeserializeOwned;

use crate::{error::ApiError, models::EmployeePatch};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// How a request body is encoded, judged by its `Content-Type` media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Form,
    Multipart,
    Other,
}

// Media types are case-insensitive; parameters after `;` are ignored here.
fn body_kind(headers: &HeaderMap) -> BodyKind {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return BodyKind::Other;
    };

    let media_type = content_type
        .split_once(';')
        .map_or(content_type, |(media_type, _)| media_type)
        .trim();

    if media_type.eq_ignore_ascii_case(FORM_URLENCODED) {
        BodyKind::Form
    } else if media_type.eq_ignore_ascii_case(MULTIPART_FORM_DATA) {
        BodyKind::Multipart
    } else {
        BodyKind::Other
    }
}

// `Form` matches the header byte-for-byte, so a form body in any other casing is
// handed to it under the lowercase media type.
async fn read_form<T, S>(mut req: Request, state: &S) -> Result<T, ApiError>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    req.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));
    let Form(value) = Form::<T>::from_request(req, state).await?;
    Ok(value)
}

/// JsonOrForm
///
/// Binds a request body from either `application/json` or
/// `application/x-www-form-urlencoded`. Anything unparseable is a 400.
#[derive(Debug)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if body_kind(req.headers()) == BodyKind::Form {
            return Ok(Self(read_form(req, state).await?));
        }
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// PatchForm
///
/// Collects the optional employee fields of a PUT from the query string and from a
/// URL-encoded or `multipart/form-data` body. Body values win; an empty value counts
/// as absent. A non-empty body in any other encoding is a 400 rather than being
/// dropped.
#[derive(Debug)]
pub struct PatchForm(pub EmployeePatch);

impl<S> FromRequest<S> for PatchForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<EmployeePatch>::try_from_uri(req.uri())?;

        let body = match body_kind(req.headers()) {
            BodyKind::Form => read_form(req, state).await?,
            BodyKind::Multipart => read_multipart(req, state).await?,
            BodyKind::Other => {
                let content_type = req
                    .headers()
                    .get(header::CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("none")
                    .to_owned();
                let bytes = Bytes::from_request(req, state).await?;
                if !bytes.is_empty() {
                    return Err(ApiError::BadRequest(format!(
                        "Unsupported content type for employee update: {content_type}"
                    )));
                }
                EmployeePatch::default()
            }
        };

        Ok(Self(body.or(query)))
    }
}

// Text parts named like the patch fields are kept; any other part is skipped.
async fn read_multipart<S>(req: Request, state: &S) -> Result<EmployeePatch, ApiError>
where
    S: Send + Sync,
{
    let mut multipart = Multipart::from_request(req, state).await?;
    let mut patch = EmployeePatch::default();

    while let Some(field) = multipart.next_field().await? {
        let slot = match field.name() {
            Some("fullName") => &mut patch.full_name,
            Some("age") => &mut patch.age,
            Some("email") => &mut patch.email,
            _ => continue,
        };
        *slot = Some(field.text().await?);
    }

    Ok(patch)
}
