use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Core Records ---

/// Employee
///
/// A single record of the employee registry. The `id` is assigned by the registry on
/// insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Employee {
    pub id: u64,
    pub full_name: String,
    pub age: u8,
    pub email: String,
}

/// Credential
///
/// A login/password pair. Used both for the seeded credential store and as the
/// POST /login request body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Credential {
    pub login: String,
    pub password: String,
}

// Keeps passwords out of log lines.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

// --- Request Payloads ---

/// CreateEmployeeRequest
///
/// Input payload for POST /employees, accepted as JSON or as a URL-encoded form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateEmployeeRequest {
    #[schema(example = "James Bond")]
    pub full_name: String,
    #[schema(example = 37)]
    pub age: u8,
    #[schema(example = "james.bond@mi6.gov.uk")]
    pub email: String,
}

/// EmployeePatch
///
/// Form fields accepted by PUT /employees/{id}. Every field is optional, and an
/// empty value means "leave unchanged". `age` stays a string until the patch is
/// applied because form values are untyped.
#[derive(Debug, Clone, Deserialize, TS, ToSchema, IntoParams, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
#[ts(export)]
pub struct EmployeePatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl EmployeePatch {
    /// Field-wise merge: values already present in `self` win over `fallback`.
    pub fn or(self, fallback: EmployeePatch) -> EmployeePatch {
        EmployeePatch {
            full_name: non_empty(self.full_name).or(non_empty(fallback.full_name)),
            age: non_empty(self.age).or(non_empty(fallback.age)),
            email: non_empty(self.email).or(non_empty(fallback.email)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// --- Responses ---

/// TokenResponse
///
/// Output of a successful login. The token is presented afterwards as
/// `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// StatusResponse
///
/// Output of GET /status: a liveness marker plus the number of live sessions.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatusResponse {
    #[schema(example = "OK")]
    pub health: String,
    pub sessions_count: usize,
}
