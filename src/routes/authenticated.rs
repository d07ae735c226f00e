use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Authenticated Router Module
///
/// The employee registry. Every route here sits behind the auth middleware layered on
/// in `create_router`, so handlers never check the token themselves.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /employees
        // List every employee in insertion order, or add a new one (id assigned here).
        .route(
            "/employees",
            get(handlers::get_all_employees).post(handlers::create_employee),
        )
        // GET/PUT/DELETE /employees/{id}
        // Fetch, partially update (form fields), or remove a single employee.
        .route(
            "/employees/{id}",
            get(handlers::get_employee)
                .put(handlers::update_employee)
                .delete(handlers::delete_employee),
        )
}
