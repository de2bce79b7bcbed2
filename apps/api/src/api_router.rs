use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::handlers::{forms, groups, health, pages, rows, tables};
use crate::state::AppState;
use crate::{auth, middleware};

pub fn build_router(
    app_state: AppState,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Router {
    let content_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/api/groups", get(groups::list_groups_handler))
        .route(
            "/api/tables",
            get(tables::list_tables_handler).post(tables::create_table_handler),
        )
        .route(
            "/api/tables/{table}",
            get(tables::get_table_handler)
                .put(tables::update_table_handler)
                .delete(tables::delete_table_handler),
        )
        .route(
            "/api/tables/{table}/fields",
            get(tables::list_fields_handler).post(tables::create_field_handler),
        )
        .route(
            "/api/tables/{table}/fields/{field}",
            get(tables::get_field_handler)
                .put(tables::update_field_handler)
                .delete(tables::delete_field_handler),
        )
        .route(
            "/api/tables/{table}/rows",
            get(rows::list_rows_handler).post(rows::create_row_handler),
        )
        .route(
            "/api/tables/{table}/rows/{id}",
            get(rows::get_row_handler)
                .put(rows::update_row_handler)
                .delete(rows::delete_row_handler),
        )
        .route(
            "/api/tables/{table}/form/{selector}",
            get(forms::edit_form_handler),
        )
        .route("/pages/{slug}", get(pages::get_page_handler))
        .route_layer(from_fn(middleware::resolve_identity));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(content_routes)
        .layer(TraceLayer::new_for_http())
        .layer(session_layer)
        .with_state(app_state)
}
