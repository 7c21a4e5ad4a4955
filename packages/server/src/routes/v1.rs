use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/admins", admin_routes())
        .nest("/events", event_routes(config))
        .nest("/files", file_routes())
        .nest("/announcements", announcement_routes())
        .nest("/members", member_routes())
        .nest("/admin", maintenance_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::auth::create_admin))
}

fn event_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::events::list_events,
            handlers::events::create_event
        ))
        .routes(routes!(
            handlers::events::get_event,
            handlers::events::update_event,
            handlers::events::delete_event
        ))
        .layer(handlers::events::event_body_limit(config))
}

fn file_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::files::download_file))
}

fn announcement_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::announcements::list_announcements,
            handlers::announcements::create_announcement
        ))
        .routes(routes!(handlers::announcements::delete_announcement))
}

fn member_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::members::list_members,
            handlers::members::create_member
        ))
        .routes(routes!(handlers::members::delete_member))
}

fn maintenance_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::integrity::check_integrity))
}
