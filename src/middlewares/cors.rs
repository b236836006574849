use actix_cors::Cors;

/// The consumer site and the salon/admin dashboards are served from
/// different origins and call the function endpoints directly.
pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
