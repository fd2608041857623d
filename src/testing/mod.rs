//! Setup helpers shared by unit and integration tests

pub mod setup;

/// Initialise an actix test service routed like the binary, with `$registry`
/// as app data
#[macro_export]
macro_rules! service {
    ($registry:expr) => {{
        let app = ::actix_web::App::new()
            .app_data(::actix_web::web::Data::new($registry))
            .configure($crate::router::route);

        ::actix_web::test::init_service(app).await
    }};
}
