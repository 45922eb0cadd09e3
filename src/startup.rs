use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use actix_web::dev::Server;

use crate::clients::ProfileClient;
use crate::configuration::Settings;
use crate::middleware::{JwtGuard, RequestLogging};
use crate::routes::{
    change_password, health_check, login, logout, refresh_token, register, validate_token,
};
use crate::token::TokenCodec;

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let codec = TokenCodec::new(settings.jwt.clone());
    let profile_client = ProfileClient::new(&settings.user_profile);

    let pool = connection;
    let connection = web::Data::new(pool.clone());
    let codec_data = web::Data::new(codec.clone());
    let profile_client_data = web::Data::new(profile_client);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogging)
            // Shared state
            .app_data(connection.clone())
            .app_data(codec_data.clone())
            .app_data(profile_client_data.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refreshToken", web::post().to(refresh_token))
            .route("/auth/logout", web::post().to(logout))
            .route("/auth/validateToken", web::post().to(validate_token))
            // Protected routes (identity from bearer token)
            .service(
                web::scope("/auth")
                    .wrap(JwtGuard::new(codec.clone(), pool.clone()))
                    .route("/changePassword", web::post().to(change_password)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
