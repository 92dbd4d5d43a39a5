use actix_web::{web, App, HttpServer};
use actix_web::dev::Server;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{SessionIssuer, TokenCodec};
use crate::configuration::AuthSettings;
use crate::middleware::{AuthGate, RequestLogger};
use crate::notes::NoteStore;
use crate::routes::{
    change_password, create_note, delete_note, health_check, list_notes, login, logout, me,
    refresh, register, retrieve_note, update_note,
};
use crate::users::UserStore;

pub fn run(
    listener: TcpListener,
    user_store: Arc<dyn UserStore>,
    note_store: Arc<dyn NoteStore>,
    auth_settings: AuthSettings,
) -> Result<Server, std::io::Error> {
    let codec = TokenCodec::new(&auth_settings.secret);
    let issuer = web::Data::new(SessionIssuer::new(user_store.clone(), codec.clone()));
    let user_store: web::Data<dyn UserStore> = web::Data::from(user_store);
    let note_store: web::Data<dyn NoteStore> = web::Data::from(note_store);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)

            // Shared state
            .app_data(issuer.clone())
            .app_data(user_store.clone())
            .app_data(note_store.clone())

            .route("/health_check", web::get().to(health_check))

            .service(
                web::scope("/api/v1")
                    // Public routes
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/logout", web::post().to(logout))

                    // Protected routes
                    .service(
                        web::scope("")
                            .wrap(AuthGate::new(codec.clone()))
                            .route("/me", web::get().to(me))
                            .route("/change_password", web::post().to(change_password))
                            .route("/notes", web::get().to(list_notes))
                            .route("/notes", web::post().to(create_note))
                            .route("/notes/{id}", web::get().to(retrieve_note))
                            .route("/notes/{id}", web::put().to(update_note))
                            .route("/notes/{id}", web::delete().to(delete_note)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
