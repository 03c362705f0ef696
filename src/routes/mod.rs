pub mod auth;
pub mod comments;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::refresh),
    )
    .service(
        web::scope("/users")
            .service(users::list_users)
            .service(users::soft_delete_user)
            .service(users::get_user)
            .service(users::update_user)
            .service(users::delete_user),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::patch_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/comments")
            .service(comments::list_comments)
            .service(comments::create_comment)
            .service(comments::get_comment)
            .service(comments::update_comment)
            .service(comments::patch_comment)
            .service(comments::delete_comment),
    );
}
