#[macro_use]
extern crate rocket;
#[macro_use]
extern crate log;

mod config;
mod db;
mod guards;
mod models;
mod routes;
mod services;
mod utils;

use dotenvy::dotenv;
use mongodb::bson::doc;
use rocket::fairing::{AdHoc, Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Build, Request, Response, Rocket};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};

/* ----------------------------- CORS ----------------------------- */

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if let Some(origin) = request.headers().get_one("Origin") {
            response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        }

        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));

        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        ));

        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/* ----------------------------- OPTIONS ----------------------------- */

#[options("/<_..>")]
fn options_handler() {}

/* ----------------------------- ERRORS ----------------------------- */

#[catch(401)]
fn unauthorized() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Authentication required. Please provide a valid token."
    })
}

#[catch(403)]
fn forbidden() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Admin access required."
    })
}

#[catch(404)]
fn not_found() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Resource not found (check /api/v1 prefix)"
    })
}

#[catch(500)]
fn internal_error() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Internal server error"
    })
}

/* ----------------------------- ADMIN SEED ----------------------------- */

fn seed_admin() -> AdHoc {
    AdHoc::on_ignite("Admin seed", |rocket| async {
        if let Some(database) = rocket.state::<db::DbConn>() {
            if let Err(e) = ensure_admin(database).await {
                error!("Failed to seed admin user: {}", e);
            }
        }
        rocket
    })
}

async fn ensure_admin(database: &db::DbConn) -> Result<(), mongodb::error::Error> {
    use models::{Role, User};

    let users = database.collection::<User>("users");
    if users.find_one(doc! { "role": "admin" }, None).await?.is_some() {
        info!("Admin user already exists");
        return Ok(());
    }

    let mut admin = User::new("Default Admin".to_string(), config::Config::admin_phone());
    admin.email = Some(config::Config::admin_email());
    admin.is_verified = true;
    admin.role = Role::Admin;

    users.insert_one(&admin, None).await?;
    info!("Default admin user created: {}", admin.phone);
    Ok(())
}

/* ----------------------------- SWAGGER ----------------------------- */

fn swagger_config() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}

/* ----------------------------- LAUNCH ----------------------------- */

#[launch]
fn rocket() -> Rocket<Build> {
    dotenv().ok();
    env_logger::init();

    println!("🚀 Glam API running");
    println!("📚 Swagger UI → http://localhost:8000/api/docs");

    rocket::build()
        .attach(db::init())
        .attach(seed_admin())
        .attach(CORS)
        .mount("/", routes![options_handler])
        .mount(
            "/api/v1",
            routes![
                // Auth
                routes::auth::register,
                routes::auth::login,
                routes::auth::verify_login,
                routes::auth::send_otp,
                routes::auth::verify_otp,
                routes::auth::get_profile,
                routes::auth::update_profile,
                routes::auth::save_address,
                routes::auth::get_addresses,
                // Cart
                routes::cart::get_cart,
                routes::cart::add_to_cart,
                routes::cart::remove_from_cart,
                routes::cart::increase_quantity,
                routes::cart::decrease_quantity,
                routes::cart::clear_cart,
                routes::cart::checkout_with_details,
                // Booking
                routes::booking::verify_service_otp,
                routes::booking::get_booking_details,
                routes::booking::get_booking_by_id,
                // Categories
                routes::category::get_all_categories,
                routes::category::create_category,
                routes::category::update_category,
                routes::category::delete_category,
                // Subcategories
                routes::subcategory::get_subcategories,
                routes::subcategory::create_subcategory,
                routes::subcategory::update_subcategory,
                routes::subcategory::delete_subcategory,
                // Services
                routes::service::get_all_services,
                routes::service::get_services_by_subcategory,
                routes::service::get_service_by_id,
                routes::service::create_service,
                routes::service::update_service,
                routes::service::delete_service,
                // Banners
                routes::banner::get_active_banners,
                routes::banner::get_banner_by_position,
                routes::banner::get_banner_by_id,
                routes::banner::get_all_banners,
                routes::banner::create_banner,
                routes::banner::update_banner,
                routes::banner::update_banner_position,
                routes::banner::delete_banner,
                // Consultant experts
                routes::consultant::get_active_experts,
                routes::consultant::get_expert_by_id,
                routes::consultant::get_all_experts,
                routes::consultant::create_expert,
                routes::consultant::update_expert,
                routes::consultant::delete_expert,
                // Consultant banners
                routes::consultant::get_active_consultant_banners,
                routes::consultant::get_consultant_banner_by_position,
                routes::consultant::get_all_consultant_banners,
                routes::consultant::get_consultant_banner_by_id,
                routes::consultant::create_consultant_banner,
                routes::consultant::update_consultant_banner,
                routes::consultant::update_consultant_banner_position,
                routes::consultant::delete_consultant_banner,
            ],
        )
        .mount("/api/docs", make_swagger_ui(&swagger_config()))
        .register("/", catchers![unauthorized, forbidden, not_found, internal_error])
}
