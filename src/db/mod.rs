use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use rocket::fairing::AdHoc;

pub fn init() -> AdHoc {
    AdHoc::on_ignite("MongoDB", |rocket| async {
        match connect().await {
            Ok(database) => {
                info!("✓ MongoDB connected successfully");
                rocket.manage(database)
            }
            Err(e) => {
                error!("✗ Failed to connect to MongoDB: {}", e);
                rocket
            }
        }
    })
}

async fn connect() -> Result<Database, mongodb::error::Error> {
    let uri = crate::config::Config::mongodb_uri();
    let client = Client::with_uri_str(&uri).await?;

    // Test connection
    client
        .database("admin")
        .run_command(doc! {"ping": 1}, None)
        .await?;

    let database = client.database("glam");
    ensure_indexes(&database).await?;
    Ok(database)
}

/// Unique indexes the write paths lean on: one user per phone, one rate-limit
/// window per key (racing upserts collapse onto it), one banner per slot.
async fn ensure_indexes(database: &Database) -> Result<(), mongodb::error::Error> {
    let unique = |keys: Document| {
        IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build()
    };

    database
        .collection::<Document>("users")
        .create_index(unique(doc! { "phone": 1 }), None)
        .await?;
    database
        .collection::<Document>("rate_limits")
        .create_index(unique(doc! { "key": 1 }), None)
        .await?;
    database
        .collection::<Document>("banners")
        .create_index(unique(doc! { "position": 1 }), None)
        .await?;
    database
        .collection::<Document>("consultant_banners")
        .create_index(unique(doc! { "position": 1 }), None)
        .await?;

    Ok(())
}

pub type DbConn = Database;
