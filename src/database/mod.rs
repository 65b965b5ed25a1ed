use mongodb::{Client, Collection, Database};
use std::error::Error;

pub const GARDENERS_COLLECTION: &str = "gardeners";
pub const TIPS_COLLECTION: &str = "tips";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Keep a small warm pool; the service is request-bound, not batch-bound
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .next_back()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("gardenDB");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the query paths rely on.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        // gardeners(uid) unique - one profile per external identity
        let gardeners = self
            .database()
            .collection::<mongodb::bson::Document>(GARDENERS_COLLECTION);

        let uid_index = IndexModel::builder()
            .keys(doc! { "uid": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match gardeners.create_index(uid_index).await {
            Ok(_) => log::info!("   ✅ Index created: gardeners(uid) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let tips = self
            .database()
            .collection::<mongodb::bson::Document>(TIPS_COLLECTION);

        // tips(userId) - author listings
        let author_index = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .build();

        match tips.create_index(author_index).await {
            Ok(_) => log::info!("   ✅ Index created: tips(userId)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // tips(availability, createdAt) - public feed, newest first
        let feed_index = IndexModel::builder()
            .keys(doc! { "availability": 1, "createdAt": -1 })
            .build();

        match tips.create_index(feed_index).await {
            Ok(_) => log::info!("   ✅ Index created: tips(availability, createdAt)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
