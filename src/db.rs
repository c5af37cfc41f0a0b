use mongodb::{options::ClientOptions, Client, Database};

/// Handle to the task database. The `Client` is connection-pooled and owned
/// by the `Database`, so only the database handle is kept.
pub struct MongoDB {
    pub db: Database,
}

impl MongoDB {
    pub async fn init(uri: &str, db_name: &str) -> Self {
        let client_options = ClientOptions::parse(uri)
            .await
            .expect("Failed to parse MongoDB connection string");
        let client = Client::with_options(client_options).expect("Failed to initialize client");
        MongoDB {
            db: client.database(db_name),
        }
    }
}
