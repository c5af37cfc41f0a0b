use std::env;

#[derive(Clone)]
pub struct Config {
    pub mongo_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub frontend_origin: String,
    pub email_host: String,
    pub email_user: String,
    pub email_pass: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            mongo_uri: env::var("MONGO_URI").expect("MONGO_URI must be set"),
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "task_db".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            frontend_origin: env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            email_host: env::var("EMAIL_HOST").expect("EMAIL_HOST must be set"),
            email_user: env::var("EMAIL_USER").expect("EMAIL_USER must be set"),
            email_pass: env::var("EMAIL_PASS").expect("EMAIL_PASS must be set"),
        }
    }
}
