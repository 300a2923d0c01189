use std::env::var;

#[derive(Clone)]
pub struct Env {
    postgres_url: String,
    server_ip: String,
    server_port: String,
    cors_origin: String,
}

impl Env {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let postgres_url = var("DATABASE_URL").expect("DATABASE_URL must be set in .env");
        let server_ip = var("SERVER_IP").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let server_port = var("SERVER_PORT").unwrap_or_else(|_| "8080".to_owned());
        let cors_origin = var("CORS_ORIGIN").unwrap_or_else(|_| "All".to_owned());

        Self {
            postgres_url,
            server_ip,
            server_port,
            cors_origin,
        }
    }

    pub fn postgres_url(&self) -> &str {
        &self.postgres_url
    }

    pub fn cors_origin(&self) -> &str {
        &self.cors_origin
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.server_ip, self.server_port)
    }
}
