use std::env;

/// Default Atlas host used when the connection string is assembled from `DB_USER`/`DB_PASS`.
const DEFAULT_DB_CLUSTER: &str = "cluster0.lnrcai2.mongodb.net";
/// Fallback signing secret, only accepted outside production.
const LOCAL_TOKEN_SECRET: &str = "pet-lover-local-access-token-secret";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// shared read-only with every request through `FromRef<AppState>`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Full MongoDB connection string.
    pub mongo_uri: String,
    // Database holding the users, pets, adoption and campaign collections.
    pub db_name: String,
    // HS256 secret used both to issue and to verify bearer tokens.
    pub token_secret: String,
    // TCP port the HTTP server listens on.
    pub port: u16,
    // Browser origins allowed by the CORS layer (credentials enabled).
    pub cors_origins: Vec<String>,
    // Runtime environment marker. Controls log format and fail-fast strictness.
    pub env: Env,
}

/// Env
///
/// The runtime context: `Local` for development (pretty logs, lenient secrets) and
/// `Production` (JSON logs, every secret mandatory).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test state scaffolding.
    fn default() -> Self {
        Self {
            mongo_uri: "mongodb://localhost:27017".to_string(),
            db_name: "petLoverDb".to_string(),
            token_secret: LOCAL_TOKEN_SECRET.to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from the environment (after `dotenv` has populated it).
    ///
    /// # Panics
    /// Panics when a variable required for the current environment is missing, or when
    /// `PORT` is not a valid port number. The server must not start half-configured.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let token_secret = match env {
            Env::Production => env::var("ACCESS_TOKEN_SECRET")
                .expect("FATAL: ACCESS_TOKEN_SECRET must be set in production."),
            Env::Local => {
                env::var("ACCESS_TOKEN_SECRET").unwrap_or_else(|_| LOCAL_TOKEN_SECRET.to_string())
            }
        };

        // An explicit URI wins; otherwise the Atlas SRV string is built from credentials.
        let mongo_uri = match env::var("MONGODB_URI") {
            Ok(uri) => uri,
            Err(_) => {
                let user = env::var("DB_USER")
                    .expect("FATAL: DB_USER (or MONGODB_URI) must be set.");
                let pass = env::var("DB_PASS")
                    .expect("FATAL: DB_PASS (or MONGODB_URI) must be set.");
                let cluster =
                    env::var("DB_CLUSTER").unwrap_or_else(|_| DEFAULT_DB_CLUSTER.to_string());
                atlas_uri(&user, &pass, &cluster)
            }
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .expect("FATAL: PORT must be a valid TCP port number."),
            Err(_) => 5000,
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]);

        Self {
            mongo_uri,
            db_name: env::var("DB_NAME").unwrap_or_else(|_| "petLoverDb".to_string()),
            token_secret,
            port,
            cors_origins,
            env,
        }
    }
}

/// Builds the `mongodb+srv` connection string used by the hosted Atlas cluster.
pub fn atlas_uri(user: &str, pass: &str, cluster: &str) -> String {
    format!(
        "mongodb+srv://{user}:{pass}@{cluster}/?retryWrites=true&w=majority&appName=Cluster0"
    )
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
