pub mod auth;
pub mod config;

use crate::core::{ApiError, Result};
use crate::parser::SqlParserAdapter;
use crate::result::{QueryResult, project_rows};
use crate::schema::{TableSchema, extract_records, infer_table_schema};
use crate::translator;
use config::ConnectionConfig;
use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const USER_AGENT_VALUE: &str = concat!("jsonapidb/", env!("CARGO_PKG_VERSION"));

/// Logical connection to a JSON API.
///
/// Holds the configuration, an HTTP client carrying the auth headers,
/// and the per-endpoint schema cache. There is no persistent socket
/// state: every query is one request/response cycle.
///
/// # Examples
///
/// ```no_run
/// use jsonapidb::{Connection, ConnectionConfig};
///
/// # fn main() -> jsonapidb::Result<()> {
/// let config = ConnectionConfig::new("https://api.example.com")
///     .bearer_token("secret")
///     .envelope("data");
///
/// let conn = Connection::connect(config)?;
/// let result = conn.execute("SELECT * FROM items WHERE id = 2 LIMIT 1")?;
/// for row in result.rows() {
///     println!("{:?}", row);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Connection {
    config: ConnectionConfig,
    client: reqwest::blocking::Client,
    parser: SqlParserAdapter,
    /// Inferred schemas, written at most once per endpoint. A duplicate
    /// inference race only wastes one request; the first writer wins.
    schemas: RwLock<HashMap<String, Arc<TableSchema>>>,
}

impl Connection {
    pub fn connect(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::Config(format!("invalid header name: '{}'", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ApiError::Config(format!("invalid value for header '{}'", name)))?;
            headers.insert(name, value);
        }
        config.auth.apply(&mut headers)?;

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            parser: SqlParserAdapter::new(),
            schemas: RwLock::new(HashMap::new()),
        })
    }

    /// Connect using a `jsonapi://` connection string.
    pub fn connect_url(url: &str) -> Result<Self> {
        Self::connect(ConnectionConfig::from_url(url)?)
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Execute a restricted SELECT against an endpoint.
    pub fn execute(&self, sql: &str) -> Result<QueryResult> {
        let query = self.parser.parse(sql)?;
        let schema = self.table_schema(&query.table)?;

        let plan = translator::build_plan(&self.config, &query);
        let body = self.get_json(&plan.path, &plan.params)?;
        let records = extract_records(&body, self.config.envelope.as_deref())?;

        let limit = query.limit.unwrap_or(self.config.max_rows);
        project_rows(&schema, &query.projection, &records, limit)
    }

    /// Tables this connection serves.
    pub fn table_names(&self) -> Vec<String> {
        self.config.table_names()
    }

    /// Column descriptors for a table, inferred lazily from one sample
    /// request and cached for the connection's lifetime.
    pub fn table_schema(&self, table: &str) -> Result<Arc<TableSchema>> {
        if let Some(schema) = self.schemas.read()?.get(table) {
            return Ok(Arc::clone(schema));
        }

        let schema = Arc::new(self.infer_schema(table)?);

        let mut cache = self.schemas.write()?;
        let entry = cache
            .entry(table.to_string())
            .or_insert_with(|| Arc::clone(&schema));
        Ok(Arc::clone(entry))
    }

    /// Probe the API for reachability.
    pub fn ping(&self) -> bool {
        let table = match self.table_names().into_iter().next() {
            Some(table) => table,
            None => return false,
        };
        match self.table_schema(&table) {
            Ok(_) => true,
            Err(err) => {
                warn!("ping failed: {}", err);
                false
            }
        }
    }

    fn infer_schema(&self, table: &str) -> Result<TableSchema> {
        let path = self.config.endpoint_path(table);
        let params = vec![(
            self.config.limit_param.clone(),
            self.config.sample_limit.to_string(),
        )];

        let body = self.get_json(&path, &params)?;
        let records = extract_records(&body, self.config.envelope.as_deref())?;
        infer_table_schema(table, &records)
    }

    fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<JsonValue> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!("GET {} params={:?}", url, params);

        let response = self.client.get(&url).query(params).send()?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Authentication(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate(&body, 200)
            )));
        }

        response
            .json()
            .map_err(|e| ApiError::Schema(format!("invalid JSON response: {}", e)))
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
