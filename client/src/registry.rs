//! HTTP adapter for the hosted backend: a PostgREST table for app records,
//! object storage for the uploaded files and password auth for accounts.

use std::fs::File;
use std::io;
use std::path::Path;

use im::OrdMap as Map;
use reqwest::blocking::{Body, Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;
use url::form_urlencoded::Serializer;
use url::Url;

use apkshelf_lib::asset::Asset;
use apkshelf_lib::auth::Identity;
use apkshelf_lib::backend::{BackendError, BlobStore, RecordStore};
use apkshelf_lib::record::{AppListing, AppRecord, Query};

use crate::config::{Backend, Config};
use crate::error::Error;
use crate::io::ProgressIO;
use crate::ui::make_progress;

#[derive(Debug)]
pub struct Registry {
    http: Client,
    base: Url,
    anon_key: String,
    table: String,
    token: Option<String>,
    quiet: bool,
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

fn decode(err: reqwest::Error) -> BackendError {
    BackendError::Decode(err.to_string())
}

/// Pulls the human readable part out of an error body, whichever of the
/// backend services produced it.
pub fn error_message(body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in &["message", "msg", "error_description", "error"] {
            if let Some(Value::String(message)) = fields.get(*key) {
                return message.clone();
            }
        }
    }
    body.trim().to_string()
}

/// PostgREST query arguments for `query`.
pub fn query_args(query: &Query) -> Map<String, String> {
    let mut args = ordmap! {"select".to_string() => "*".to_string()};
    for &(ref field, ref value) in &query.filters {
        args.insert(field.clone(), format!("eq.{}", value));
    }
    if let Some((ref field, direction)) = query.order {
        args.insert("order".to_string(), format!("{}.{}", field, direction));
    }
    if let Some(limit) = query.limit {
        args.insert("limit".to_string(), limit.to_string());
    }
    args
}

fn encode_args(args: Map<String, String>) -> String {
    let mut ser = Serializer::new(String::new());
    for (k, v) in args {
        ser.append_pair(&*k, &*v);
    }
    ser.finish()
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserResponse,
}

#[derive(Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
}

impl TokenResponse {
    fn into_identity(self) -> Identity {
        Identity {
            id: self.user.id,
            email: self.user.email,
            access_token: Some(self.access_token),
        }
    }
}

impl Registry {
    pub fn new(backend: &Backend) -> Result<Registry, Error> {
        let base = Url::parse(&backend.url)?;
        if base.cannot_be_a_base() {
            return Err(Error::Custom(format!(
                "backend URL {} can't have paths appended",
                backend.url
            )));
        }
        let http = Client::builder()
            .build()
            .map_err(|err| Error::Custom(format!("unable to set up HTTP client: {}", err)))?;
        Ok(Registry {
            http,
            base,
            anon_key: backend.anon_key.clone(),
            table: backend.apps_table.clone(),
            token: None,
            quiet: false,
        })
    }

    /// A registry for the configured backend, acting as the stored user
    /// if there is one.
    pub fn from_config(config: &Config) -> Result<Registry, Error> {
        config.check_backend()?;
        Ok(Registry::new(&config.backend)?.with_token(config.auth.access_token.clone()))
    }

    pub fn with_token(self, token: Option<String>) -> Self {
        Registry { token, ..self }
    }

    pub fn quiet(self, quiet: bool) -> Self {
        Registry { quiet, ..self }
    }

    /// `{base}/{segments...}?{args}`, each segment escaped on its own.
    pub fn endpoint(&self, segments: &[&str], args: Map<String, String>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !args.is_empty() {
            url.set_query(Some(&encode_args(args)));
        }
        url
    }

    fn object_segments<'p>(
        kind: &'p [&'p str],
        bucket: &'p str,
        path: &'p str,
    ) -> Vec<&'p str> {
        let mut segments = vec!["storage", "v1", "object"];
        segments.extend_from_slice(kind);
        segments.push(bucket);
        segments.extend(path.split('/'));
        segments
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self.token.as_ref().unwrap_or(&self.anon_key);
        builder
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(bearer)
    }

    fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let res = self.request(builder).send().map_err(transport)?;
        let status = res.status();
        if status.is_success() {
            Ok(res)
        } else {
            let body = res.text().unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "registry.rejected");
            Err(BackendError::Rejected(status.as_u16(), error_message(&body)))
        }
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Identity, BackendError> {
        let url = self.endpoint(
            &["auth", "v1", "token"],
            ordmap! {"grant_type".to_string() => "password".to_string()},
        );
        let res = self.send(
            self.http
                .post(url)
                .json(&json!({ "email": email, "password": password })),
        )?;
        let token: TokenResponse = res.json().map_err(decode)?;
        Ok(token.into_identity())
    }

    /// Creates an account. Returns the new identity when the backend signs
    /// the user in straight away, `None` when it wants the address
    /// confirmed first.
    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Option<Identity>, BackendError> {
        let url = self.endpoint(&["auth", "v1", "signup"], Map::new());
        let res = self.send(self.http.post(url).json(&json!({
            "email": email,
            "password": password,
            "data": { "name": name },
        })))?;
        let body: Value = res.json().map_err(decode)?;
        if body.get("access_token").is_some() {
            let token: TokenResponse =
                serde_json::from_value(body).map_err(|err| BackendError::Decode(err.to_string()))?;
            Ok(Some(token.into_identity()))
        } else {
            Ok(None)
        }
    }

    /// Streams the file at `url` into `dest`, returning the byte count.
    pub fn download(&self, url: &str, dest: &Path) -> Result<u64, Error> {
        let res = self.send(self.http.get(url))?;
        let total = res.content_length().unwrap_or(0);
        let bar = make_progress("Downloading:", total, self.quiet);
        let progress = bar.clone();
        let mut reader = ProgressIO::reader(total as usize, res, move |current, _| {
            progress.set_position(current as u64)
        });
        let mut file = File::create(dest)?;
        let written = io::copy(&mut reader, &mut file)?;
        bar.finish_and_clear();
        Ok(written)
    }
}

impl RecordStore for Registry {
    fn query_apps(&self, query: &Query) -> Result<Vec<AppListing>, BackendError> {
        let url = self.endpoint(&["rest", "v1", self.table.as_str()], query_args(query));
        debug!(url = %url, "registry.query");
        let res = self.send(self.http.get(url))?;
        res.json().map_err(decode)
    }

    fn insert_app(&self, record: &AppRecord) -> Result<(), BackendError> {
        let url = self.endpoint(&["rest", "v1", self.table.as_str()], Map::new());
        debug!(url = %url, id = %record.id, "registry.insert");
        self.send(
            self.http
                .post(url)
                .header("Prefer", "return=minimal")
                .json(record),
        )?;
        Ok(())
    }
}

impl BlobStore for Registry {
    fn upload(&self, bucket: &str, path: &str, asset: &Asset) -> Result<(), BackendError> {
        let url = self.endpoint(&Registry::object_segments(&[], bucket, path), Map::new());
        debug!(url = %url, size = asset.size(), "registry.upload");
        let bar = make_progress(&asset.file_name, asset.size() as u64, self.quiet);
        let progress = bar.clone();
        let body = ProgressIO::reader_from(asset.data.clone(), move |current, _| {
            progress.set_position(current as u64)
        });
        let result = self.send(
            self.http
                .post(url)
                .header(CONTENT_TYPE, asset.mime.to_string())
                .header("x-upsert", "false")
                .body(Body::sized(body, asset.size() as u64)),
        );
        bar.finish_and_clear();
        result.map(|_| ())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(&Registry::object_segments(&["public"], bucket, path), Map::new())
            .to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use apkshelf_lib::record::Direction;
    use pretty_assertions::assert_eq;

    fn registry(url: &str) -> Registry {
        Registry::new(&Backend {
            url: url.to_string(),
            anon_key: "anon".to_string(),
            ..Backend::default()
        })
        .unwrap()
    }

    #[test]
    fn query_url() {
        let query = Query::new()
            .eq("category", "Photo & Video")
            .order("downloads", Direction::Descending)
            .limit(6);
        let url = registry("https://shelf.example.co")
            .endpoint(&["rest", "v1", "apps"], query_args(&query));
        assert_eq!(
            url.as_str(),
            "https://shelf.example.co/rest/v1/apps?category=eq.Photo+%26+Video&limit=6&order=downloads.desc&select=*"
        );
    }

    #[test]
    fn bare_query_selects_everything() {
        assert_eq!(
            query_args(&Query::new()),
            ordmap! {"select".to_string() => "*".to_string()}
        );
    }

    #[test]
    fn public_urls() {
        let registry = registry("https://shelf.example.co/");
        assert_eq!(
            registry.public_url("app-images", "a1/screenshot-1.png"),
            "https://shelf.example.co/storage/v1/object/public/app-images/a1/screenshot-1.png"
        );
        assert_eq!(
            registry.public_url("apk-files", "a1/my app.apk"),
            "https://shelf.example.co/storage/v1/object/public/apk-files/a1/my%20app.apk"
        );
    }

    #[test]
    fn rejects_opaque_urls() {
        assert_matches!(
            Registry::new(&Backend {
                url: "mailto:dev@example.com".to_string(),
                ..Backend::default()
            }),
            Err(Error::Custom(_))
        );
        assert_matches!(
            Registry::new(&Backend::default()),
            Err(Error::Url(_))
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            error_message(r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#),
            "The resource already exists"
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message(" Bad Gateway\n"), "Bad Gateway");
    }
}
