use crate::{fetch, Config, LeetSyncError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use crypto_box::{aead::OsRng, PublicKey};
use log::debug;
use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT},
    StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::convert::TryInto;
use url::Url;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub full_name: String,
    pub html_url: String,
}

/// Body of `POST /user/repos`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewRepository {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    pub has_wiki: bool,
    pub has_issues: bool,
    pub auto_init: bool,
}

/// What lives at a repository path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    File { sha: String },
    Directory,
}

/// Body of `PUT /repos/{repo}/contents/{path}`; `sha` is required to replace a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub message: String,
    pub content: String,
    pub sha: Option<String>,
}

/// Hosting covers the handful of GitHub calls the updater and the setup
/// wizard make. Repositories are addressed by `owner/name`.
#[cfg_attr(test, mockall::automock)]
pub trait Hosting {
    /// Login of the token's owner.
    fn login(&self) -> Result<String>;
    fn find_repository(&self, full_name: &str) -> Result<Option<Repository>>;
    fn create_repository(&self, repo: &NewRepository) -> Result<Repository>;
    fn contents(&self, full_name: &str, path: &str) -> Result<Option<Contents>>;
    fn put_file(&self, full_name: &str, path: &str, change: &FileChange) -> Result<()>;
    fn secret_exists(&self, full_name: &str, name: &str) -> Result<bool>;
    fn create_secret(&self, full_name: &str, name: &str, value: &str) -> Result<()>;
    fn delete_secret(&self, full_name: &str, name: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct Login {
    login: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Directory(Vec<serde_json::Value>),
    Entry {
        sha: String,
        #[serde(rename = "type")]
        kind: String,
    },
}

#[derive(Deserialize)]
struct RepoPublicKey {
    key_id: String,
    key: String,
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct PutSecret<'a> {
    encrypted_value: String,
    key_id: &'a str,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Blocking GitHub REST v3 client.
pub struct GithubClient {
    http: Client,
    api: Url,
}

impl GithubClient {
    pub fn new(config: &Config, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token.trim()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("leetsync"));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        let mut base = config.urls.github_api.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(GithubClient {
            http: fetch::client(headers)?,
            api: Url::parse(&base)?,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.api.join(path.trim_start_matches('/'))?)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send()?;
        debug!("{} {}", response.status(), response.url());
        Ok(response)
    }

    /// GET that maps 404 to `None`.
    fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self.send(self.http.get(self.url(path)?))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response)?.json()?))
    }
}

/// Non-2xx responses become `LeetSyncError::Remote` with GitHub's message.
fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(remote_error(status, &body))
}

/// GitHub's JSON `message` when there is one, the raw body otherwise.
fn remote_error(status: StatusCode, body: &str) -> LeetSyncError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string());
    LeetSyncError::Remote(format!("{} {}", status.as_u16(), message))
}

fn contents_path(full_name: &str, path: &str) -> String {
    format!("repos/{}/contents/{}", full_name, path.trim_start_matches('/'))
}

fn secret_path(full_name: &str, name: &str) -> String {
    format!("repos/{}/actions/secrets/{}", full_name, name)
}

/// Encrypt `value` as a libsodium sealed box for the repository's public key.
pub fn seal_secret(public_key: &str, value: &str) -> Result<String> {
    let raw = BASE64
        .decode(public_key)
        .map_err(|e| LeetSyncError::Crypto(e.to_string()))?;
    let bytes: [u8; 32] = raw
        .as_slice()
        .try_into()
        .map_err(|_| LeetSyncError::Crypto(format!("public key is {} bytes", raw.len())))?;

    let sealed = PublicKey::from(bytes)
        .seal(&mut OsRng, value.as_bytes())
        .map_err(|e| LeetSyncError::Crypto(e.to_string()))?;

    Ok(BASE64.encode(sealed))
}

impl Hosting for GithubClient {
    fn login(&self) -> Result<String> {
        let response = check(self.send(self.http.get(self.url("user")?))?)?;
        Ok(response.json::<Login>()?.login)
    }

    fn find_repository(&self, full_name: &str) -> Result<Option<Repository>> {
        self.get_optional(&format!("repos/{}", full_name))
    }

    fn create_repository(&self, repo: &NewRepository) -> Result<Repository> {
        debug!("Creating repository {}", repo.name);
        let request = self.http.post(self.url("user/repos")?).json(repo);
        Ok(check(self.send(request)?)?.json()?)
    }

    fn contents(&self, full_name: &str, path: &str) -> Result<Option<Contents>> {
        let found: Option<ContentsResponse> = self.get_optional(&contents_path(full_name, path))?;
        Ok(found.map(|c| match c {
            ContentsResponse::Directory(_) => Contents::Directory,
            ContentsResponse::Entry { kind, .. } if kind == "dir" => Contents::Directory,
            ContentsResponse::Entry { sha, .. } => Contents::File { sha },
        }))
    }

    fn put_file(&self, full_name: &str, path: &str, change: &FileChange) -> Result<()> {
        let body = PutContents {
            message: &change.message,
            content: BASE64.encode(change.content.as_bytes()),
            sha: change.sha.as_deref(),
        };
        let request = self
            .http
            .put(self.url(&contents_path(full_name, path))?)
            .json(&body);
        check(self.send(request)?)?;
        Ok(())
    }

    fn secret_exists(&self, full_name: &str, name: &str) -> Result<bool> {
        let found: Option<serde_json::Value> =
            self.get_optional(&secret_path(full_name, name))?;
        Ok(found.is_some())
    }

    fn create_secret(&self, full_name: &str, name: &str, value: &str) -> Result<()> {
        let key = check(self.send(self.http.get(
            self.url(&format!("repos/{}/actions/secrets/public-key", full_name))?,
        ))?)?
        .json::<RepoPublicKey>()?;

        let body = PutSecret {
            encrypted_value: seal_secret(&key.key, value)?,
            key_id: &key.key_id,
        };
        let request = self
            .http
            .put(self.url(&secret_path(full_name, name))?)
            .json(&body);
        check(self.send(request)?)?;
        Ok(())
    }

    fn delete_secret(&self, full_name: &str, name: &str) -> Result<()> {
        let request = self.http.delete(self.url(&secret_path(full_name, name))?);
        check(self.send(request)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_box::SecretKey;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answers a single request on a loopback port and hands back the raw
    /// request text (head and body).
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request = String::new();
            let mut length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        length = value.trim().parse().unwrap();
                    }
                }
                request.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut payload = vec![0; length];
            reader.read_exact(&mut payload).unwrap();
            request.push_str(&String::from_utf8(payload).unwrap());

            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (url, handle)
    }

    fn client_for(url: &str) -> GithubClient {
        let mut config = Config::get();
        config.urls.github_api = url.into();
        GithubClient::new(&config, "ghp_test").unwrap()
    }

    fn request_body(request: &str) -> serde_json::Value {
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn sealed_secret_opens_with_the_repo_key() {
        let secret = SecretKey::generate(&mut OsRng);
        let public = BASE64.encode(secret.public_key().as_bytes());

        let sealed = seal_secret(&public, "alice").unwrap();
        let opened = secret.unseal(&BASE64.decode(sealed).unwrap()).unwrap();
        assert_eq!(opened, b"alice");
    }

    #[test]
    fn short_public_key_is_rejected() {
        let err = seal_secret(&BASE64.encode([1u8; 16]), "alice").unwrap_err();
        assert!(matches!(err, LeetSyncError::Crypto(_)));
    }

    #[test]
    fn paths_are_built_under_the_repo() {
        assert_eq!(
            contents_path("alice/progress", "/dsa/leetcode_stats.md"),
            "repos/alice/progress/contents/dsa/leetcode_stats.md"
        );
        assert_eq!(
            secret_path("alice/progress", "LEETCODE_USERNAME"),
            "repos/alice/progress/actions/secrets/LEETCODE_USERNAME"
        );
    }

    #[test]
    fn api_base_without_trailing_slash_keeps_its_prefix() {
        let mut config = Config::get();
        config.urls.github_api = "https://ghe.example.com/api/v3".into();
        let client = GithubClient::new(&config, "token").unwrap();

        assert_eq!(
            client.url("user").unwrap().as_str(),
            "https://ghe.example.com/api/v3/user"
        );
    }

    #[test]
    fn new_repository_omits_missing_homepage() {
        let repo = NewRepository {
            name: "leetcode-progress".into(),
            description: "LeetCode Progress Tracker".into(),
            homepage: None,
            has_wiki: false,
            has_issues: true,
            auto_init: true,
        };
        let body = serde_json::to_value(&repo).unwrap();
        assert!(body.get("homepage").is_none());
        assert_eq!(body["auto_init"], true);
    }

    #[test]
    fn directory_listing_and_file_entries_are_told_apart() {
        let dir: ContentsResponse = serde_json::from_str(r#"[{"name": ".gitkeep"}]"#).unwrap();
        assert!(matches!(dir, ContentsResponse::Directory(_)));

        let file: ContentsResponse =
            serde_json::from_str(r#"{"sha": "abc123", "type": "file", "name": "x.md"}"#).unwrap();
        assert!(matches!(file, ContentsResponse::Entry { ref sha, .. } if sha == "abc123"));
    }

    #[test]
    fn missing_contents_are_none() {
        let (url, server) = serve_once("404 Not Found", r#"{"message": "Not Found"}"#);
        let found = client_for(&url)
            .contents("alice/progress", "dsa/leetcode_stats.md")
            .unwrap();
        let request = server.join().unwrap();

        assert_eq!(found, None);
        assert!(request.starts_with("GET /repos/alice/progress/contents/dsa/leetcode_stats.md "));
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer ghp_test"));
    }

    #[test]
    fn file_entry_carries_its_sha() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"type": "file", "sha": "3d21ec5", "name": "leetcode_stats.md"}"#,
        );
        let found = client_for(&url)
            .contents("alice/progress", "dsa/leetcode_stats.md")
            .unwrap();
        server.join().unwrap();

        assert_eq!(
            found,
            Some(Contents::File {
                sha: "3d21ec5".into()
            })
        );
    }

    #[test]
    fn put_file_sends_encoded_content_and_sha() {
        let (url, server) = serve_once("200 OK", r#"{"content": {}}"#);
        let change = FileChange {
            message: "Update LeetCode stats".into(),
            content: "# LeetCode Stats\n".into(),
            sha: Some("3d21ec5".into()),
        };
        client_for(&url)
            .put_file("alice/progress", "dsa/leetcode_stats.md", &change)
            .unwrap();
        let request = server.join().unwrap();

        assert!(request.starts_with("PUT /repos/alice/progress/contents/dsa/leetcode_stats.md "));
        assert_eq!(
            request_body(&request),
            json!({
                "message": "Update LeetCode stats",
                "content": BASE64.encode("# LeetCode Stats\n"),
                "sha": "3d21ec5"
            })
        );
    }

    #[test]
    fn new_file_is_put_without_a_sha() {
        let body = serde_json::to_value(PutContents {
            message: "Add dsa directory",
            content: BASE64.encode(""),
            sha: None,
        })
        .unwrap();

        assert_eq!(body, json!({ "message": "Add dsa directory", "content": "" }));
    }

    #[test]
    fn rejected_put_surfaces_github_message() {
        let (url, server) = serve_once(
            "422 Unprocessable Entity",
            r#"{"message": "Invalid request. \"sha\" wasn't supplied."}"#,
        );
        let change = FileChange {
            message: "Update LeetCode stats".into(),
            content: "x".into(),
            sha: None,
        };
        let err = client_for(&url)
            .put_file("alice/progress", "dsa/leetcode_stats.md", &change)
            .unwrap_err();
        server.join().unwrap();

        assert!(matches!(
            err,
            LeetSyncError::Remote(ref msg) if msg == "422 Invalid request. \"sha\" wasn't supplied."
        ));
    }

    #[test]
    fn error_body_without_message_is_kept_raw() {
        let parsed = remote_error(StatusCode::FORBIDDEN, r#"{"message": "Resource not accessible"}"#);
        assert_eq!(parsed.to_string(), "GitHub API error: 403 Resource not accessible");

        let raw = remote_error(StatusCode::BAD_GATEWAY, "upstream timed out");
        assert_eq!(raw.to_string(), "GitHub API error: 502 upstream timed out");
    }
}
