//! Request assembly: path expansion, query encoding, body and media
//! framing. Nothing here touches the network.

use std::collections::BTreeMap;
use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};
use crate::media::Media;
use crate::options::Options;
use crate::wire::{Encoded, StringEncoded};

const JSON_CONTENT_TYPE: &str = "application/json";
const MULTIPART_BOUNDARY: &str = "discogen_media_boundary";

/// One API call before it is sent.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    path: String,
    upload_path: Option<String>,
    path_params: Vec<(String, String)>,
    query: BTreeMap<String, Vec<String>>,
    body: Option<serde_json::Value>,
    media: Option<Media>,
}

/// A request resolved against a base URL, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    /// HTTP verb.
    pub method: Method,
    /// Absolute URL including the query.
    pub url: Url,
    /// `Content-Type` header, when there is a body.
    pub content_type: Option<String>,
    /// Encoded body bytes.
    pub body: Option<Vec<u8>>,
}

impl Prepared {
    /// Body size in bytes, zero without a body.
    pub fn content_length(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }

    /// Every value sent for `key`, in order.
    pub fn query_values(&self, key: &str) -> Vec<String> {
        self.url
            .query_pairs()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .collect()
    }
}

impl Request {
    /// A request for `path` (relative to the API base URL), asking for JSON.
    pub fn new(method: &str, path: &str) -> Self {
        let mut query = BTreeMap::new();
        query.insert("alt".to_string(), vec!["json".to_string()]);
        Self {
            method: method.to_string(),
            path: path.to_string(),
            upload_path: None,
            path_params: Vec::new(),
            query,
            body: None,
            media: None,
        }
    }

    /// Substitute `{name}` (cleaned) or `{+name}` (verbatim) in the path.
    pub fn path_param(&mut self, name: &str, value: impl Display) {
        self.path_params.push((name.to_string(), value.to_string()));
    }

    /// Replace every value of `key`.
    pub fn set_query(&mut self, key: &str, value: impl Display) {
        self.query.insert(key.to_string(), vec![value.to_string()]);
    }

    /// Append a value to `key`.
    pub fn add_query(&mut self, key: &str, value: impl Display) {
        self.query
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Copy every optional parameter into the query, replacing earlier values.
    pub fn apply_options(&mut self, opts: &Options) {
        for (key, values) in opts.iter() {
            self.query.insert(key.to_string(), values.to_vec());
        }
    }

    /// Serialize `body` as the JSON request body.
    pub fn json_body<T: Serialize + ?Sized>(&mut self, body: &T) -> Result<()> {
        self.body = Some(serde_json::to_value(body).map_err(Error::Encode)?);
        Ok(())
    }

    /// JSON body whose integers are carried as strings.
    pub fn wire_body<T: StringEncoded>(&mut self, body: &T) -> Result<()> {
        self.json_body(&Encoded(body))
    }

    /// Path of the simple upload endpoint, used only when media is attached.
    pub fn upload_path(&mut self, path: &str) {
        self.upload_path = Some(path.to_string());
    }

    /// Attach upload content.
    pub fn media(&mut self, media: Media) {
        self.media = Some(media);
    }

    /// Resolve the request against `base_url` and encode its body,
    /// wrapping JSON as `{"data": ...}` when `data_wrapper` is set.
    pub fn prepare(&self, base_url: &str, data_wrapper: bool) -> Result<Prepared> {
        let method = Method::from_bytes(self.method.as_bytes())
            .map_err(|_| Error::Method(self.method.clone()))?;

        let json = match &self.body {
            Some(value) if data_wrapper => Some(serde_json::json!({ "data": value })),
            Some(value) => Some(value.clone()),
            None => None,
        };
        let json = json
            .map(|v| serde_json::to_vec(&v).map_err(Error::Encode))
            .transpose()?;

        let mut query = self.query.clone();
        let (mut url, content_type, body) = match (&self.media, json) {
            (None, json) => {
                let url = self.resolve(base_url, &self.path)?;
                let content_type = json.as_ref().map(|_| JSON_CONTENT_TYPE.to_string());
                (url, content_type, json)
            }
            (Some(media), None) => {
                query.insert("uploadType".to_string(), vec!["media".to_string()]);
                (
                    self.upload_url(base_url)?,
                    Some(media.content_type().to_string()),
                    Some(media.bytes().to_vec()),
                )
            }
            (Some(media), Some(json)) => {
                query.insert("uploadType".to_string(), vec!["multipart".to_string()]);
                (
                    self.upload_url(base_url)?,
                    Some(format!("multipart/related; boundary={MULTIPART_BOUNDARY}")),
                    Some(multipart_related(&json, media)),
                )
            }
        };

        {
            let mut pairs = url.query_pairs_mut();
            for (key, values) in &query {
                for value in values {
                    pairs.append_pair(key, value);
                }
            }
        }

        Ok(Prepared {
            method,
            url,
            content_type,
            body,
        })
    }

    fn upload_url(&self, base_url: &str) -> Result<Url> {
        if let Some(upload_path) = &self.upload_path {
            return self.resolve(base_url, upload_path);
        }
        let mut base = parse(base_url)?;
        let upload_base = format!("/upload{}", base.path());
        base.set_path(&upload_base);
        self.resolve(base.as_str(), &self.path)
    }

    fn resolve(&self, base_url: &str, template: &str) -> Result<Url> {
        let mut path = self.expand(template);
        // A leading `name:` would otherwise parse as a URL scheme.
        if let Some(colon) = path.find(':')
            && !path[..colon].contains('/')
        {
            path.insert_str(0, "./");
        }
        resolve_relative(base_url, &path)
    }

    fn expand(&self, template: &str) -> String {
        let mut path = template.to_string();
        for (name, value) in &self.path_params {
            path = path.replace(&format!("{{+{name}}}"), value);
            path = path.replace(&format!("{{{name}}}"), &clean_path_string(value));
        }
        path
    }
}

fn parse(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|source| Error::Url {
        url: url.to_string(),
        source,
    })
}

/// Resolve `rel` against `base` like a browser resolves a link.
pub fn resolve_relative(base: &str, rel: &str) -> Result<Url> {
    parse(base)?.join(rel).map_err(|source| Error::Url {
        url: format!("{base} + {rel}"),
        source,
    })
}

/// Drop every character outside `0x30..=0x7a` so a value can't escape
/// its path segment.
pub fn clean_path_string(s: &str) -> String {
    s.chars().filter(|c| ('\x30'..='\x7a').contains(c)).collect()
}

fn multipart_related(json: &[u8], media: &Media) -> Vec<u8> {
    let mut body = Vec::with_capacity(json.len() + media.len() + 256);
    body.extend_from_slice(
        format!("--{MULTIPART_BOUNDARY}\r\nContent-Type: {JSON_CONTENT_TYPE}\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(json);
    body.extend_from_slice(
        format!(
            "\r\n--{MULTIPART_BOUNDARY}\r\nContent-Type: {}\r\n\r\n",
            media.content_type()
        )
        .as_bytes(),
    );
    body.extend_from_slice(media.bytes());
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.googleapis.com/tasks/v1/";

    #[test]
    fn test_alt_json_and_path_resolution() {
        let mut req = Request::new("GET", "lists/{tasklist}/tasks");
        req.path_param("tasklist", "my list/../x");
        let prepared = req.prepare(BASE, false).unwrap();
        assert_eq!(prepared.method, Method::GET);
        assert_eq!(prepared.url.path(), "/tasks/v1/lists/mylistx/tasks");
        assert_eq!(prepared.query_values("alt"), vec!["json"]);
        assert!(prepared.body.is_none());
        assert!(prepared.content_type.is_none());
    }

    #[test]
    fn test_reserved_expansion_keeps_slashes() {
        let mut req = Request::new("GET", "v1/{+name}");
        req.path_param("name", "projects/p1/locations/l1");
        let prepared = req.prepare("https://example.googleapis.com/", false).unwrap();
        assert_eq!(prepared.url.path(), "/v1/projects/p1/locations/l1");
    }

    #[test]
    fn test_leading_colon_segment_is_not_a_scheme() {
        let mut req = Request::new("POST", "{project}:run");
        req.path_param("project", "demo");
        let prepared = req.prepare(BASE, false).unwrap();
        assert_eq!(prepared.url.path(), "/tasks/v1/demo:run");
    }

    #[test]
    fn test_optional_set_twice_sends_second_value() {
        let mut opts = Options::new();
        opts.set("maxResults", 10);
        opts.set("maxResults", 25);
        let mut req = Request::new("GET", "lists");
        req.apply_options(&opts);
        let prepared = req.prepare(BASE, false).unwrap();
        assert_eq!(prepared.query_values("maxResults"), vec!["25"]);
    }

    #[test]
    fn test_repeated_query_gets_one_entry_per_value() {
        let mut req = Request::new("GET", "lists");
        for v in ["x", "y"] {
            req.add_query("ids", v);
        }
        let prepared = req.prepare(BASE, false).unwrap();
        assert_eq!(prepared.query_values("ids"), vec!["x", "y"]);
        assert!(prepared.url.as_str().contains("ids=x&ids=y"));
    }

    #[test]
    fn test_json_body_with_data_wrapper() {
        let mut req = Request::new("POST", "lists");
        req.json_body(&serde_json::json!({ "title": "a" })).unwrap();

        let plain = req.prepare(BASE, false).unwrap();
        assert_eq!(plain.content_type.as_deref(), Some("application/json"));
        assert_eq!(plain.body.as_deref(), Some(&br#"{"title":"a"}"#[..]));

        let wrapped = req.prepare(BASE, true).unwrap();
        assert_eq!(wrapped.body.as_deref(), Some(&br#"{"data":{"title":"a"}}"#[..]));
        assert_eq!(wrapped.content_length(), 22);
    }

    #[test]
    fn test_media_only_upload_prefixes_base_path() {
        let mut req = Request::new("POST", "files");
        req.media(Media::new(b"abc".to_vec(), "text/plain"));
        let prepared = req.prepare("https://www.googleapis.com/drive/v2/", false).unwrap();
        assert_eq!(prepared.url.path(), "/upload/drive/v2/files");
        assert_eq!(prepared.query_values("uploadType"), vec!["media"]);
        assert_eq!(prepared.content_type.as_deref(), Some("text/plain"));
        assert_eq!(prepared.content_length(), 3);
    }

    #[test]
    fn test_multipart_upload_uses_upload_path() {
        let mut req = Request::new("POST", "files");
        req.upload_path("/upload/drive/v2/files");
        req.json_body(&serde_json::json!({ "title": "t" })).unwrap();
        req.media(Media::new(b"payload".to_vec(), "image/png"));
        let prepared = req.prepare("https://www.googleapis.com/drive/v2/", false).unwrap();
        assert_eq!(prepared.url.path(), "/upload/drive/v2/files");
        assert_eq!(prepared.query_values("uploadType"), vec!["multipart"]);
        assert!(
            prepared
                .content_type
                .as_deref()
                .unwrap()
                .starts_with("multipart/related; boundary=")
        );
        let body = String::from_utf8(prepared.body.unwrap()).unwrap();
        assert!(body.contains("Content-Type: application/json\r\n\r\n{\"title\":\"t\"}"));
        assert!(body.contains("Content-Type: image/png\r\n\r\npayload"));
        assert!(body.ends_with("--\r\n"));
    }

    #[test]
    fn test_upload_path_ignored_without_media() {
        let mut req = Request::new("POST", "files");
        req.upload_path("/upload/drive/v2/files");
        let prepared = req.prepare("https://www.googleapis.com/drive/v2/", false).unwrap();
        assert_eq!(prepared.url.path(), "/drive/v2/files");
        assert!(prepared.query_values("uploadType").is_empty());
    }

    #[test]
    fn test_invalid_method_and_base() {
        let err = Request::new("GE T", "x").prepare(BASE, false).unwrap_err();
        assert!(matches!(err, Error::Method(_)));
        let err = Request::new("GET", "x").prepare("not a url", false).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn test_clean_path_string() {
        assert_eq!(clean_path_string("a b/c-d_e.f"), "abcd_ef");
        assert_eq!(clean_path_string("Zz09:@"), "Zz09:@");
    }
}
