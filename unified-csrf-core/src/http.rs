// HTTP request and response types

use crate::Extensions;
use std::collections::HashMap;

/// HTTP request wrapper
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Request-scoped typed state shared between middleware and handlers
    pub extensions: Extensions,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
            extensions: Extensions::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a cookie to the `Cookie` header
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        let pair = format!("{}={}", name, value);
        let existing = self
            .headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case("Cookie"))
            .cloned();

        match existing {
            Some(key) => {
                if let Some(header) = self.headers.get_mut(&key) {
                    header.push_str("; ");
                    header.push_str(&pair);
                }
            }
            None => {
                self.headers.insert("Cookie".to_string(), pair);
            }
        }
        self
    }

    /// Get a header value, ignoring ASCII case of the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    /// Parse the `Cookie` header into name/value pairs
    ///
    /// When a name appears more than once the first occurrence wins.
    pub fn cookies(&self) -> HashMap<String, String> {
        let mut cookies = HashMap::new();
        let Some(header) = self.header("Cookie") else {
            return cookies;
        };

        for pair in header.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                cookies
                    .entry(name.trim().to_string())
                    .or_insert_with(|| value.trim().to_string());
            }
        }

        cookies
    }

    /// Get a single cookie value by name
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies().remove(name)
    }

    /// Get a form field from a urlencoded or JSON body
    pub fn form_param(&self, name: &str) -> Option<String> {
        if let Ok(json) = serde_json::from_slice::<serde_json::Value>(&self.body) {
            if let Some(value) = json.get(name) {
                return value.as_str().map(|s| s.to_string());
            }
        }

        if let Ok(form_data) = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&self.body)
        {
            return form_data
                .into_iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value);
        }

        None
    }
}

/// HTTP response wrapper
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    /// `Set-Cookie` values, kept apart from `headers` since the header repeats
    pub cookies: Vec<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            cookies: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn unprocessable_entity() -> Self {
        Self::new(422)
    }

    /// HTML response with the matching content type
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header(
                "Content-Type".to_string(),
                "text/html; charset=utf-8".to_string(),
            )
            .with_body(body.into().into_bytes())
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Append a `Set-Cookie` directive
    pub fn append_cookie(&mut self, cookie: String) {
        self.cookies.push(cookie);
    }

    /// Find the `Set-Cookie` directive for a cookie name
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| {
                c.split_once('=')
                    .is_some_and(|(cookie_name, _)| cookie_name == name)
            })
            .map(String::as_str)
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
