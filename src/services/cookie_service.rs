/// Look up `name` in a `document.cookie` style string (`a=1; b=2`).
/// Returns the URL-decoded value of the first exact match.
pub fn get_cookie(cookies: &str, name: &str) -> Option<String> {
    if cookies.trim().is_empty() {
        return None;
    }

    let prefix = format!("{}=", name);
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .map(|value| match urlencoding::decode(value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value.to_string(),
        })
}

/// The cookie string of the hosting document. Looked up on every request,
/// the way the page reads `document.cookie` at send time.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    raw: String,
}

impl CookieJar {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        get_cookie(&self.raw, name)
    }
}
