/// One-shot flash messages carried in a cookie
///
/// A redirect sets the cookie; the next rendered page takes it and clears it.
use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Serialize;

const FLASH_COOKIE: &str = "flash";

/// Severity, used as the alert style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Danger,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Danger => "danger",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashKind::Success),
            "danger" => Some(FlashKind::Danger),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    #[serde(rename = "type")]
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Danger,
            message: message.into(),
        }
    }

    /// Cookie value: `{kind}.{base64url(message)}`
    fn encode(&self) -> String {
        format!(
            "{}.{}",
            self.kind.as_str(),
            URL_SAFE_NO_PAD.encode(self.message.as_bytes())
        )
    }

    fn decode(value: &str) -> Option<Self> {
        let (kind, message) = value.split_once('.')?;
        let bytes = URL_SAFE_NO_PAD.decode(message).ok()?;
        Some(Self {
            kind: FlashKind::parse(kind)?,
            message: String::from_utf8(bytes).ok()?,
        })
    }

    /// Attach this message to the outgoing response
    pub fn set(self, jar: CookieJar) -> CookieJar {
        jar.add(
            Cookie::build((FLASH_COOKIE, self.encode()))
                .path("/")
                .http_only(true)
                .build(),
        )
    }

    /// Read the pending message, clearing it from the browser
    pub fn take(jar: CookieJar) -> (CookieJar, Option<Self>) {
        let flash = match jar.get(FLASH_COOKIE) {
            Some(cookie) => Self::decode(cookie.value()),
            None => return (jar, None),
        };

        let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/").build());
        (jar, flash)
    }
}
