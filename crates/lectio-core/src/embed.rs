//! Embed content normalization.
//!
//! Turns free-form user input for an "embed" field (a raw platform URL or
//! hand-pasted third-party markup) into markup that is safe to render and
//! likely to actually display the intended content.
//!
//! The pipeline has one hard rule: conversion helpers never fail. Every
//! extraction failure degrades to an HTML comment marker followed by the
//! original input, so a caller always gets a string back and user input is
//! never lost. [`EmbedNormalizer::validate`] is the single point where bad
//! input is rejected and reported; it runs before any embed field is
//! persisted.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Third-party platform recognized by the URL matcher table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Canva,
    YouTube,
    Vimeo,
    GoogleSlides,
    GoogleDrive,
    Instagram,
    Twitter,
}

impl Platform {
    /// Human-readable platform name for UI messages.
    pub fn name(self) -> &'static str {
        match self {
            Platform::Canva => "Canva",
            Platform::YouTube => "YouTube",
            Platform::Vimeo => "Vimeo",
            Platform::GoogleSlides => "Google Slides",
            Platform::GoogleDrive => "Google Drive",
            Platform::Instagram => "Instagram",
            Platform::Twitter => "X (Twitter)",
        }
    }
}

/// Classification of one piece of embed-field input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedClass {
    /// Empty or whitespace-only input.
    Empty,
    /// Already contains an embed tag signature; passed through untouched.
    AlreadyMarkup,
    /// A URL on a platform we know how to convert.
    RecognizedPlatformUrl(Platform),
    /// A URL on a platform with no conversion rule.
    UnrecognizedUrl,
    /// Neither markup nor a URL; passed through untouched.
    PlainText,
}

/// Broad input kind reported by [`EmbedNormalizer::describe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedKind {
    Empty,
    Markup,
    Url,
    Text,
}

/// Read-only classification report for UI preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedInfo {
    pub kind: EmbedKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub convertible: bool,
    pub message: String,
}

/// Outcome of the validate boundary.
#[derive(Debug, Clone)]
pub struct EmbedValidation {
    pub ok: bool,
    /// Sanitized markup ready to persist; empty on failure.
    pub cleaned: String,
    /// Failure reason; empty on success.
    pub error: String,
}

/// Default ordered platform-matcher table: (domain substring, platform).
/// First match wins, so the Slides entry must precede the Drive entry.
const DEFAULT_MATCHERS: &[(&str, Platform)] = &[
    ("canva.com", Platform::Canva),
    ("youtube.com", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
    ("vimeo.com", Platform::Vimeo),
    ("docs.google.com/presentation", Platform::GoogleSlides),
    ("drive.google.com", Platform::GoogleDrive),
    ("instagram.com", Platform::Instagram),
    ("twitter.com", Platform::Twitter),
    ("x.com", Platform::Twitter),
];

/// Default domain substrings permitted in iframe/script `src` attributes.
const DEFAULT_ALLOWED_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
    "vimeo.com",
    "player.vimeo.com",
    "canva.com",
    "docs.google.com",
    "drive.google.com",
    "slides.com",
    "prezi.com",
    "slideshare.net",
    "instagram.com",
    "twitter.com",
    "x.com",
    "platform.twitter.com",
    "facebook.com",
    "tiktok.com",
];

/// Embed classifier, converter and validator.
///
/// Matcher and allow-list tables are injected at construction so they are
/// configuration data, not module state; [`EmbedNormalizer::default`] wires
/// in the built-in tables.
pub struct EmbedNormalizer {
    matchers: Vec<(String, Platform)>,
    allowed_domains: Vec<String>,
}

impl Default for EmbedNormalizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_MATCHERS
                .iter()
                .map(|(d, p)| (d.to_string(), *p))
                .collect(),
            DEFAULT_ALLOWED_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        )
    }
}

impl EmbedNormalizer {
    /// Create a normalizer with explicit matcher and allow-list tables.
    pub fn new(matchers: Vec<(String, Platform)>, allowed_domains: Vec<String>) -> Self {
        Self {
            matchers,
            allowed_domains,
        }
    }

    /// Classify input. Total and deterministic: every string gets exactly
    /// one classification.
    pub fn classify(&self, input: &str) -> EmbedClass {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return EmbedClass::Empty;
        }
        if trimmed.contains("<iframe") || trimmed.contains("<script") || trimmed.contains("<blockquote")
        {
            return EmbedClass::AlreadyMarkup;
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            for (domain, platform) in &self.matchers {
                if trimmed.contains(domain.as_str()) {
                    return EmbedClass::RecognizedPlatformUrl(*platform);
                }
            }
            return EmbedClass::UnrecognizedUrl;
        }
        EmbedClass::PlainText
    }

    /// Convert a recognized platform URL to embed markup.
    ///
    /// Never fails: markup, plain text and empty input pass through
    /// unchanged, and extraction failures return an HTML comment marker
    /// plus the original URL.
    pub fn convert(&self, input: &str) -> String {
        let trimmed = input.trim();
        match self.classify(input) {
            EmbedClass::Empty => input.to_string(),
            EmbedClass::AlreadyMarkup | EmbedClass::PlainText => trimmed.to_string(),
            EmbedClass::RecognizedPlatformUrl(platform) => match platform {
                Platform::Canva => convert_canva(trimmed),
                Platform::YouTube => convert_youtube(trimmed),
                Platform::Vimeo => convert_vimeo(trimmed),
                Platform::GoogleSlides => convert_google_slides(trimmed),
                Platform::GoogleDrive => convert_google_drive(trimmed),
                Platform::Instagram => convert_instagram(trimmed),
                Platform::Twitter => convert_twitter(trimmed),
            },
            EmbedClass::UnrecognizedUrl => {
                warn!(
                    subsystem = "embed",
                    component = "normalizer",
                    op = "convert",
                    "URL not supported for automatic conversion: {}",
                    trimmed
                );
                convert_generic(trimmed)
            }
        }
    }

    /// Platform-specific post-processing applied before persistence.
    ///
    /// Canva markup loses inline vertical margins and attribution links;
    /// Google Slides markup loses script elements; everything else passes
    /// through unchanged.
    pub fn sanitize(&self, markup: &str) -> String {
        if markup.contains("canva.com") {
            sanitize_canva(markup)
        } else if markup.contains("docs.google.com/presentation") {
            strip_scripts(markup)
        } else {
            markup.to_string()
        }
    }

    /// Validate (and convert, and sanitize) raw embed-field input.
    ///
    /// The single fail/succeed boundary of the pipeline. Contract, in
    /// order: reject empty input; convert URLs; enumerate iframes and
    /// check every `src` against the allow-list (scripts are checked
    /// instead when no iframe is present); sanitize and succeed.
    pub fn validate(&self, raw: &str) -> EmbedValidation {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return EmbedValidation {
                ok: false,
                cleaned: String::new(),
                error: "embed code is empty".to_string(),
            };
        }

        let converted = self.convert(trimmed);
        if converted != trimmed {
            let embed_info = self.describe(trimmed);
            info!(
                subsystem = "embed",
                component = "normalizer",
                op = "validate",
                platform = embed_info.platform.as_deref().unwrap_or("unknown"),
                "URL converted to embed markup"
            );
        }

        let iframe_srcs = extract_tag_srcs(&converted, "iframe");
        if iframe_srcs.is_empty() {
            // Social-media embeds carry scripts instead of iframes.
            let script_srcs = extract_tag_srcs(&converted, "script");
            if !has_tag(&converted, "script") {
                return EmbedValidation {
                    ok: false,
                    cleaned: String::new(),
                    error: "no valid iframe or script found".to_string(),
                };
            }
            for src in &script_srcs {
                if let Some(src) = src {
                    if !self.is_allowed(src) {
                        warn!(
                            subsystem = "embed",
                            component = "normalizer",
                            op = "validate",
                            "disallowed domain in script: {}",
                            src
                        );
                        return EmbedValidation {
                            ok: false,
                            cleaned: String::new(),
                            error: format!("disallowed domain in script: {}", src),
                        };
                    }
                }
            }
            return EmbedValidation {
                ok: true,
                cleaned: self.sanitize(&converted),
                error: String::new(),
            };
        }

        for src in &iframe_srcs {
            let src = match src {
                Some(s) if !s.is_empty() => s,
                _ => {
                    return EmbedValidation {
                        ok: false,
                        cleaned: String::new(),
                        error: "iframe missing src attribute".to_string(),
                    }
                }
            };
            if !self.is_allowed(src) {
                warn!(
                    subsystem = "embed",
                    component = "normalizer",
                    op = "validate",
                    "disallowed domain: {}",
                    src
                );
                return EmbedValidation {
                    ok: false,
                    cleaned: String::new(),
                    error: format!("disallowed domain: {}", src),
                };
            }
        }

        EmbedValidation {
            ok: true,
            cleaned: self.sanitize(&converted),
            error: String::new(),
        }
    }

    /// Pure classification report used for UI preview. Side-effect free;
    /// performs no conversion or validation.
    pub fn describe(&self, input: &str) -> EmbedInfo {
        match self.classify(input) {
            EmbedClass::Empty => EmbedInfo {
                kind: EmbedKind::Empty,
                platform: None,
                convertible: false,
                message: "content is empty".to_string(),
            },
            EmbedClass::AlreadyMarkup => EmbedInfo {
                kind: EmbedKind::Markup,
                platform: None,
                convertible: false,
                message: "already embed markup".to_string(),
            },
            EmbedClass::RecognizedPlatformUrl(platform) => EmbedInfo {
                kind: EmbedKind::Url,
                platform: Some(platform.name().to_string()),
                convertible: true,
                message: format!(
                    "{} URL detected; it will be converted to embed markup",
                    platform.name()
                ),
            },
            EmbedClass::UnrecognizedUrl => EmbedInfo {
                kind: EmbedKind::Url,
                platform: None,
                convertible: false,
                message: "URL not supported for automatic conversion".to_string(),
            },
            EmbedClass::PlainText => EmbedInfo {
                kind: EmbedKind::Text,
                platform: None,
                convertible: false,
                message: "not a URL or embed markup".to_string(),
            },
        }
    }

    fn is_allowed(&self, src: &str) -> bool {
        self.allowed_domains.iter().any(|d| src.contains(d.as_str()))
    }
}

// =============================================================================
// PLATFORM CONVERTERS
// =============================================================================

fn error_marker(reason: &str, url: &str) -> String {
    format!("<!-- Error: {} -->\n{}", reason, url)
}

fn convert_canva(url: &str) -> String {
    let pattern = Regex::new(r"/design/([^/]+)").unwrap();
    let design_id = match pattern.captures(url).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => {
            warn!(
                subsystem = "embed",
                component = "normalizer",
                platform = "canva",
                "could not extract Canva design id from: {}",
                url
            );
            return error_marker("invalid Canva URL", url);
        }
    };
    let embed_url = format!("https://www.canva.com/design/{}/view?embed", design_id);
    info!(
        subsystem = "embed",
        component = "normalizer",
        platform = "canva",
        op = "convert",
        "converted Canva URL: {}",
        design_id
    );
    format!(
        r#"<div style="position: relative; width: 100%; height: 0; padding-top: 56.2500%; padding-bottom: 0; box-shadow: 0 2px 8px 0 rgba(63,69,81,0.16); overflow: hidden; border-radius: 8px; will-change: transform;">
  <iframe loading="lazy" style="position: absolute; width: 100%; height: 100%; top: 0; left: 0; border: none; padding: 0; margin: 0;"
    src="{}" allowfullscreen="allowfullscreen" allow="fullscreen">
  </iframe>
</div>"#,
        embed_url
    )
}

/// Extract a YouTube video id, trying the four known URL shapes in fixed
/// order: `watch?v=`, `youtu.be/`, `/embed/`, `/v/`.
fn extract_youtube_id(url: &str) -> Option<String> {
    if url.contains("youtube.com/watch") {
        if let Some(query) = url.split('?').nth(1) {
            for pair in query.split('&') {
                if let Some(id) = pair.strip_prefix("v=") {
                    if !id.is_empty() {
                        return Some(id.to_string());
                    }
                }
            }
        }
    }
    for prefix in ["youtu.be/", "youtube.com/embed/", "youtube.com/v/"] {
        if let Some(pos) = url.find(prefix) {
            let rest = &url[pos + prefix.len()..];
            let id: String = rest
                .chars()
                .take_while(|c| *c != '?' && *c != '/' && *c != '&')
                .collect();
            if !id.is_empty() {
                return Some(id);
            }
        }
    }
    None
}

fn convert_youtube(url: &str) -> String {
    let video_id = match extract_youtube_id(url) {
        Some(id) => id,
        None => {
            warn!(
                subsystem = "embed",
                component = "normalizer",
                platform = "youtube",
                "could not extract YouTube video id from: {}",
                url
            );
            return error_marker("could not extract YouTube video id", url);
        }
    };
    // youtube-nocookie.com is the privacy-enhanced embed host.
    let embed_url = format!("https://www.youtube-nocookie.com/embed/{}", video_id);
    info!(
        subsystem = "embed",
        component = "normalizer",
        platform = "youtube",
        op = "convert",
        "converted YouTube URL: {}",
        video_id
    );
    format!(
        r#"<div style="position: relative; padding-bottom: 56.25%; height: 0; overflow: hidden;">
  <iframe style="position: absolute; top: 0; left: 0; width: 100%; height: 100%;"
    src="{}"
    title="YouTube video player"
    frameborder="0"
    allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share"
    allowfullscreen>
  </iframe>
</div>"#,
        embed_url
    )
}

fn convert_vimeo(url: &str) -> String {
    let pattern = Regex::new(r"vimeo\.com/(\d+)").unwrap();
    let video_id = match pattern.captures(url).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => return error_marker("invalid Vimeo URL", url),
    };
    let embed_url = format!("https://player.vimeo.com/video/{}", video_id);
    info!(
        subsystem = "embed",
        component = "normalizer",
        platform = "vimeo",
        op = "convert",
        "converted Vimeo URL: {}",
        video_id
    );
    format!(
        r#"<iframe src="{}" width="640" height="360"
    frameborder="0" allow="autoplay; fullscreen; picture-in-picture" allowfullscreen>
</iframe>"#,
        embed_url
    )
}

fn convert_google_slides(url: &str) -> String {
    let pattern = Regex::new(r"/presentation/d/([\w-]+)").unwrap();
    let presentation_id = match pattern.captures(url).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => return error_marker("invalid Google Slides URL", url),
    };
    let embed_url = format!(
        "https://docs.google.com/presentation/d/{}/embed?start=false&loop=false&delayms=3000",
        presentation_id
    );
    info!(
        subsystem = "embed",
        component = "normalizer",
        platform = "google_slides",
        op = "convert",
        "converted Google Slides URL: {}",
        presentation_id
    );
    format!(
        r#"<div style="position: relative; width: 100%; padding-bottom: 56.25%; height: 0; overflow: hidden;">
  <iframe src="{}"
    style="position: absolute; top: 0; left: 0; width: 100%; height: 100%; border: none;"
    frameborder="0"
    allowfullscreen="true"
    mozallowfullscreen="true"
    webkitallowfullscreen="true">
  </iframe>
</div>"#,
        embed_url
    )
}

fn convert_google_drive(url: &str) -> String {
    let path_pattern = Regex::new(r"/file/d/([\w-]+)").unwrap();
    let query_pattern = Regex::new(r"id=([\w-]+)").unwrap();
    let file_id = match path_pattern
        .captures(url)
        .or_else(|| query_pattern.captures(url))
        .and_then(|c| c.get(1))
    {
        Some(m) => m.as_str(),
        None => return error_marker("invalid Google Drive URL", url),
    };
    let embed_url = format!("https://drive.google.com/file/d/{}/preview", file_id);
    info!(
        subsystem = "embed",
        component = "normalizer",
        platform = "google_drive",
        op = "convert",
        "converted Google Drive URL: {}",
        file_id
    );
    format!(
        r#"<iframe src="{}"
    width="640" height="480" allow="autoplay" allowfullscreen>
</iframe>"#,
        embed_url
    )
}

fn convert_instagram(url: &str) -> String {
    if !url.contains("/p/") && !url.contains("/reel/") {
        return error_marker("Instagram URL must contain /p/ or /reel/", url);
    }
    info!(
        subsystem = "embed",
        component = "normalizer",
        platform = "instagram",
        op = "convert",
        "converted Instagram URL"
    );
    format!(
        r#"<blockquote class="instagram-media" data-instgrm-permalink="{}"
    data-instgrm-version="14" style="max-width:540px; min-width:326px; width:100%;">
</blockquote>
<script async src="//www.instagram.com/embed.js"></script>"#,
        url
    )
}

fn convert_twitter(url: &str) -> String {
    if !url.contains("/status/") {
        warn!(
            subsystem = "embed",
            component = "normalizer",
            platform = "twitter",
            "Twitter URL without /status/: {}",
            url
        );
        return error_marker("Twitter URL must contain /status/", url);
    }
    info!(
        subsystem = "embed",
        component = "normalizer",
        platform = "twitter",
        op = "convert",
        "converted Twitter/X URL"
    );
    // The platform widget script turns the blockquote into the rendered tweet.
    format!(
        r#"<blockquote class="twitter-tweet" data-dnt="true" data-theme="light">
    <a href="{}"></a>
</blockquote>
<script async src="https://platform.twitter.com/widgets.js" charset="utf-8"></script>"#,
        url
    )
}

/// Degraded fallback for URLs with no conversion rule: a visible warning
/// banner plus a best-effort generic iframe. The banner tells the reader
/// the embed may not render.
fn convert_generic(url: &str) -> String {
    format!(
        r#"<!-- WARNING: this URL may not allow embeds -->
<div style="padding: 1rem; background: #fff3cd; border: 1px solid #ffc107; border-radius: 8px; margin: 1rem 0;">
    <p style="margin: 0; color: #856404;">
        <strong>Unsupported platform:</strong> this URL may not allow embeds.
    </p>
    <p style="margin: 0.5rem 0 0 0; font-size: 0.9rem; color: #856404;">
        URL: <a href="{url}" target="_blank">{url}</a>
    </p>
</div>
<iframe src="{url}" width="100%" height="500" frameborder="0" allowfullscreen></iframe>"#,
        url = url
    )
}

// =============================================================================
// MARKUP SCANNING
// =============================================================================

/// Whether the markup contains at least one opening tag of the given name.
fn has_tag(markup: &str, tag: &str) -> bool {
    let pattern = Regex::new(&format!(r"(?i)<{}\b", regex::escape(tag))).unwrap();
    pattern.is_match(markup)
}

/// Extract the `src` attribute of every `<tag ...>` element in document
/// order. `None` entries are tags without a `src` attribute.
fn extract_tag_srcs(markup: &str, tag: &str) -> Vec<Option<String>> {
    let tag_pattern = Regex::new(&format!(r"(?is)<{}\b[^>]*>", regex::escape(tag))).unwrap();
    let src_pattern = Regex::new(r#"(?i)src\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();

    tag_pattern
        .find_iter(markup)
        .map(|m| {
            src_pattern.captures(m.as_str()).map(|c| {
                c.get(1)
                    .or_else(|| c.get(2))
                    .map(|g| g.as_str().to_string())
                    .unwrap_or_default()
            })
        })
        .collect()
}

/// Clean Canva markup: drop vertical margins from the responsive wrapper
/// and remove attribution links (with their trailing text).
fn sanitize_canva(markup: &str) -> String {
    let style_pattern =
        Regex::new(r#"(?is)style\s*=\s*"([^"]*position:\s*relative[^"]*)""#).unwrap();
    let margin_pattern = Regex::new(r"(?i)margin-(?:top|bottom):\s*[\d.]+em;?\s*").unwrap();

    // Only the first position:relative wrapper carries the margins.
    let mut replaced_first = false;
    let cleaned = style_pattern.replace(markup, |caps: &regex::Captures| {
        if replaced_first {
            return caps[0].to_string();
        }
        replaced_first = true;
        let style = margin_pattern.replace_all(&caps[1], "");
        format!(r#"style="{}""#, style.trim())
    });

    let attribution_pattern =
        Regex::new(r#"(?is)<a\b[^>]*href\s*=\s*["'][^"']*canva\.com[^"']*["'][^>]*>.*?</a>[^<]*"#)
            .unwrap();
    attribution_pattern.replace_all(&cleaned, "").to_string()
}

/// Remove every script element from the markup.
fn strip_scripts(markup: &str) -> String {
    let script_pattern = Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap();
    script_pattern.replace_all(markup, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> EmbedNormalizer {
        EmbedNormalizer::default()
    }

    #[test]
    fn test_classify_empty_and_whitespace() {
        let n = normalizer();
        assert_eq!(n.classify(""), EmbedClass::Empty);
        assert_eq!(n.classify("   \n\t "), EmbedClass::Empty);
    }

    #[test]
    fn test_classify_markup_signatures() {
        let n = normalizer();
        assert_eq!(
            n.classify(r#"<iframe src="https://example.com"></iframe>"#),
            EmbedClass::AlreadyMarkup
        );
        assert_eq!(
            n.classify(r#"<script src="https://platform.twitter.com/widgets.js"></script>"#),
            EmbedClass::AlreadyMarkup
        );
        assert_eq!(
            n.classify(r#"<blockquote class="twitter-tweet"></blockquote>"#),
            EmbedClass::AlreadyMarkup
        );
    }

    #[test]
    fn test_classify_platform_urls_first_match_wins() {
        let n = normalizer();
        assert_eq!(
            n.classify("https://www.canva.com/design/ABC/view"),
            EmbedClass::RecognizedPlatformUrl(Platform::Canva)
        );
        // A Slides URL also contains no drive.google.com substring, but the
        // table order still matters for docs.google.com vs drive.google.com.
        assert_eq!(
            n.classify("https://docs.google.com/presentation/d/xyz/edit"),
            EmbedClass::RecognizedPlatformUrl(Platform::GoogleSlides)
        );
        assert_eq!(
            n.classify("https://drive.google.com/file/d/xyz/view"),
            EmbedClass::RecognizedPlatformUrl(Platform::GoogleDrive)
        );
    }

    #[test]
    fn test_classify_unrecognized_and_plaintext() {
        let n = normalizer();
        assert_eq!(
            n.classify("https://example.com/video"),
            EmbedClass::UnrecognizedUrl
        );
        assert_eq!(n.classify("just some words"), EmbedClass::PlainText);
    }

    #[test]
    fn test_youtube_shape_invariance() {
        let n = normalizer();
        let shapes = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
        ];
        for shape in shapes {
            let markup = n.convert(shape);
            assert!(
                markup.contains("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ"),
                "shape {} did not produce the nocookie embed: {}",
                shape,
                markup
            );
        }
    }

    #[test]
    fn test_youtube_watch_with_extra_params() {
        let markup = normalizer().convert("https://www.youtube.com/watch?v=abc123&t=42s");
        assert!(markup.contains("youtube-nocookie.com/embed/abc123"));
    }

    #[test]
    fn test_canva_conversion() {
        let markup = normalizer().convert("https://www.canva.com/design/ABC123/view");
        assert!(markup.contains(r#"src="https://www.canva.com/design/ABC123/view?embed""#));
        assert!(markup.contains("padding-top: 56.2500%"));
    }

    #[test]
    fn test_vimeo_malformed_degrades_to_marker() {
        let markup = normalizer().convert("https://vimeo.com/notanumber");
        assert!(markup.contains("<!-- Error:"));
        assert!(markup.contains("https://vimeo.com/notanumber"));
    }

    #[test]
    fn test_google_drive_query_fallback() {
        let markup = normalizer().convert("https://drive.google.com/open?id=FILE_9-x");
        assert!(markup.contains("https://drive.google.com/file/d/FILE_9-x/preview"));
    }

    #[test]
    fn test_instagram_requires_post_path() {
        let n = normalizer();
        let ok = n.convert("https://www.instagram.com/p/Cxyz/");
        assert!(ok.contains("instagram-media"));
        assert!(ok.contains("embed.js"));

        let bad = n.convert("https://www.instagram.com/someuser/");
        assert!(bad.contains("<!-- Error:"));
    }

    #[test]
    fn test_twitter_requires_status_path() {
        let n = normalizer();
        let ok = n.convert("https://x.com/user/status/12345");
        assert!(ok.contains("twitter-tweet"));
        assert!(ok.contains("platform.twitter.com/widgets.js"));

        let bad = n.convert("https://x.com/user");
        assert!(bad.contains("<!-- Error:"));
    }

    #[test]
    fn test_unrecognized_url_banner_and_generic_iframe() {
        let n = normalizer();
        let markup = n.convert("https://example.com/video");
        assert!(markup.contains("Unsupported platform"));
        assert!(markup.contains(r#"<iframe src="https://example.com/video""#));

        let info = n.describe("https://example.com/video");
        assert!(!info.convertible);
        assert_eq!(info.kind, EmbedKind::Url);
    }

    #[test]
    fn test_sanitize_canva_strips_margins_and_attribution() {
        let markup = concat!(
            r#"<div style="position: relative; margin-top: 1.6em; margin-bottom: 0.9em; width: 100%;">"#,
            r#"<iframe src="https://www.canva.com/design/X/view?embed"></iframe>"#,
            r#"</div>"#,
            r#"<a href="https://www.canva.com/design/X/view" target="_blank">My design</a> by Someone"#,
        );
        let cleaned = EmbedNormalizer::default().sanitize(markup);
        assert!(!cleaned.contains("margin-top"));
        assert!(!cleaned.contains("margin-bottom"));
        assert!(!cleaned.contains("<a href"));
        assert!(!cleaned.contains("by Someone"));
        assert!(cleaned.contains("iframe"));
    }

    #[test]
    fn test_sanitize_google_slides_removes_scripts() {
        let markup = concat!(
            r#"<iframe src="https://docs.google.com/presentation/d/X/embed"></iframe>"#,
            r#"<script>alert("tracking")</script>"#,
        );
        let cleaned = EmbedNormalizer::default().sanitize(markup);
        assert!(!cleaned.contains("<script"));
        assert!(cleaned.contains("iframe"));
    }

    #[test]
    fn test_validate_empty_input() {
        let result = normalizer().validate("   ");
        assert!(!result.ok);
        assert_eq!(result.error, "embed code is empty");
    }

    #[test]
    fn test_validate_rejects_disallowed_iframe_domain() {
        let result =
            normalizer().validate(r#"<iframe src="https://evil.example.net/x"></iframe>"#);
        assert!(!result.ok);
        assert_eq!(result.error, "disallowed domain: https://evil.example.net/x");
    }

    #[test]
    fn test_validate_reports_first_offending_iframe() {
        let markup = concat!(
            r#"<iframe src="https://bad-one.test/a"></iframe>"#,
            r#"<iframe src="https://bad-two.test/b"></iframe>"#,
        );
        let result = normalizer().validate(markup);
        assert!(!result.ok);
        assert!(result.error.contains("bad-one.test"));
    }

    #[test]
    fn test_validate_rejects_iframe_without_src() {
        let result = normalizer().validate(r#"<iframe width="640"></iframe>"#);
        assert!(!result.ok);
        assert_eq!(result.error, "iframe missing src attribute");
    }

    #[test]
    fn test_validate_rejects_markup_with_neither_iframe_nor_script() {
        let result = normalizer().validate("<blockquote>quote only</blockquote>");
        assert!(!result.ok);
        assert_eq!(result.error, "no valid iframe or script found");
    }

    #[test]
    fn test_validate_script_domain_allowlist() {
        let n = normalizer();
        let ok = n.validate(concat!(
            r#"<blockquote class="twitter-tweet"><a href="https://x.com/u/status/1"></a></blockquote>"#,
            r#"<script async src="https://platform.twitter.com/widgets.js"></script>"#,
        ));
        assert!(ok.ok, "twitter embed should pass: {}", ok.error);

        let bad = n.validate(r#"<script src="https://tracker.example.org/x.js"></script>"#);
        assert!(!bad.ok);
        assert!(bad.error.starts_with("disallowed domain in script:"));
    }

    #[test]
    fn test_validate_accepts_own_conversions() {
        let n = normalizer();
        let urls = [
            "https://www.canva.com/design/ABC123/view",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://vimeo.com/76979871",
            "https://docs.google.com/presentation/d/PRES_ID/edit",
            "https://drive.google.com/file/d/FILE_ID/view",
            "https://www.instagram.com/p/Cxyz/",
            "https://x.com/user/status/12345",
        ];
        for url in urls {
            let result = n.validate(url);
            assert!(result.ok, "own conversion rejected for {}: {}", url, result.error);
            assert!(!result.cleaned.is_empty());
        }
    }

    #[test]
    fn test_describe_is_read_only_and_reports_platform() {
        let n = normalizer();
        let info = n.describe("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(info.kind, EmbedKind::Url);
        assert_eq!(info.platform.as_deref(), Some("YouTube"));
        assert!(info.convertible);

        let info = n.describe("plain words");
        assert_eq!(info.kind, EmbedKind::Text);
        assert!(!info.convertible);
    }

    #[test]
    fn test_extract_tag_srcs_document_order() {
        let markup = concat!(
            r#"<iframe src="https://one.test"></iframe>"#,
            r#"<iframe></iframe>"#,
            r#"<iframe src='https://three.test'></iframe>"#,
        );
        let srcs = extract_tag_srcs(markup, "iframe");
        assert_eq!(srcs.len(), 3);
        assert_eq!(srcs[0].as_deref(), Some("https://one.test"));
        assert_eq!(srcs[1], None);
        assert_eq!(srcs[2].as_deref(), Some("https://three.test"));
    }
}
