//! Post-mapping body rewriting: embed normalization and caption expansion.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::document::MetaEntry;
use crate::error::CoreError;
use crate::fragment::{FragmentParams, FragmentRenderer, ATTACHMENT_TEMPLATE};
use crate::mapper::CONTENT_ATTRIBUTE;
use crate::types::{MappedAttributes, RecordShell};

/// Substring identifying oEmbed cache entries in postmeta keys.
pub const OEMBED_KEY_MARKER: &str = "_oembed";

/// Fragment parameter carrying the text enclosed by a caption shortcode.
pub const CAPTION_CONTENT_PARAM: &str = "content";

/// Postmeta key holding the discussion thread id.
pub const DISCUSSION_THREAD_META_KEY: &str = "dsq_thread_id";

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"youtube\.com/(?:.+?/)?(?P<vid>[\w-]+)").expect("valid regex")
});

static VIMEO_PLAYER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/video/(?P<vid>\d+)").expect("valid regex"));

static VIMEO_MOOGALOOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"vimeo\.com/moogaloop.+?clip_id=(?P<vid>\d+)").expect("valid regex")
});

static CAPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[caption(?P<attrs>[^\]]*)\](?P<content>(?s:.*?))\[/caption\]").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Embeds
// ---------------------------------------------------------------------------

/// Media provider an embed belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedProvider {
    YouTube,
    Vimeo,
}

impl EmbedProvider {
    /// Host fragment a bare body URL must contain.
    fn host_marker(&self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
            Self::Vimeo => "vimeo",
        }
    }
}

/// A recognized embed: provider plus the media id it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub provider: EmbedProvider,
    pub video_id: String,
}

/// Classify an embed value by the recognized URL shapes, first match wins.
pub fn classify_embed(value: &str) -> Option<Embed> {
    let shapes: [(&Regex, EmbedProvider); 3] = [
        (&*YOUTUBE_RE, EmbedProvider::YouTube),
        (&*VIMEO_PLAYER_RE, EmbedProvider::Vimeo),
        (&*VIMEO_MOOGALOOP_RE, EmbedProvider::Vimeo),
    ];
    shapes.into_iter().find_map(|(re, provider)| {
        re.captures(value).map(|caps| Embed {
            provider,
            video_id: caps["vid"].to_string(),
        })
    })
}

/// Replace every bare URL line referencing the embed's provider and id with
/// `replacement`. Returns `true` if anything changed.
///
/// The id must stand alone between non-id characters (or the line end), so
/// `42` never matches a line for `4242` or `142`.
pub fn replace_embed_lines(body: &mut String, embed: &Embed, replacement: &str) -> bool {
    let pattern = format!(
        r"(?m)^http.+?{}.*?[^\w\n-]{}(?:[^\w\n-].*)?$",
        embed.provider.host_marker(),
        regex::escape(&embed.video_id)
    );
    let Ok(line_re) = Regex::new(&pattern) else {
        return false;
    };
    if !line_re.is_match(body.as_str()) {
        return false;
    }
    *body = line_re
        .replace_all(body.as_str(), NoExpand(replacement))
        .into_owned();
    true
}

/// Apply every oEmbed meta entry, in order, to the body text.
pub fn normalize_embeds(body: &mut String, meta: &[MetaEntry]) {
    for entry in meta.iter().filter(|m| m.meta_key.contains(OEMBED_KEY_MARKER)) {
        match classify_embed(&entry.meta_value) {
            Some(embed) => {
                if replace_embed_lines(body, &embed, &entry.meta_value) {
                    tracing::debug!(meta_key = %entry.meta_key, video_id = %embed.video_id, "Embedded media in body");
                }
            }
            None => tracing::debug!(meta_key = %entry.meta_key, "Unrecognized embed shape"),
        }
    }
}

// ---------------------------------------------------------------------------
// Captions
// ---------------------------------------------------------------------------

/// Tokenize a shortcode attribute string such as
/// ` id="attachment_5" align="alignleft" width="300"`.
///
/// Grammar: a sequence of `name=` `"value"` pairs. The text is split on
/// double quotes and consecutive tokens are paired; the name loses its
/// leading whitespace and one trailing `=`. Pairs with an empty name or no
/// value are dropped.
pub fn parse_shortcode_attributes(attrs: &str) -> FragmentParams {
    let tokens: Vec<&str> = attrs.split('"').collect();
    tokens
        .chunks(2)
        .filter_map(|pair| {
            let [name, value] = pair else {
                return None;
            };
            let name = name.trim_start();
            let name = name.strip_suffix('=').unwrap_or(name).trim_end();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Replace every `[caption ...]...[/caption]` span with the rendered
/// attachment fragment, left to right.
///
/// The enclosed text is passed as the `content` parameter. A shortcode
/// attribute also named `content` is shadowed by it.
pub fn expand_captions<R: FragmentRenderer + ?Sized>(
    body: &str,
    renderer: &R,
) -> Result<String, CoreError> {
    let mut out = String::with_capacity(body.len());
    let mut last = 0;

    for caps in CAPTION_RE.captures_iter(body) {
        let Some(span) = caps.get(0) else {
            continue;
        };
        let mut params = parse_shortcode_attributes(&caps["attrs"]);
        let enclosed = caps["content"].to_string();
        if let Some(shadowed) = params.insert(CAPTION_CONTENT_PARAM.to_string(), enclosed) {
            tracing::debug!(%shadowed, "Caption attribute 'content' replaced by enclosed text");
        }

        out.push_str(&body[last..span.start()]);
        out.push_str(&renderer.render(ATTACHMENT_TEMPLATE, &params)?);
        last = span.end();
    }

    out.push_str(&body[last..]);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Rewrite pass
// ---------------------------------------------------------------------------

/// Rewrite the body attribute and copy colocated meta onto the shell.
pub fn rewrite<R: FragmentRenderer + ?Sized>(
    attributes: &mut MappedAttributes,
    shell: &mut RecordShell,
    meta: &[MetaEntry],
    renderer: &R,
) -> Result<(), CoreError> {
    if let Some(body) = attributes.get_str(CONTENT_ATTRIBUTE) {
        let mut body = body.to_string();
        normalize_embeds(&mut body, meta);
        let body = expand_captions(&body, renderer)?;
        attributes.insert(CONTENT_ATTRIBUTE, body);
    }

    if let Some(entry) = meta.iter().find(|m| m.meta_key == DISCUSSION_THREAD_META_KEY) {
        shell.dsq_thread_id = Some(entry.meta_value.clone());
    }

    Ok(())
}
