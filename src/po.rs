//! Gettext interchange for the dialogue of a decoded listing.
//!
//! Translators work in PO editors, not in listings, so the `.text`
//! section converts to a PO catalog and back. On export each string
//! becomes one entry: a `(*CHARACTER_NAME*)name(*LINE_BREAK*)` prefix
//! turns into the entry's `msgctxt`, plain strings file under "System
//! Message", and the break and input markers take the spellings PO
//! editors expect. On import the translated `msgstr` values, falling
//! back to `msgid` where a translation is missing, are substituted back
//! into the `.text` rows of the companion listing.

use crate::bytecode::{SECTION_KEYWORD, TEXT_SECTION};
use crate::encoder::{parse_listing, ListingError};

const NAME_MARKER: &str = "(*CHARACTER_NAME*)";
const BREAK_MARKER: &str = "(*LINE_BREAK*)";
const INPUT_MARKER: &str = "(*AWAITING_INPUT*)";
const CONTINUE_MARKER: &str = "(*CONTINUE*)";
const OPTIONS_MARKER: &str = "(*SHOW_OPTIONS,";

/// Name filed under `msgctxt` for strings nobody speaks.
const SYSTEM_CONTEXT: &str = "System Message";

/// Renders the `.text` section of `listing` as a PO catalog.
pub fn export(listing: &str, jp: bool) -> Result<String, ListingError> {
    let ctx = parse_listing(listing)?;

    let mut out = String::new();
    out.push_str("msgid \"\"\n");
    out.push_str("msgstr \"\"\n");
    out.push_str("\"Content-Type: text/plain; charset=UTF-8\\n\"\n");
    out.push_str(&format!(
        "\"Language: {}\\n\"\n\n",
        if jp { "ja" } else { "en" }
    ));

    for row in &ctx.texts {
        let (name, text) = strip_character_names(&row.content);
        let text = text
            .replace(BREAK_MARKER, "\\n")
            .replace(INPUT_MARKER, "(*INPUT*)\\n")
            .replace(CONTINUE_MARKER, "(*CLEAR*)");
        let text = truncate_after_options(&text);
        let context = name.as_deref().unwrap_or(SYSTEM_CONTEXT);

        out.push_str(&format!("msgctxt \"{}\"\n", context));
        out.push_str(&format!("msgid \"{}\"\n", text.trim()));
        out.push_str("msgstr \"\"\n\n");
    }
    Ok(out)
}

/// Substitutes the entries of `po` back into the `.text` rows of
/// `listing`, in order. Rows past the last entry keep their text; the
/// option annotation comments are dropped, since the next decode
/// regenerates them.
pub fn import(po: &str, listing: &str) -> String {
    let mut texts = parse_po(po).into_iter();

    let mut out = String::new();
    let mut in_text = false;
    for line in listing.lines() {
        if line.starts_with(SECTION_KEYWORD) {
            in_text = line
                .split_whitespace()
                .nth(1)
                .is_some_and(|name| name == TEXT_SECTION);
        } else if in_text && line.contains('"') {
            if let Some((colon, text)) = line.find(':').zip(texts.next()) {
                out.push_str(&line[..colon]);
                out.push_str(&format!(":\"{}\"\n", text));
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Peels every `(*CHARACTER_NAME*)name(*LINE_BREAK*)` group out of
/// `text`, keeping the first name for the entry context. A name marker
/// with no break after it stays put.
fn strip_character_names(text: &str) -> (Option<String>, String) {
    let mut name = None;
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    loop {
        let Some(start) = rest.find(NAME_MARKER) else {
            out.push_str(rest);
            break;
        };
        let after = &rest[start + NAME_MARKER.len()..];
        let Some(end) = after.find(BREAK_MARKER) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..start]);
        if name.is_none() {
            name = Some(after[..end].trim().to_string());
        }
        rest = &after[end + BREAK_MARKER.len()..];
    }
    (name, out)
}

/// Cuts everything after a shown option set. The choices live in a
/// fixed table, so nothing past the marker is translatable.
fn truncate_after_options(text: &str) -> String {
    if let Some(start) = text.find(OPTIONS_MARKER) {
        if let Some(end) = text[start..].find("*)") {
            return text[..start + end + 2].to_string();
        }
    }
    text.to_string()
}

/// Which field of a PO entry the reader last saw, for attaching
/// continuation lines.
enum Field {
    Context,
    Id,
    Value,
}

#[derive(Default)]
struct Entry {
    context: Option<String>,
    id: Option<String>,
    value: String,
}

impl Entry {
    /// The translation, or the source text when none was written.
    fn effective(&self) -> &str {
        if self.value.is_empty() {
            self.id.as_deref().unwrap_or("")
        } else {
            &self.value
        }
    }
}

/// Reads a PO catalog down to the replacement texts, transformed back
/// into marker spellings. The header entry and entries whose text comes
/// out blank are dropped.
fn parse_po(po: &str) -> Vec<String> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut cur = Entry::default();
    let mut field = None;

    for line in po.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("msgctxt") {
            if cur.id.is_some() {
                entries.push(std::mem::take(&mut cur));
            }
            cur.context = Some(unquote(rest));
            field = Some(Field::Context);
        } else if let Some(rest) = line.strip_prefix("msgid") {
            if cur.id.is_some() {
                entries.push(std::mem::take(&mut cur));
            }
            cur.id = Some(unquote(rest));
            field = Some(Field::Id);
        } else if let Some(rest) = line.strip_prefix("msgstr") {
            cur.value = unquote(rest);
            field = Some(Field::Value);
        } else if line.starts_with('"') {
            let chunk = unquote(line);
            match field {
                Some(Field::Context) => {
                    if let Some(context) = cur.context.as_mut() {
                        context.push_str(&chunk);
                    }
                }
                Some(Field::Id) => {
                    if let Some(id) = cur.id.as_mut() {
                        id.push_str(&chunk);
                    }
                }
                Some(Field::Value) => cur.value.push_str(&chunk),
                None => {}
            }
        }
    }
    if cur.id.is_some() {
        entries.push(cur);
    }

    let mut texts = Vec::new();
    for entry in entries {
        // msgid "" with no context is the catalog header.
        if entry.id.as_deref().map_or(true, str::is_empty) {
            continue;
        }
        let text = entry
            .effective()
            .replace("(*INPUT*)\\n", INPUT_MARKER)
            .replace("(*CLEAR*)", CONTINUE_MARKER)
            .replace("\\n", BREAK_MARKER);
        if text.trim().is_empty() {
            continue;
        }
        let text = match &entry.context {
            Some(name) if name != SYSTEM_CONTEXT => {
                format!("{}{}{}{}", NAME_MARKER, name, BREAK_MARKER, text)
            }
            _ => text,
        };
        texts.push(text);
    }
    texts
}

/// Strips the quotes around a PO field chunk.
fn unquote(chunk: &str) -> String {
    let chunk = chunk.trim();
    chunk
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(chunk)
        .to_string()
}
