//! Feed renderer
//!
//! `build_document` merges a template with a record window into a
//! `FeedDocument`; `render` serializes that document as RSS 2.0 or JSON.
//! Output depends only on its inputs, render time included, so the same
//! window rendered twice is byte-identical.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use serde_json::Value;

use crate::domain::entities::{FeedTemplate, ItemTemplate, Record, RecordId, DEFAULT_TTL_MINUTES};
use crate::error::RenderError;
use crate::feed::document::{FeedDocument, FeedItem, OutputFormat};
use crate::feed::template::{interpolate, interpolate_value};

/// Build the document for a window of records (already newest first)
pub fn build_document(
    template: &FeedTemplate,
    records: &[Record],
    default_link: &str,
    now: DateTime<Utc>,
) -> FeedDocument {
    FeedDocument {
        title: template.title.clone().unwrap_or_default(),
        description: template.description.clone().unwrap_or_default(),
        link: template
            .link
            .clone()
            .unwrap_or_else(|| default_link.to_string()),
        built_at: now,
        ttl: template.ttl.unwrap_or(DEFAULT_TTL_MINUTES),
        items: records
            .iter()
            .map(|record| build_item(&template.item, record))
            .collect(),
        extra: template.extra.clone(),
    }
}

fn build_item(template: &ItemTemplate, record: &Record) -> FeedItem {
    let field = |text: &Option<String>| {
        text.as_deref()
            .map(|t| interpolate(t, &record.payload))
            .unwrap_or_default()
    };

    FeedItem {
        title: field(&template.title),
        description: field(&template.description),
        link: field(&template.link),
        guid: record.id,
        published_at: record.created_at,
        extra: template
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), interpolate_value(value, &record.payload)))
            .collect(),
    }
}

/// Serialize a document in the requested format
pub fn render(document: &FeedDocument, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Syndication => render_rss(document),
        OutputFormat::Structured => render_json(document),
    }
}

// ===== RSS =====

fn xml_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Xml(e.to_string())
}

fn render_rss(document: &FeedDocument) -> Result<String, RenderError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(
            BytesStart::new("rss").with_attributes([("version", "2.0")]),
        ))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .map_err(xml_error)?;

    let built_at = document.built_at.to_rfc2822();
    text_element(&mut writer, "title", &document.title)?;
    text_element(&mut writer, "description", &document.description)?;
    text_element(&mut writer, "link", &document.link)?;
    text_element(&mut writer, "lastBuildDate", &built_at)?;
    text_element(&mut writer, "pubDate", &built_at)?;
    text_element(&mut writer, "ttl", &document.ttl.to_string())?;

    for item in &document.items {
        writer
            .write_event(Event::Start(BytesStart::new("item")))
            .map_err(xml_error)?;
        text_element(&mut writer, "title", &item.title)?;
        text_element(&mut writer, "description", &item.description)?;
        text_element(&mut writer, "link", &item.link)?;
        text_element(&mut writer, "guid", &item.guid.to_string())?;
        text_element(&mut writer, "pubDate", &item.published_at.to_rfc2822())?;
        writer
            .write_event(Event::End(BytesEnd::new("item")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .map_err(xml_error)?;

    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

/// `<name>text</name>`, with the text escaped
fn text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), RenderError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)?;
    Ok(())
}

// ===== JSON =====

#[derive(Serialize)]
struct StructuredFeed<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(rename = "pubDate")]
    pub_date: DateTime<Utc>,
    items: Vec<StructuredItem<'a>>,
    #[serde(flatten)]
    extra: &'a BTreeMap<String, Value>,
}

#[derive(Serialize)]
struct StructuredItem<'a> {
    title: &'a str,
    description: &'a str,
    link: &'a str,
    guid: RecordId,
    #[serde(rename = "pubDate")]
    pub_date: String,
    #[serde(flatten)]
    extra: &'a BTreeMap<String, Value>,
}

fn render_json(document: &FeedDocument) -> Result<String, RenderError> {
    let feed = StructuredFeed {
        title: &document.title,
        description: &document.description,
        pub_date: document.built_at,
        items: document
            .items
            .iter()
            .map(|item| StructuredItem {
                title: &item.title,
                description: &item.description,
                link: &item.link,
                guid: item.guid,
                pub_date: item.published_at.to_rfc2822(),
                extra: &item.extra,
            })
            .collect(),
        extra: &document.extra,
    };

    Ok(serde_json::to_string(&feed)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Payload, SourceId};
    use chrono::TimeZone;
    use serde_json::json;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, hour, 0, 0).unwrap()
    }

    fn record(id: i64, title: &str, hovertext: &str, url: &str, hour: u32) -> Record {
        Record {
            id: RecordId(id),
            source_id: SourceId::from("website"),
            payload: Payload::from([
                ("title".to_string(), title.to_string()),
                ("hovertext".to_string(), hovertext.to_string()),
                ("url".to_string(), url.to_string()),
            ]),
            created_at: at(hour),
        }
    }

    fn template() -> FeedTemplate {
        FeedTemplate {
            title: Some("XKCD comics as a feed".to_string()),
            description: Some("This is a feed of recent XKCD comics".to_string()),
            item: ItemTemplate {
                title: Some("{{title}}".to_string()),
                description: Some("Secret hovertext: {{hovertext}}".to_string()),
                link: Some("{{url}}".to_string()),
                extra: BTreeMap::new(),
            },
            ..FeedTemplate::default()
        }
    }

    fn window() -> Vec<Record> {
        vec![
            record(2, "Evolving again", "Something else", "http://imgs.xkcd.com/comics/evolving2.png", 9),
            record(1, "Evolving", "Biologists play reverse Pokemon", "http://imgs.xkcd.com/comics/evolving.png", 8),
        ]
    }

    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    // ===== build_document =====

    #[test]
    fn build_document_substitutes_item_fields() {
        let doc = build_document(&template(), &window(), "https://yoursite.com", at(12));

        assert_eq!(doc.title, "XKCD comics as a feed");
        assert_eq!(doc.link, "https://yoursite.com");
        assert_eq!(doc.ttl, 60);
        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[0].title, "Evolving again");
        assert_eq!(doc.items[0].description, "Secret hovertext: Something else");
        assert_eq!(doc.items[0].link, "http://imgs.xkcd.com/comics/evolving2.png");
        assert_eq!(doc.items[0].guid, RecordId(2));
        assert_eq!(doc.items[0].published_at, at(9));
    }

    #[test]
    fn build_document_template_overrides_link_and_ttl() {
        let mut template = template();
        template.link = Some("https://comics.example".to_string());
        template.ttl = Some(15);

        let doc = build_document(&template, &[], "https://yoursite.com", at(12));

        assert_eq!(doc.link, "https://comics.example");
        assert_eq!(doc.ttl, 15);
    }

    #[test]
    fn build_document_missing_fields_are_empty() {
        let mut template = template();
        template.item.link = None;
        template.item.description = Some("{{missing}}".to_string());

        let doc = build_document(&template, &window(), "https://yoursite.com", at(12));

        assert_eq!(doc.items[0].link, "");
        assert_eq!(doc.items[0].description, "");
    }

    #[test]
    fn build_document_copies_extra_item_fields() {
        let mut template = template();
        template.item.extra.insert("foo".to_string(), json!("hi"));
        template.item.extra.insert("heading".to_string(), json!("[{{title}}]"));

        let doc = build_document(&template, &window(), "https://yoursite.com", at(12));

        for item in &doc.items {
            assert_eq!(item.extra.get("foo"), Some(&json!("hi")));
        }
        assert_eq!(doc.items[1].extra.get("heading"), Some(&json!("[Evolving]")));
    }

    // ===== RSS =====

    #[test]
    fn rss_matches_expected_document() {
        let doc = build_document(&template(), &window(), "https://yoursite.com", at(12));

        let xml = render(&doc, OutputFormat::Syndication).unwrap();

        let expected = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <rss version="2.0">
            <channel>
             <title>XKCD comics as a feed</title>
             <description>This is a feed of recent XKCD comics</description>
             <link>https://yoursite.com</link>
             <lastBuildDate>{now}</lastBuildDate>
             <pubDate>{now}</pubDate>
             <ttl>60</ttl>
             <item>
              <title>Evolving again</title>
              <description>Secret hovertext: Something else</description>
              <link>http://imgs.xkcd.com/comics/evolving2.png</link>
              <guid>2</guid>
              <pubDate>{second}</pubDate>
             </item>
             <item>
              <title>Evolving</title>
              <description>Secret hovertext: Biologists play reverse Pokemon</description>
              <link>http://imgs.xkcd.com/comics/evolving.png</link>
              <guid>1</guid>
              <pubDate>{first}</pubDate>
             </item>
            </channel>
            </rss>"#,
            now = at(12).to_rfc2822(),
            second = at(9).to_rfc2822(),
            first = at(8).to_rfc2822(),
        );

        assert_eq!(strip_whitespace(&xml), strip_whitespace(&expected));
    }

    #[test]
    fn rss_uses_internet_mail_dates() {
        let doc = build_document(&template(), &window(), "https://yoursite.com", at(12));

        let xml = render(&doc, OutputFormat::Syndication).unwrap();

        assert!(xml.contains("<pubDate>Fri, 16 Oct 2026 12:00:00 +0000</pubDate>"));
        assert!(xml.contains("<pubDate>Fri, 16 Oct 2026 09:00:00 +0000</pubDate>"));
    }

    #[test]
    fn rss_escapes_payload_text() {
        let records = vec![record(1, "Fish & Chips <3", "", "http://x.test/?a=1&b=2", 8)];
        let doc = build_document(&template(), &records, "https://yoursite.com", at(12));

        let xml = render(&doc, OutputFormat::Syndication).unwrap();

        assert!(xml.contains("<title>Fish &amp; Chips &lt;3</title>"));
        assert!(xml.contains("<link>http://x.test/?a=1&amp;b=2</link>"));
    }

    #[test]
    fn rss_empty_window_is_valid_channel() {
        let doc = build_document(&template(), &[], "https://yoursite.com", at(12));

        let xml = render(&doc, OutputFormat::Syndication).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<ttl>60</ttl>"));
        assert!(!xml.contains("<item>"));
        assert!(xml.trim_end().ends_with("</rss>"));
    }

    #[test]
    fn rss_leaves_out_extra_fields() {
        let mut template = template();
        template.item.extra.insert("foo".to_string(), json!("hi"));
        let doc = build_document(&template, &window(), "https://yoursite.com", at(12));

        let xml = render(&doc, OutputFormat::Syndication).unwrap();

        assert!(!xml.contains("foo"));
    }

    // ===== JSON =====

    #[test]
    fn json_matches_expected_document() {
        let mut template = template();
        template.item.extra.insert("foo".to_string(), json!("hi"));
        let doc = build_document(&template, &window(), "https://yoursite.com", at(12));

        let body = render(&doc, OutputFormat::Structured).unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(
            value,
            json!({
                "title": "XKCD comics as a feed",
                "description": "This is a feed of recent XKCD comics",
                "pubDate": "2026-10-16T12:00:00Z",
                "items": [
                    {
                        "title": "Evolving again",
                        "description": "Secret hovertext: Something else",
                        "link": "http://imgs.xkcd.com/comics/evolving2.png",
                        "guid": 2,
                        "pubDate": at(9).to_rfc2822(),
                        "foo": "hi"
                    },
                    {
                        "title": "Evolving",
                        "description": "Secret hovertext: Biologists play reverse Pokemon",
                        "link": "http://imgs.xkcd.com/comics/evolving.png",
                        "guid": 1,
                        "pubDate": at(8).to_rfc2822(),
                        "foo": "hi"
                    }
                ]
            })
        );
    }

    #[test]
    fn json_merges_channel_metadata() {
        let mut template = template();
        template.extra.insert("language".to_string(), json!("en"));
        let doc = build_document(&template, &[], "https://yoursite.com", at(12));

        let value: Value =
            serde_json::from_str(&render(&doc, OutputFormat::Structured).unwrap()).unwrap();

        assert_eq!(value["language"], "en");
        assert_eq!(value["items"], json!([]));
    }

    // ===== determinism and parity =====

    #[test]
    fn rendering_twice_is_byte_identical() {
        let first = build_document(&template(), &window(), "https://yoursite.com", at(12));
        let second = build_document(&template(), &window(), "https://yoursite.com", at(12));

        for format in [OutputFormat::Syndication, OutputFormat::Structured] {
            assert_eq!(render(&first, format).unwrap(), render(&second, format).unwrap());
        }
    }

    #[test]
    fn formats_agree_on_items() {
        let doc = build_document(&template(), &window(), "https://yoursite.com", at(12));

        let xml = render(&doc, OutputFormat::Syndication).unwrap();
        let value: Value =
            serde_json::from_str(&render(&doc, OutputFormat::Structured).unwrap()).unwrap();
        let items = value["items"].as_array().unwrap();

        assert_eq!(items.len(), xml.matches("<item>").count());
        let mut cursor = 0;
        for item in items {
            for field in ["title", "description", "link", "pubDate"] {
                let text = item[field].as_str().unwrap();
                let tag = format!("<{field}>{text}</{field}>");
                let found = xml[cursor..].find(&tag).expect("field present in order");
                cursor += found;
            }
            let guid = format!("<guid>{}</guid>", item["guid"]);
            assert!(xml.contains(&guid));
        }
    }
}
