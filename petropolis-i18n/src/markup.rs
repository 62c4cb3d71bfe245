//! Markup carrier for batch translation
//!
//! A row travels to the provider as a flat run of `<e>` elements, one per
//! translatable field. Each element names its field in the `k` attribute so the
//! values can be matched back even if the provider reorders or drops elements:
//!
//! ```text
//! <e k="name">Refinery</e><e k="country">Brazil</e>
//! ```
//!
//! Attribute values are not translated by XML-aware providers.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Tag wrapping each field value
pub const ELEMENT: &str = "e";

/// Attribute carrying the original field name
pub const KEY_ATTRIBUTE: &str = "k";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("malformed markup: {0}")]
    Malformed(String),
    #[error("unclosed <{ELEMENT}> element")]
    Unclosed,
}

/// One `<e>` element recovered from translated markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    /// Field name from the `k` attribute, if the provider kept it
    pub key: Option<String>,
    /// Unescaped text content
    pub text: String,
}

/// Append one field element to `buf`
fn write_element(buf: &mut String, key: &str, value: &str) {
    buf.push('<');
    buf.push_str(ELEMENT);
    buf.push(' ');
    buf.push_str(KEY_ATTRIBUTE);
    buf.push_str("=\"");
    buf.push_str(&escape(key));
    buf.push_str("\">");
    buf.push_str(&escape(value));
    buf.push_str("</");
    buf.push_str(ELEMENT);
    buf.push('>');
}

/// Build markup from `(field, value)` pairs, in iteration order
pub fn to_markup<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut buf = String::new();
    for (key, value) in pairs {
        write_element(&mut buf, key, value);
    }
    buf
}

/// Extract `<e>` elements in document order
///
/// Text outside elements is ignored. Markup nested inside an element (for
/// example emphasis the provider inserted) contributes only its text.
pub fn parse_markup(markup: &str) -> Result<Vec<MarkupElement>, MarkupError> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);

    let mut elements = Vec::new();
    let mut current: Option<MarkupElement> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if current.is_some() {
                    depth += 1;
                } else if is_field_element(&start) {
                    current = Some(MarkupElement {
                        key: key_attribute(&start)?,
                        text: String::new(),
                    });
                }
            }
            Ok(Event::Empty(start)) => {
                if current.is_none() && is_field_element(&start) {
                    elements.push(MarkupElement {
                        key: key_attribute(&start)?,
                        text: String::new(),
                    });
                }
            }
            Ok(Event::End(_)) => {
                if depth > 0 {
                    depth -= 1;
                } else if let Some(element) = current.take() {
                    elements.push(element);
                }
            }
            Ok(Event::Text(text)) => {
                if let Some(element) = current.as_mut() {
                    let decoded = text
                        .unescape()
                        .map_err(|e| MarkupError::Malformed(e.to_string()))?;
                    element.text.push_str(&decoded);
                }
            }
            Ok(Event::CData(cdata)) => {
                if let Some(element) = current.as_mut() {
                    element.text.push_str(&String::from_utf8_lossy(&cdata));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(MarkupError::Malformed(e.to_string())),
        }
    }

    if current.is_some() {
        return Err(MarkupError::Unclosed);
    }

    Ok(elements)
}

fn is_field_element(start: &BytesStart<'_>) -> bool {
    start.name().as_ref() == ELEMENT.as_bytes()
}

fn key_attribute(start: &BytesStart<'_>) -> Result<Option<String>, MarkupError> {
    let attribute = start
        .try_get_attribute(KEY_ATTRIBUTE)
        .map_err(|e| MarkupError::Malformed(e.to_string()))?;

    attribute
        .map(|a| {
            a.unescape_value()
                .map(|v| v.into_owned())
                .map_err(|e| MarkupError::Malformed(e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(key: &str, text: &str) -> MarkupElement {
        MarkupElement {
            key: Some(key.to_string()),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_to_markup_wraps_each_field() {
        let markup = to_markup([("name", "Refinery"), ("country", "Brazil")]);
        assert_eq!(
            markup,
            r#"<e k="name">Refinery</e><e k="country">Brazil</e>"#
        );
    }

    #[test]
    fn test_to_markup_escapes_values() {
        let markup = to_markup([("name", "Oil & <Gas>")]);
        assert_eq!(markup, r#"<e k="name">Oil &amp; &lt;Gas&gt;</e>"#);
        assert_eq!(parse_markup(&markup).unwrap(), vec![keyed("name", "Oil & <Gas>")]);
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let elements = parse_markup(r#"<e k="b">two</e><e k="a">one</e>"#).unwrap();
        assert_eq!(elements, vec![keyed("b", "two"), keyed("a", "one")]);
    }

    #[test]
    fn test_parse_without_key_attribute() {
        let elements = parse_markup("<e>uno</e><e>dos</e>").unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].key, None);
        assert_eq!(elements[1].text, "dos");
    }

    #[test]
    fn test_parse_empty_elements() {
        let elements = parse_markup(r#"<e k="a"></e><e k="b"/>"#).unwrap();
        assert_eq!(elements, vec![keyed("a", ""), keyed("b", "")]);
    }

    #[test]
    fn test_parse_ignores_text_outside_elements() {
        let elements = parse_markup(r#"noise<e k="a">x</e> tail"#).unwrap();
        assert_eq!(elements, vec![keyed("a", "x")]);
    }

    #[test]
    fn test_parse_flattens_nested_markup() {
        let elements = parse_markup(r#"<e k="a">very <b>big</b> field</e>"#).unwrap();
        assert_eq!(elements, vec![keyed("a", "very big field")]);
    }

    #[test]
    fn test_parse_preserves_whitespace() {
        let elements = parse_markup(r#"<e k="a">  spaced  </e>"#).unwrap();
        assert_eq!(elements[0].text, "  spaced  ");
    }

    #[test]
    fn test_parse_unclosed_element() {
        assert!(parse_markup(r#"<e k="a">open"#).is_err());
    }

    #[test]
    fn test_parse_mismatched_end_tag() {
        assert!(matches!(
            parse_markup(r#"<e k="a">x</f>"#),
            Err(MarkupError::Malformed(_))
        ));
    }
}
