//! Streaming XML events and the quick-xml event source.
//!
//! An [`EventSource`] reports the logical content of a document, in document
//! order, to an [`EventHandler`]. Events carry no spans; at most they carry
//! an anchor, the byte offset at which the source started reading the
//! construct. Exact positions are recovered later from the text itself.

use std::ops::ControlFlow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use crate::error::{Error, Result};

/// One attribute as reported by the event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAttribute {
    pub name: String,
    /// Decoded value.
    pub value: Option<String>,
    /// Value as written between the quotes.
    pub raw_value: Option<String>,
}

impl EventAttribute {
    /// An attribute whose value has no entities to decode.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            raw_value: Some(value.clone()),
            value: Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    StartElement {
        name: String,
        attributes: Vec<EventAttribute>,
        self_closing: bool,
    },
    /// For `<name/>` an end event with `self_closing` set follows the start
    /// event immediately.
    EndElement { name: String, self_closing: bool },
    Text { raw: String, content: String },
    Comment { raw: String },
    CData { raw: String },
    ProcessingInstruction { target: String, data: String },
    /// A non-fatal problem; parsing continues.
    Warning { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedEvent {
    pub event: XmlEvent,
    pub anchor: Option<usize>,
}

impl From<XmlEvent> for PositionedEvent {
    fn from(event: XmlEvent) -> Self {
        Self {
            event,
            anchor: None,
        }
    }
}

/// Receives events; returning `ControlFlow::Break` stops the source.
pub trait EventHandler {
    fn handle(&mut self, event: PositionedEvent) -> ControlFlow<()>;
}

/// How a source run ended when no syntax error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    Completed,
    Halted,
}

pub trait EventSource {
    /// Feed every event of the document to `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XmlSyntax`] when the document is malformed. Events
    /// before the error have already been delivered.
    fn run(&mut self, handler: &mut dyn EventHandler) -> Result<SourceOutcome>;
}

/// A pre-recorded list of events, replayed in order.
impl EventSource for Vec<PositionedEvent> {
    fn run(&mut self, handler: &mut dyn EventHandler) -> Result<SourceOutcome> {
        for event in self.drain(..) {
            if handler.handle(event).is_break() {
                return Ok(SourceOutcome::Halted);
            }
        }
        Ok(SourceOutcome::Completed)
    }
}

/// Event source over quick-xml.
///
/// End-name checking is left to the handler, text is not trimmed, duplicate
/// attributes are accepted, and the `<?xml ...?>` declaration and DOCTYPE
/// are skipped.
pub struct QuickXmlEventSource<'a> {
    reader: Reader<&'a [u8]>,
    depth: usize,
}

impl<'a> QuickXmlEventSource<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        Self { reader, depth: 0 }
    }

    fn deliver(
        handler: &mut dyn EventHandler,
        event: XmlEvent,
        anchor: usize,
    ) -> ControlFlow<()> {
        handler.handle(PositionedEvent {
            event,
            anchor: Some(anchor),
        })
    }

    fn start_event(
        &self,
        e: &BytesStart<'_>,
        anchor: usize,
        self_closing: bool,
        handler: &mut dyn EventHandler,
    ) -> Result<ControlFlow<()>> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        let mut warnings = Vec::new();

        for attr in e.attributes().with_checks(false) {
            let attr = attr.map_err(|err| Error::XmlSyntax {
                message: format!("Attribute error: {err}"),
                position: Some(anchor),
            })?;
            let attr_name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw_value = String::from_utf8_lossy(&attr.value).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(err) => {
                    warnings.push(format!(
                        "Could not decode value of attribute '{attr_name}': {err}"
                    ));
                    raw_value.clone()
                }
            };
            attributes.push(EventAttribute {
                name: attr_name,
                value: Some(value),
                raw_value: Some(raw_value),
            });
        }

        for message in warnings {
            if Self::deliver(handler, XmlEvent::Warning { message }, anchor).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }

        let start = XmlEvent::StartElement {
            name: name.clone(),
            attributes,
            self_closing,
        };
        if Self::deliver(handler, start, anchor).is_break() {
            return Ok(ControlFlow::Break(()));
        }
        if self_closing {
            let end = XmlEvent::EndElement {
                name,
                self_closing: true,
            };
            return Ok(handler.handle(end.into()));
        }
        Ok(ControlFlow::Continue(()))
    }
}

impl EventSource for QuickXmlEventSource<'_> {
    fn run(&mut self, handler: &mut dyn EventHandler) -> Result<SourceOutcome> {
        loop {
            // Capture position before reading the event
            let anchor = self.reader.buffer_position() as usize;

            let flow = match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    self.depth += 1;
                    self.start_event(&e, anchor, false, handler)?
                }
                Ok(Event::Empty(e)) => self.start_event(&e, anchor, true, handler)?,
                Ok(Event::End(e)) => {
                    self.depth = self.depth.saturating_sub(1);
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let end = XmlEvent::EndElement {
                        name,
                        self_closing: false,
                    };
                    Self::deliver(handler, end, anchor)
                }
                Ok(Event::Text(e)) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    if self.depth == 0 && raw.trim().is_empty() {
                        trace!(anchor, "skipping whitespace outside the root element");
                        continue;
                    }
                    let content = match e.unescape() {
                        Ok(content) => content.into_owned(),
                        Err(err) => {
                            let warning = XmlEvent::Warning {
                                message: format!("Could not decode text: {err}"),
                            };
                            if Self::deliver(handler, warning, anchor).is_break() {
                                return Ok(SourceOutcome::Halted);
                            }
                            raw.clone()
                        }
                    };
                    Self::deliver(handler, XmlEvent::Text { raw, content }, anchor)
                }
                Ok(Event::CData(e)) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    Self::deliver(handler, XmlEvent::CData { raw }, anchor)
                }
                Ok(Event::Comment(e)) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    Self::deliver(handler, XmlEvent::Comment { raw }, anchor)
                }
                Ok(Event::PI(e)) => {
                    let target = String::from_utf8_lossy(e.target()).into_owned();
                    let data = String::from_utf8_lossy(e.content()).trim().to_string();
                    Self::deliver(
                        handler,
                        XmlEvent::ProcessingInstruction { target, data },
                        anchor,
                    )
                }
                Ok(Event::Decl(_) | Event::DocType(_)) => ControlFlow::Continue(()),
                Ok(Event::Eof) => return Ok(SourceOutcome::Completed),
                Err(e) => {
                    return Err(Error::XmlSyntax {
                        message: e.to_string(),
                        position: Some(self.reader.error_position() as usize),
                    });
                }
            };

            if flow.is_break() {
                return Ok(SourceOutcome::Halted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<PositionedEvent>,
        stop_after: Option<usize>,
    }

    impl EventHandler for Recorder {
        fn handle(&mut self, event: PositionedEvent) -> ControlFlow<()> {
            self.events.push(event);
            match self.stop_after {
                Some(n) if self.events.len() >= n => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        }
    }

    fn record(text: &str) -> (Result<SourceOutcome>, Vec<PositionedEvent>) {
        let mut recorder = Recorder::default();
        let outcome = QuickXmlEventSource::new(text).run(&mut recorder);
        (outcome, recorder.events)
    }

    #[test]
    fn test_events_in_document_order_with_anchors() {
        let (outcome, events) = record(r#"<a x="1">hi<b/></a>"#);
        assert_eq!(outcome.unwrap(), SourceOutcome::Completed);

        let anchors: Vec<Option<usize>> = events.iter().map(|e| e.anchor).collect();
        assert_eq!(anchors, vec![Some(0), Some(9), Some(11), None, Some(15)]);

        assert_eq!(
            events[0].event,
            XmlEvent::StartElement {
                name: "a".into(),
                attributes: vec![EventAttribute::new("x", "1")],
                self_closing: false,
            }
        );
        assert_eq!(
            events[3].event,
            XmlEvent::EndElement {
                name: "b".into(),
                self_closing: true,
            }
        );
    }

    #[test]
    fn test_mismatched_end_is_reported_not_rejected() {
        let (outcome, events) = record("<a><b></c></a>");
        assert_eq!(outcome.unwrap(), SourceOutcome::Completed);
        assert_eq!(
            events[2].event,
            XmlEvent::EndElement {
                name: "c".into(),
                self_closing: false,
            }
        );
    }

    #[test]
    fn test_entities_decoded_raw_kept() {
        let (_, events) = record(r#"<a t="x &amp; y">1 &lt; 2</a>"#);
        let XmlEvent::StartElement { attributes, .. } = &events[0].event else {
            panic!("expected start element");
        };
        assert_eq!(attributes[0].value.as_deref(), Some("x & y"));
        assert_eq!(attributes[0].raw_value.as_deref(), Some("x &amp; y"));
        assert_eq!(
            events[1].event,
            XmlEvent::Text {
                raw: "1 &lt; 2".into(),
                content: "1 < 2".into(),
            }
        );
    }

    #[test]
    fn test_unknown_entity_warns_and_keeps_raw() {
        let (outcome, events) = record("<a>&nbsp;</a>");
        assert!(outcome.is_ok());
        assert!(matches!(events[1].event, XmlEvent::Warning { .. }));
        assert_eq!(
            events[2].event,
            XmlEvent::Text {
                raw: "&nbsp;".into(),
                content: "&nbsp;".into(),
            }
        );
    }

    #[test]
    fn test_declaration_and_outer_whitespace_skipped() {
        let (_, events) = record("<?xml version=\"1.0\"?>\n<r/>\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].anchor, Some(22));
    }

    #[test]
    fn test_comment_cdata_and_pi() {
        let (_, events) = record("<r><!-- c --><![CDATA[<x>]]><?pi  some data ?></r>");
        assert_eq!(events[1].event, XmlEvent::Comment { raw: " c ".into() });
        assert_eq!(events[2].event, XmlEvent::CData { raw: "<x>".into() });
        assert_eq!(
            events[3].event,
            XmlEvent::ProcessingInstruction {
                target: "pi".into(),
                data: "some data".into(),
            }
        );
    }

    #[test]
    fn test_syntax_error_has_position() {
        let (outcome, events) = record("<a><b attr=></b></a>");
        assert!(matches!(
            outcome,
            Err(Error::XmlSyntax {
                position: Some(_),
                ..
            })
        ));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_handler_can_halt() {
        let mut recorder = Recorder {
            stop_after: Some(2),
            ..Default::default()
        };
        let outcome = QuickXmlEventSource::new("<a><b/><c/></a>")
            .run(&mut recorder)
            .unwrap();
        assert_eq!(outcome, SourceOutcome::Halted);
        assert_eq!(recorder.events.len(), 2);
    }

    #[test]
    fn test_recorded_events_replay() {
        let mut events: Vec<PositionedEvent> = vec![
            XmlEvent::Text {
                raw: "x".into(),
                content: "x".into(),
            }
            .into(),
        ];
        let mut recorder = Recorder::default();
        assert_eq!(
            events.run(&mut recorder).unwrap(),
            SourceOutcome::Completed
        );
        assert_eq!(recorder.events[0].anchor, None);
    }
}
