//! ELAN (`.eaf`) annotation documents.
//!
//! Segments of the selected transcription tiers are transliterated either in
//! place or into a new symbolic-association tier `<prefix>@<participant>`
//! inserted right after its source tier. Segments marked as code-switching
//! on a separate tier are left alone.
//!
//! The document is held as a small element tree; text and attribute values
//! of untouched nodes are written back exactly as read.
use crate::{
    corpus::{CorpusError, DocumentProcessor},
    translit::Transliterator,
};
use quick_xml::{
    Reader, Writer,
    escape::unescape,
    events::{BytesEnd, BytesStart, BytesText, Event, attributes::Attribute},
    name::QName,
};
use regex::Regex;
use std::{borrow::Cow, collections::HashSet, fs, io::Write, path::Path, str};
use tracing::debug;

pub const DEFAULT_TIER_TYPE: &str = "transcription_st";
pub const DEFAULT_TIER_PREFIX: &str = "tx_st";
const LAST_ID_PROPERTY: &str = "lastUsedAnnotationId";

#[derive(Debug, Clone)]
pub struct EafConfig {
    /// Regex over `TIER_ID` or `LINGUISTIC_TYPE_REF`; anchored at both ends.
    pub tiers: String,
    /// Overwrite segment values instead of adding a dependent tier.
    pub replace_segments: bool,
    pub tier_type: String,
    pub tier_prefix: String,
    /// Tier carrying code-switching annotations, same matching as `tiers`.
    pub cs_tier: Option<String>,
    /// A code-switching value matching this regex turns transliteration off
    /// for the referenced segment.
    pub cs_turn_off: String,
}

impl EafConfig {
    pub fn new(tiers: impl Into<String>) -> Self {
        Self {
            tiers: tiers.into(),
            replace_segments: false,
            tier_type: DEFAULT_TIER_TYPE.to_owned(),
            tier_prefix: DEFAULT_TIER_PREFIX.to_owned(),
            cs_tier: None,
            cs_turn_off: String::new(),
        }
    }
}

fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    let head = if pattern.starts_with('^') { "" } else { "^" };
    let tail = if pattern.ends_with('$') { "" } else { "$" };
    Regex::new(&format!("{head}{pattern}{tail}"))
}

// ---------------------------------------------------------------------------
//    Element tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    /// Escaped character data, as found in the source.
    Text(String),
    /// Declarations, comments, CDATA and friends, passed through.
    Other(Event<'static>),
}

#[derive(Debug, Clone, Default)]
struct Element {
    name: String,
    /// Attribute values are kept escaped.
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs
            .push((key.to_owned(), quick_xml::escape::escape(value).into_owned()));
        self
    }

    fn attr(&self, key: &str) -> Result<Option<Cow<'_, str>>, CorpusError> {
        match self.attrs.iter().find(|(k, _)| k == key) {
            Some((_, raw)) => Ok(Some(unescape(raw)?)),
            None => Ok(None),
        }
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Concatenated, unescaped text content; `None` when there is none.
    fn text(&self) -> Result<Option<String>, CorpusError> {
        let mut out: Option<String> = None;
        for node in &self.children {
            if let Node::Text(raw) = node {
                out.get_or_insert_default().push_str(&unescape(raw)?);
            }
        }
        Ok(out)
    }

    fn set_text(&mut self, text: &str) {
        self.children.retain(|n| !matches!(n, Node::Text(_)));
        self.children
            .push(Node::Text(quick_xml::escape::escape(text).into_owned()));
    }

    /// `ANNOTATION/<kind>` elements in document order.
    fn annotations<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements()
            .filter(|e| e.name == "ANNOTATION")
            .flat_map(move |a| a.elements().filter(move |e| e.name == kind))
    }

    fn annotations_mut<'a>(&'a mut self, kind: &'a str) -> impl Iterator<Item = &'a mut Element> {
        self.elements_mut()
            .filter(|e| e.name == "ANNOTATION")
            .flat_map(move |a| a.elements_mut().filter(move |e| e.name == kind))
    }
}

struct Document {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl Document {
    fn parse(xml: &str) -> Result<Self, CorpusError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Eof => break,
                Event::Start(start) => {
                    stack.push(element_of(&start)?);
                    continue;
                }
                Event::End(_) => {
                    let done = stack
                        .pop()
                        .ok_or_else(|| CorpusError::Malformed("unbalanced end tag".into()))?;
                    Node::Element(done)
                }
                Event::Empty(start) => Node::Element(element_of(&start)?),
                Event::Text(text) => Node::Text(str::from_utf8(&text)?.to_owned()),
                Event::GeneralRef(reference) => {
                    Node::Text(format!("&{};", str::from_utf8(&reference)?))
                }
                other => Node::Other(other.into_owned()),
            };
            match stack.last_mut() {
                Some(parent) => push_merged(&mut parent.children, node),
                None => match node {
                    Node::Element(e) if root.is_none() => root = Some(e),
                    Node::Element(_) => {
                        return Err(CorpusError::Malformed("more than one root element".into()));
                    }
                    other if root.is_none() => prolog.push(other),
                    other => epilog.push(other),
                },
            }
        }
        if !stack.is_empty() {
            return Err(CorpusError::Malformed("unclosed element".into()));
        }
        let root = root.ok_or_else(|| CorpusError::Malformed("no root element".into()))?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    fn write<W: Write>(&self, out: W) -> Result<(), CorpusError> {
        let mut writer = Writer::new(out);
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }
        Ok(())
    }
}

fn element_of(start: &BytesStart<'_>) -> Result<Element, CorpusError> {
    let mut element = Element::new(str::from_utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        element.attrs.push((
            str::from_utf8(attr.key.as_ref())?.to_owned(),
            str::from_utf8(&attr.value)?.to_owned(),
        ));
    }
    Ok(element)
}

/// Adjacent text pieces (split around entity references) form one node.
fn push_merged(children: &mut Vec<Node>, node: Node) {
    if let (Node::Text(piece), Some(Node::Text(last))) = (&node, children.last_mut()) {
        last.push_str(piece);
        return;
    }
    children.push(node);
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<(), CorpusError> {
    match node {
        Node::Element(e) => write_element(writer, e)?,
        Node::Text(raw) => writer.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?,
        Node::Other(event) => writer.write_event(event.borrow())?,
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), CorpusError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Borrowed(value.as_bytes()),
        });
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

// ---------------------------------------------------------------------------
//    Processor
// ---------------------------------------------------------------------------

pub struct EafProcessor<'t> {
    translit: &'t Transliterator,
    config: EafConfig,
    tiers: Regex,
    cs_tier: Option<Regex>,
    cs_turn_off: Regex,
}

impl<'t> EafProcessor<'t> {
    pub fn new(translit: &'t Transliterator, config: EafConfig) -> Result<Self, CorpusError> {
        let tiers = anchored(&config.tiers)?;
        let cs_tier = config.cs_tier.as_deref().map(anchored).transpose()?;
        let cs_turn_off = Regex::new(&config.cs_turn_off)?;
        Ok(Self {
            translit,
            config,
            tiers,
            cs_tier,
            cs_turn_off,
        })
    }

    #[inline]
    pub fn config(&self) -> &EafConfig {
        &self.config
    }

    /// Transliterate one document held in memory.
    pub fn process_str(&self, xml: &str) -> Result<String, CorpusError> {
        let mut doc = Document::parse(xml)?;
        self.transliterate(&mut doc.root)?;
        let mut out = Vec::with_capacity(xml.len() * 2);
        doc.write(&mut out)?;
        String::from_utf8(out).map_err(|e| CorpusError::Utf8(e.utf8_error()))
    }

    fn transliterate(&self, root: &mut Element) -> Result<(), CorpusError> {
        let mut next_id = last_used_id(root)? + 1;
        let skipped = self.code_switched_segments(root)?;

        let mut participants = 0usize;
        let mut index = 0usize;
        while index < root.children.len() {
            let Node::Element(tier) = &mut root.children[index] else {
                index += 1;
                continue;
            };
            if tier.name != "TIER" || !self.selects(tier, &self.tiers)? {
                index += 1;
                continue;
            }
            let participant = match tier.attr("PARTICIPANT")? {
                Some(p) if !p.is_empty() => p.into_owned(),
                _ => {
                    participants += 1;
                    format!("SP{participants}")
                }
            };
            let new_tier = self.process_tier(tier, &participant, &skipped, &mut next_id)?;
            index += 1;
            if let Some(new_tier) = new_tier {
                let indent = whitespace_before(&root.children, index - 1);
                if let Some(indent) = indent {
                    root.children.insert(index, Node::Text(indent));
                    index += 1;
                }
                root.children.insert(index, Node::Element(new_tier));
                index += 1;
            }
        }

        if !self.config.replace_segments {
            self.declare_tier_type(root)?;
        }
        set_last_used_id(root, next_id - 1)
    }

    fn selects(&self, tier: &Element, rx: &Regex) -> Result<bool, CorpusError> {
        let Some(id) = tier.attr("TIER_ID")? else {
            return Ok(false);
        };
        if rx.is_match(&id) {
            return Ok(true);
        }
        Ok(tier
            .attr("LINGUISTIC_TYPE_REF")?
            .is_some_and(|t| rx.is_match(&t)))
    }

    /// Ids of transcription segments whose code-switching annotation turns
    /// transliteration off.
    fn code_switched_segments(&self, root: &Element) -> Result<HashSet<String>, CorpusError> {
        let mut ids = HashSet::new();
        let Some(cs) = &self.cs_tier else {
            return Ok(ids);
        };
        for tier in root.elements().filter(|e| e.name == "TIER") {
            if !self.selects(tier, cs)? {
                continue;
            }
            for segment in tier.annotations("REF_ANNOTATION") {
                let Some(parent) = segment.attr("ANNOTATION_REF")? else {
                    continue;
                };
                let Some(text) = segment.child("ANNOTATION_VALUE").map(Element::text).transpose()?.flatten() else {
                    continue;
                };
                if self.cs_turn_off.is_match(&text.trim().to_lowercase()) {
                    ids.insert(parent.into_owned());
                }
            }
        }
        debug!(segments = ids.len(), "code-switched segments");
        Ok(ids)
    }

    fn process_tier(
        &self,
        tier: &mut Element,
        participant: &str,
        skipped: &HashSet<String>,
        next_id: &mut u64,
    ) -> Result<Option<Element>, CorpusError> {
        let tier_id = tier.attr("TIER_ID")?.map(Cow::into_owned).unwrap_or_default();
        let mut new_tier = Element::new("TIER")
            .with_attr("LINGUISTIC_TYPE_REF", &self.config.tier_type)
            .with_attr("PARENT_REF", &tier_id)
            .with_attr("PARTICIPANT", participant)
            .with_attr(
                "TIER_ID",
                &format!("{}@{}", self.config.tier_prefix, participant),
            );

        for segment in tier.annotations_mut("ALIGNABLE_ANNOTATION") {
            let Some(segment_id) = segment.attr("ANNOTATION_ID")?.map(Cow::into_owned) else {
                continue;
            };
            if skipped.contains(&segment_id) {
                continue;
            }
            let Some(value) = segment.elements_mut().find(|e| e.name == "ANNOTATION_VALUE") else {
                continue;
            };
            let Some(text) = value.text()? else {
                continue;
            };
            let source = text.trim().to_lowercase();
            let target = self.translit.transliterate(&source)?;
            if self.config.replace_segments {
                value.set_text(&target);
                continue;
            }
            let mut value = Element::new("ANNOTATION_VALUE");
            value.set_text(&target);
            let mut reference = Element::new("REF_ANNOTATION")
                .with_attr("ANNOTATION_ID", &format!("a{next_id}"))
                .with_attr("ANNOTATION_REF", &segment_id);
            reference.children.push(Node::Element(value));
            let mut annotation = Element::new("ANNOTATION");
            annotation.children.push(Node::Element(reference));
            new_tier.children.push(Node::Element(annotation));
            *next_id += 1;
        }

        debug!(tier = tier_id, participant, "tier transliterated");
        Ok((!self.config.replace_segments).then_some(new_tier))
    }

    /// Add the `LINGUISTIC_TYPE` of the new tiers after the last tier unless
    /// the document already declares it.
    fn declare_tier_type(&self, root: &mut Element) -> Result<(), CorpusError> {
        for lt in root.elements().filter(|e| e.name == "LINGUISTIC_TYPE") {
            if lt.attr("LINGUISTIC_TYPE_ID")?.as_deref() == Some(self.config.tier_type.as_str()) {
                return Ok(());
            }
        }
        let Some(last_tier) = root
            .children
            .iter()
            .rposition(|n| matches!(n, Node::Element(e) if e.name == "TIER"))
        else {
            return Ok(());
        };
        let declaration = Element::new("LINGUISTIC_TYPE")
            .with_attr("CONSTRAINTS", "Symbolic_Association")
            .with_attr("GRAPHIC_REFERENCES", "false")
            .with_attr("LINGUISTIC_TYPE_ID", &self.config.tier_type)
            .with_attr("TIME_ALIGNABLE", "false");
        let mut at = last_tier + 1;
        if let Some(indent) = whitespace_before(&root.children, last_tier) {
            root.children.insert(at, Node::Text(indent));
            at += 1;
        }
        root.children.insert(at, Node::Element(declaration));
        Ok(())
    }
}

impl DocumentProcessor for EafProcessor<'_> {
    fn extensions(&self) -> &'static [&'static str] {
        &["eaf"]
    }

    fn process_file(&mut self, input: &Path, output: &Path) -> Result<(), CorpusError> {
        let xml = fs::read_to_string(input)?;
        let out = self.process_str(&xml)?;
        fs::write(output, out)?;
        Ok(())
    }
}

/// Whitespace text node right before `children[index]`, reused to indent
/// inserted siblings.
fn whitespace_before(children: &[Node], index: usize) -> Option<String> {
    match index.checked_sub(1).map(|i| &children[i]) {
        Some(Node::Text(t)) if t.trim().is_empty() => Some(t.clone()),
        _ => None,
    }
}

fn last_id_property(root: &Element) -> Option<&Element> {
    root.child("HEADER")?.elements().find(|p| {
        p.name == "PROPERTY"
            && p.attrs
                .iter()
                .any(|(k, v)| k == "NAME" && v == LAST_ID_PROPERTY)
    })
}

fn last_used_id(root: &Element) -> Result<u64, CorpusError> {
    let text = last_id_property(root)
        .map(Element::text)
        .transpose()?
        .flatten()
        .ok_or(CorpusError::MissingAnnotationId)?;
    text.trim()
        .parse()
        .map_err(|_| CorpusError::MissingAnnotationId)
}

fn set_last_used_id(root: &mut Element, id: u64) -> Result<(), CorpusError> {
    let property = root
        .elements_mut()
        .find(|e| e.name == "HEADER")
        .and_then(|header| {
            header.elements_mut().find(|p| {
                p.name == "PROPERTY"
                    && p.attrs
                        .iter()
                        .any(|(k, v)| k == "NAME" && v == LAST_ID_PROPERTY)
            })
        })
        .ok_or(CorpusError::MissingAnnotationId)?;
    property.set_text(&id.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{correction::CorrectionTier, frequency::FrequencyTable};

    const EAF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ANNOTATION_DOCUMENT AUTHOR="" FORMAT="3.0" VERSION="3.0">
    <HEADER MEDIA_FILE="" TIME_UNITS="milliseconds">
        <PROPERTY NAME="lastUsedAnnotationId">3</PROPERTY>
    </HEADER>
    <TIME_ORDER>
        <TIME_SLOT TIME_SLOT_ID="ts1" TIME_VALUE="0"/>
        <TIME_SLOT TIME_SLOT_ID="ts2" TIME_VALUE="1200"/>
    </TIME_ORDER>
    <TIER LINGUISTIC_TYPE_REF="transcription" PARTICIPANT="AB" TIER_ID="tx@AB">
        <ANNOTATION>
            <ALIGNABLE_ANNOTATION ANNOTATION_ID="a1" TIME_SLOT_REF1="ts1" TIME_SLOT_REF2="ts2">
                <ANNOTATION_VALUE> Vala &amp; mon </ANNOTATION_VALUE>
            </ALIGNABLE_ANNOTATION>
        </ANNOTATION>
        <ANNOTATION>
            <ALIGNABLE_ANNOTATION ANNOTATION_ID="a2" TIME_SLOT_REF1="ts1" TIME_SLOT_REF2="ts2">
                <ANNOTATION_VALUE>kol</ANNOTATION_VALUE>
            </ALIGNABLE_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <TIER LINGUISTIC_TYPE_REF="cs" PARENT_REF="tx@AB" TIER_ID="cs@AB">
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a3" ANNOTATION_REF="a2">
                <ANNOTATION_VALUE>RU</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <LINGUISTIC_TYPE GRAPHIC_REFERENCES="false" LINGUISTIC_TYPE_ID="transcription" TIME_ALIGNABLE="true"/>
</ANNOTATION_DOCUMENT>
"#;

    fn translit() -> Transliterator {
        Transliterator::builder()
            .corrections(CorrectionTier::empty())
            .frequencies(FrequencyTable::default())
            .build()
            .unwrap()
    }

    #[test]
    fn adds_dependent_tier_after_source() {
        let t = translit();
        let p = EafProcessor::new(&t, EafConfig::new("transcription")).unwrap();
        let out = p.process_str(EAF).unwrap();

        let source = out.find(r#"TIER_ID="tx@AB""#).unwrap();
        let added = out
            .find(r#"<TIER LINGUISTIC_TYPE_REF="transcription_st" PARENT_REF="tx@AB" PARTICIPANT="AB" TIER_ID="tx_st@AB">"#)
            .unwrap();
        let cs = out.find(r#"TIER_ID="cs@AB""#).unwrap();
        assert!(source < added && added < cs);

        assert!(out.contains(r#"<REF_ANNOTATION ANNOTATION_ID="a4" ANNOTATION_REF="a1"><ANNOTATION_VALUE>вала &amp; мон</ANNOTATION_VALUE></REF_ANNOTATION>"#));
        assert!(out.contains(r#"<REF_ANNOTATION ANNOTATION_ID="a5" ANNOTATION_REF="a2"><ANNOTATION_VALUE>кол</ANNOTATION_VALUE>"#));
        assert!(out.contains(r#"<PROPERTY NAME="lastUsedAnnotationId">5</PROPERTY>"#));
        assert!(out.contains(r#"LINGUISTIC_TYPE_ID="transcription_st""#));
        // Source segments are untouched.
        assert!(out.contains("<ANNOTATION_VALUE> Vala &amp; mon </ANNOTATION_VALUE>"));
    }

    #[test]
    fn code_switched_segments_are_skipped() {
        let t = translit();
        let mut config = EafConfig::new("transcription");
        config.cs_tier = Some("cs@.*".into());
        config.cs_turn_off = "^ru$".into();
        let out = EafProcessor::new(&t, config).unwrap().process_str(EAF).unwrap();
        assert!(out.contains("вала &amp; мон"));
        assert!(!out.contains(">кол<"));
        assert!(out.contains(r#"<PROPERTY NAME="lastUsedAnnotationId">4</PROPERTY>"#));
    }

    #[test]
    fn replace_in_place() {
        let t = translit();
        let mut config = EafConfig::new("tx@.*");
        config.replace_segments = true;
        let out = EafProcessor::new(&t, config).unwrap().process_str(EAF).unwrap();
        assert!(out.contains("<ANNOTATION_VALUE>вала &amp; мон</ANNOTATION_VALUE>"));
        assert!(out.contains("<ANNOTATION_VALUE>кол</ANNOTATION_VALUE>"));
        assert!(!out.contains("tx_st@"));
        assert!(!out.contains("transcription_st"));
        assert!(out.contains(r#"<PROPERTY NAME="lastUsedAnnotationId">3</PROPERTY>"#));
    }

    #[test]
    fn untouched_parts_survive() {
        let t = translit();
        let p = EafProcessor::new(&t, EafConfig::new("nothing-matches")).unwrap();
        let out = p.process_str(EAF).unwrap();
        assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(out.contains(r#"<TIME_SLOT TIME_SLOT_ID="ts1" TIME_VALUE="0"/>"#));
        assert!(out.contains("<ANNOTATION_VALUE>RU</ANNOTATION_VALUE>"));
    }

    #[test]
    fn missing_participant_gets_a_number() {
        let t = translit();
        let doc = EAF.replace(r#" PARTICIPANT="AB""#, "");
        let out = EafProcessor::new(&t, EafConfig::new("transcription"))
            .unwrap()
            .process_str(&doc)
            .unwrap();
        assert!(out.contains(r#"TIER_ID="tx_st@SP1""#));
    }

    #[test]
    fn missing_last_id_is_an_error() {
        let t = translit();
        let doc = EAF.replace("lastUsedAnnotationId", "somethingElse");
        let err = EafProcessor::new(&t, EafConfig::new("transcription"))
            .unwrap()
            .process_str(&doc)
            .unwrap_err();
        assert!(matches!(err, CorpusError::MissingAnnotationId));
    }

    #[test]
    fn malformed_xml() {
        let t = translit();
        let p = EafProcessor::new(&t, EafConfig::new("transcription")).unwrap();
        assert!(p.process_str("<A><B></A>").is_err());
    }
}
