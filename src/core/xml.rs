//! A small owned element tree over `quick-xml`, just enough to read POM files
//! and write them back out with stable formatting.

use crate::utils::error::{BomError, Result};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub declaration: Option<XmlDeclaration>,
    /// Comments ahead of the root element; processing instructions are dropped.
    pub prolog_comments: Vec<String>,
    pub root: XmlElement,
}

/// Strips a `prefix:` from a qualified tag name.
pub fn local_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// `<name>text</name>`
    pub fn with_text(name: &str, text: &str) -> Self {
        let mut element = Self::new(name);
        element.children.push(XmlNode::Text(text.to_string()));
        element
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn is(&self, name: &str) -> bool {
        self.local_name() == name
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.is(name))
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.is(name))
    }

    /// Follows a chain of child names, e.g. `["modules", "module"]` yields
    /// every `<module>` under the first `<modules>`.
    pub fn path<'a>(&'a self, names: &[&str]) -> Vec<&'a XmlElement> {
        let mut current = vec![self];
        for name in names {
            current = current
                .into_iter()
                .flat_map(|e| e.elements().filter(|c| c.is(name)).collect::<Vec<_>>())
                .collect();
        }
        current
    }

    /// Trimmed text content, `None` when empty.
    pub fn text(&self) -> Option<String> {
        let mut text = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(t) | XmlNode::CData(t) => text.push_str(t),
                _ => {}
            }
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(XmlElement::text)
    }

    pub fn push(&mut self, element: XmlElement) -> &mut XmlElement {
        self.children.push(XmlNode::Element(element));
        match self.children.last_mut() {
            Some(XmlNode::Element(e)) => e,
            _ => unreachable!("element was just pushed"),
        }
    }

    /// Returns the first child called `name`, appending an empty one if needed.
    pub fn child_or_insert(&mut self, name: &str) -> &mut XmlElement {
        let idx = self
            .children
            .iter()
            .position(|node| matches!(node, XmlNode::Element(e) if e.is(name)));
        match idx {
            Some(i) => match &mut self.children[i] {
                XmlNode::Element(e) => e,
                _ => unreachable!("position matched an element"),
            },
            None => self.push(XmlElement::new(name)),
        }
    }

    /// Removes direct child elements matching `pred`; returns how many went.
    pub fn remove_elements<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&XmlElement) -> bool,
    {
        let before = self.children.len();
        self.children.retain(|node| match node {
            XmlNode::Element(e) => !pred(e),
            _ => true,
        });
        before - self.children.len()
    }

    /// Depth-first visit of every element below this one, skipping subtrees
    /// whose root name is in `skip`.
    pub fn descendants_except<'a>(&'a self, skip: &[&str], out: &mut Vec<&'a XmlElement>) {
        for child in self.elements() {
            if skip.contains(&child.local_name()) {
                continue;
            }
            out.push(child);
            child.descendants_except(skip, out);
        }
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for node in &self.children {
            match node {
                XmlNode::Element(e) => e.write_to(writer)?,
                XmlNode::Text(t) => {
                    writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(t))))?
                }
                XmlNode::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
                XmlNode::Comment(t) => {
                    writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

impl XmlDocument {
    /// Parses `content`; `path` is only used for error messages.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut declaration = None;
        let mut prolog_comments = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| BomError::xml_parse(path, e))?;
            match event {
                Event::Decl(decl) => {
                    declaration = Some(read_declaration(path, &decl)?);
                }
                Event::Start(start) => {
                    stack.push(read_start(path, &start)?);
                }
                Event::Empty(start) => {
                    let element = read_start(path, &start)?;
                    attach(path, &mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| BomError::xml_parse(path, "unexpected closing tag"))?;
                    attach(path, &mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|e| BomError::xml_parse(path, e))?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(value.into_owned()));
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::CData(value));
                    }
                }
                Event::Comment(comment) => {
                    let value = String::from_utf8_lossy(&comment).into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Comment(value)),
                        None if root.is_none() => prolog_comments.push(value),
                        None => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(BomError::xml_parse(path, "unexpected end of document"));
        }

        let root = root.ok_or_else(|| BomError::xml_parse(path, "document has no root element"))?;
        Ok(Self {
            declaration,
            prolog_comments,
            root,
        })
    }

    /// Serializes with two-space indentation and a trailing newline.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        if let Some(decl) = &self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
        }
        for comment in &self.prolog_comments {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
        }
        self.root.write_to(&mut writer)?;

        let mut output = String::from_utf8(writer.into_inner()).map_err(|e| {
            BomError::ProcessingError {
                message: format!("serialized XML is not UTF-8: {}", e),
            }
        })?;
        output.push('\n');
        Ok(output)
    }
}

fn read_start(path: &Path, start: &BytesStart) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = XmlElement::new(&name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| BomError::xml_parse(path, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| BomError::xml_parse(path, e))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn read_declaration(path: &Path, decl: &BytesDecl) -> Result<XmlDeclaration> {
    let version = decl.version().map_err(|e| BomError::xml_parse(path, e))?;
    let encoding = match decl.encoding() {
        Some(enc) => Some(enc.map_err(|e| BomError::xml_parse(path, e))?),
        None => None,
    };
    let standalone = match decl.standalone() {
        Some(sa) => Some(sa.map_err(|e| BomError::xml_parse(path, e))?),
        None => None,
    };
    Ok(XmlDeclaration {
        version: String::from_utf8_lossy(&version).into_owned(),
        encoding: encoding.map(|e| String::from_utf8_lossy(&e).into_owned()),
        standalone: standalone.map(|s| String::from_utf8_lossy(&s).into_owned()),
    })
}

fn attach(
    path: &Path,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(BomError::xml_parse(path, "more than one root element")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <!-- coordinates -->
    <groupId>com.example</groupId>
    <artifactId>demo</artifactId>
    <modules>
        <module>core</module>
        <module>web</module>
    </modules>
    <description>a &amp; b</description>
    <packaging/>
</project>
"#;

    fn parse(content: &str) -> Result<XmlDocument> {
        XmlDocument::parse(Path::new("pom.xml"), content)
    }

    #[test]
    fn test_parse_builds_tree() {
        let doc = parse(SAMPLE).unwrap();
        assert_eq!(doc.root.name, "project");
        assert_eq!(doc.root.child_text("groupId").as_deref(), Some("com.example"));
        assert_eq!(doc.root.child_text("description").as_deref(), Some("a & b"));
        assert!(doc.root.child("packaging").is_some());
        assert_eq!(doc.root.child_text("packaging"), None);

        let modules: Vec<String> = doc
            .root
            .path(&["modules", "module"])
            .iter()
            .filter_map(|m| m.text())
            .collect();
        assert_eq!(modules, vec!["core", "web"]);

        let decl = doc.declaration.unwrap();
        assert_eq!(decl.version, "1.0");
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn test_serialize_is_indented_and_stable() {
        let doc = parse(SAMPLE).unwrap();
        let first = doc.to_xml_string().unwrap();
        let reparsed = parse(&first).unwrap();
        assert_eq!(reparsed, doc);
        assert_eq!(reparsed.to_xml_string().unwrap(), first);

        assert!(first.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project"));
        assert!(first.contains("\n  <groupId>com.example</groupId>\n"));
        assert!(first.contains("\n    <module>core</module>\n"));
        assert!(first.contains("<description>a &amp; b</description>"));
        assert!(first.contains("<!-- coordinates -->"));
        assert!(first.ends_with("</project>\n"));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        let err = parse("<project><groupId>x</artifactId></project>").unwrap_err();
        assert!(matches!(err, BomError::XmlParseError { .. }));

        let err = parse("<project><groupId>x</groupId>").unwrap_err();
        assert!(matches!(err, BomError::XmlParseError { .. }));

        let err = parse("").unwrap_err();
        assert!(matches!(err, BomError::XmlParseError { .. }));
    }

    #[test]
    fn test_element_editing() {
        let mut root = XmlElement::new("project");
        root.push(XmlElement::with_text("version", "1.0"));
        root.child_or_insert("properties")
            .push(XmlElement::with_text("junit.version", "4.13"));
        root.child_or_insert("properties")
            .push(XmlElement::with_text("slf4j.version", "2.0"));

        assert_eq!(root.children_named("properties").count(), 1);
        assert_eq!(root.child("properties").unwrap().elements().count(), 2);

        let removed = root.remove_elements(|e| e.is("version"));
        assert_eq!(removed, 1);
        assert!(root.child("version").is_none());
    }

    #[test]
    fn test_local_name_strips_prefix() {
        assert_eq!(local_name("mvn:project"), "project");
        assert_eq!(local_name("project"), "project");
    }
}
