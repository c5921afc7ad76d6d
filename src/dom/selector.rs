//! A small CSS selector engine for the in-memory document.
//!
//! Supported: type (`div`), universal (`*`), class (`.a`), id (`#a`),
//! attribute presence/equality (`[data-x]`, `[data-x=y]`, `[data-x="y"]`),
//! compounds of those, the descendant combinator and `,` groups.

use crate::error::DomError;

/// Read access to an element tree, as needed for matching.
pub trait ElementTree {
    type Id: Copy;

    /// Lowercase tag name, `None` for non-element nodes.
    fn tag_name(&self, id: Self::Id) -> Option<&str>;
    fn attribute(&self, id: Self::Id, name: &str) -> Option<&str>;
    fn has_class_name(&self, id: Self::Id, class: &str) -> bool;
    fn parent_element(&self, id: Self::Id) -> Option<Self::Id>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Present(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches<T: ElementTree>(&self, tree: &T, node: T::Id) -> bool {
        let Some(tag) = tree.tag_name(node) else {
            return false;
        };
        if let Some(want) = &self.tag
            && want != tag
        {
            return false;
        }
        if let Some(want) = &self.id
            && tree.attribute(node, "id") != Some(want.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| tree.has_class_name(node, c)) {
            return false;
        }
        self.attrs.iter().all(|attr| match attr {
            AttrMatch::Present(name) => tree.attribute(node, name).is_some(),
            AttrMatch::Equals(name, value) => tree.attribute(node, name) == Some(value.as_str()),
        })
    }
}

/// Compounds joined by descendant combinators, leftmost first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
}

impl Complex {
    fn matches<T: ElementTree>(&self, tree: &T, node: T::Id) -> bool {
        let Some((last, ancestors)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(tree, node) {
            return false;
        }
        // With only descendant combinators, matching each remaining compound
        // against the nearest qualifying ancestor is complete.
        let mut cursor = tree.parent_element(node);
        for part in ancestors.iter().rev() {
            loop {
                let Some(current) = cursor else {
                    return false;
                };
                cursor = tree.parent_element(current);
                if part.matches(tree, current) {
                    break;
                }
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    groups: Vec<Complex>,
}

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self, DomError> {
        let invalid = || DomError::InvalidSelector(source.to_string());
        let mut groups = Vec::new();
        for group in source.split(',') {
            let mut parts = Vec::new();
            for token in group.split_whitespace() {
                parts.push(parse_compound(token).ok_or_else(invalid)?);
            }
            if parts.is_empty() {
                return Err(invalid());
            }
            groups.push(Complex { parts });
        }
        Ok(Self {
            source: source.to_string(),
            groups,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches<T: ElementTree>(&self, tree: &T, node: T::Id) -> bool {
        self.groups.iter().any(|g| g.matches(tree, node))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> Option<String> {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    (*pos > start).then(|| chars[start..*pos].iter().collect())
}

fn parse_compound(token: &str) -> Option<Compound> {
    let chars: Vec<char> = token.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();
    if chars.first() == Some(&'*') {
        pos = 1;
    } else if chars.first().is_some_and(|c| is_ident_char(*c)) {
        compound.tag = Some(take_ident(&chars, &mut pos)?.to_ascii_lowercase());
    }
    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                pos += 1;
                compound.classes.push(take_ident(&chars, &mut pos)?);
            }
            '#' => {
                pos += 1;
                compound.id = Some(take_ident(&chars, &mut pos)?);
            }
            '[' => {
                pos += 1;
                let name = take_ident(&chars, &mut pos)?;
                match *chars.get(pos)? {
                    ']' => {
                        pos += 1;
                        compound.attrs.push(AttrMatch::Present(name));
                    }
                    '=' => {
                        pos += 1;
                        let close = chars[pos..].iter().position(|c| *c == ']')? + pos;
                        let raw: String = chars[pos..close].iter().collect();
                        let value = raw.trim_matches(|c| c == '"' || c == '\'').to_string();
                        pos = close + 1;
                        compound.attrs.push(AttrMatch::Equals(name, value));
                    }
                    _ => return None,
                }
            }
            _ => return None,
        }
    }
    Some(compound)
}
