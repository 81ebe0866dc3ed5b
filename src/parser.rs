use indexmap::IndexMap;
use log::trace;

use crate::section::Section;

/// What a single trimmed logical line declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    Blank,
    Comment,
    Section(&'a str),
    InlineAssignment { section: &'a str, rest: &'a str },
    Assignment { key: &'a str, value: &'a str },
    Unrecognized,
}

/// Join every line ending in a Line Continuator (`+`) with the line after it.
///
/// Must run before the text is split, so the continuation can never be mistaken for part of a
/// value or key.
pub(crate) fn splice_continuations(text: &str) -> String {
    text.replace("+\r\n", "").replace("+\n", "")
}

/// Split on `\n`, dropping one trailing `\r` so both Unix and Windows endings are accepted.
pub(crate) fn logical_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

pub(crate) fn classify(line: &str) -> Line<'_> {
    let line = line.trim();

    if line.is_empty() {
        return Line::Blank;
    }

    if line.starts_with(';') || line.starts_with('#') {
        return Line::Comment;
    }

    if line.starts_with('[') && line.ends_with(']') {
        return Line::Section(line[1..line.len() - 1].trim());
    }

    if (line.starts_with('[') || line.starts_with("/[")) && line.contains(']') {
        // The whole line loses its brackets first, so `/[s]k=v]` assigns `v` and a bare `/[s]`
        // has nothing left to split.
        let body = line
            .strip_prefix("/[")
            .or_else(|| line.strip_prefix('['))
            .unwrap_or(line);
        let body = body.strip_suffix(']').unwrap_or(body);

        return match body.split_once(']') {
            Some((section, rest)) => Line::InlineAssignment {
                section: section.trim(),
                rest,
            },
            None => Line::Unrecognized,
        };
    }

    classify_assignment(line)
}

fn classify_assignment(line: &str) -> Line<'_> {
    match line.split_once('=') {
        Some((key, value)) => {
            let value = value.trim();
            // A leading asterisk marks the value as locked; it carries no meaning here.
            let value = value.strip_prefix('*').unwrap_or(value);
            Line::Assignment {
                key: key.trim(),
                value,
            }
        }
        None => Line::Unrecognized,
    }
}

/// Applies parsed lines to a set of sections, remembering which section is current.
///
/// The cursor is borrowed from the owning document, so a second parse continues in whatever
/// section the first one ended in.
#[derive(Debug)]
pub(crate) struct Parser<'d> {
    sections: &'d mut IndexMap<String, Section>,
    cursor: &'d mut String,
}

impl<'d> Parser<'d> {
    pub(crate) fn new(sections: &'d mut IndexMap<String, Section>, cursor: &'d mut String) -> Self {
        Self { sections, cursor }
    }
}

impl Parser<'_> {
    pub(crate) fn parse(&mut self, text: &str) {
        let text = splice_continuations(text);

        for (i, line) in logical_lines(&text).enumerate() {
            match classify(line) {
                Line::Blank | Line::Comment => {}
                Line::Section(name) => self.enter_section(name),
                Line::InlineAssignment { section, rest } => {
                    self.enter_section(section);
                    match classify_assignment(rest.trim()) {
                        Line::Assignment { key, value } => self.assign(key, value),
                        _ => trace!("line {}: inline section without assignment", i + 1),
                    }
                }
                Line::Assignment { key, value } => self.assign(key, value),
                Line::Unrecognized => trace!("line {}: skipping unrecognized line", i + 1),
            }
        }
    }

    /// Select `name` as the current section, creating it on first sight.
    ///
    /// An empty name selects the implicit unnamed section without creating it.
    fn enter_section(&mut self, name: &str) {
        if !name.is_empty() && !self.sections.contains_key(name) {
            trace!("new section {name:?}");
            self.sections
                .insert(name.to_owned(), Section::new(name.to_owned()));
        }

        name.clone_into(&mut *self.cursor);
    }

    fn assign(&mut self, key: &str, value: &str) {
        let section = self
            .sections
            .entry(self.cursor.clone())
            .or_insert_with_key(|name| Section::new(name.clone()));

        section.insert(key.to_owned(), value.to_owned());
    }
}
