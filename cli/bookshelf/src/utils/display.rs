//! Terminal rendering of normalized catalog records.

use std::fmt::Display;

use bookshelf_catalog::{CoverSize, SearchResult, WorkDetails};

pub(crate) const UNKNOWN_AUTHOR: &str = "<unknown author>";
const FIELD_PLACEHOLDER: &str = "-";

/// How many subjects the detail card lists before cutting off.
const SUBJECTS_SHOWN: usize = 10;

/// A column-aligned listing of search results.
///
/// The id column is printed first so it can be copied straight into
/// `bookshelf show`.
pub(crate) struct DisplayResults<'a> {
    items: &'a [&'a SearchResult],
}

impl<'a> DisplayResults<'a> {
    pub(crate) fn new(items: &'a [&'a SearchResult]) -> Self {
        Self { items }
    }
}

impl Display for DisplayResults<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id_width = self
            .items
            .iter()
            .map(|item| item.id.as_deref().unwrap_or(FIELD_PLACEHOLDER).len())
            .max()
            .unwrap_or_default();
        let title_width = self
            .items
            .iter()
            .map(|item| item.title.len())
            .max()
            .unwrap_or_default();

        let mut items = self.items.iter().peekable();
        while let Some(item) = items.next() {
            let id = item.id.as_deref().unwrap_or(FIELD_PLACEHOLDER);
            let authors = if item.author_name.is_empty() {
                UNKNOWN_AUTHOR
            } else {
                &item.author_name
            };
            let year = item
                .first_publish_year
                .map(|year| year.to_string())
                .unwrap_or_else(|| FIELD_PLACEHOLDER.to_string());
            write!(
                f,
                "{id:<id_width$}  {title:<title_width$}  {authors} ({year})",
                title = item.title,
            )?;
            if !item.short_desc.is_empty() {
                write!(f, "  {}", item.short_desc)?;
            }
            // Only print a newline if there are more items to print
            if items.peek().is_some() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// The detail card for a single work.
pub(crate) struct DisplayWork<'a>(pub(crate) &'a WorkDetails);

impl Display for DisplayWork<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let work = self.0;
        match work.cover_url(CoverSize::Large) {
            Some(url) => writeln!(f, "Cover: {url}")?,
            // Text-only placeholder when the record has no cover art.
            None => writeln!(f, "Cover: [no cover] {}", work.title)?,
        }
        writeln!(f, "Title: {}", work.title)?;
        writeln!(f, "Description: {}", or_placeholder(&work.description))?;
        writeln!(
            f,
            "First published: {}",
            work.first_publish_date.as_deref().unwrap_or(FIELD_PLACEHOLDER)
        )?;
        writeln!(
            f,
            "Created: {}",
            work.created.as_deref().unwrap_or(FIELD_PLACEHOLDER)
        )?;
        let subjects = work
            .subjects
            .iter()
            .take(SUBJECTS_SHOWN)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "Subjects: {}", or_placeholder(&subjects))?;
        write!(f, "Links: {}", work.links.len())
    }
}

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        FIELD_PLACEHOLDER
    } else {
        value
    }
}
