//! In-process page rendering
//!
//! Renders `{{ name }}` placeholders the way the Amy server does when its
//! invalid-variable marker is set: unknown names become the sentinel instead
//! of an empty string. Values are HTML-escaped.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use amy_common::{Airport, Person, Site};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}\}").unwrap());

/// Values available to a template, addressed by dotted names
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Expose a person's fields under `prefix.`; unset optional fields stay unset.
    pub fn with_person(mut self, prefix: &str, person: &Person) -> Self {
        let mut put = |field: &str, value: Option<&str>| {
            if let Some(value) = value {
                self.values.insert(format!("{}.{}", prefix, field), value.to_string());
            }
        };
        put("personal", Some(person.personal.as_str()));
        put("middle", person.middle.as_deref());
        put("family", Some(person.family.as_str()));
        put("full_name", Some(person.full_name().as_str()));
        put("email", person.email.as_deref());
        put("gender", Some(person.gender.code()));
        put("github", person.github.as_deref());
        put("twitter", person.twitter.as_deref());
        put("url", person.url.as_deref());
        put("slug", Some(person.slug.as_str()));
        put("active", Some(if person.active { "yes" } else { "no" }));
        self
    }

    pub fn with_airport(self, prefix: &str, airport: &Airport) -> Self {
        self.with(format!("{}.iata", prefix), airport.iata.as_str())
            .with(format!("{}.fullname", prefix), airport.fullname.as_str())
            .with(format!("{}.country", prefix), airport.country.as_str())
            .with(format!("{}.latitude", prefix), airport.latitude.to_string())
            .with(format!("{}.longitude", prefix), airport.longitude.to_string())
    }

    pub fn with_site(self, prefix: &str, site: &Site) -> Self {
        self.with(format!("{}.domain", prefix), site.domain.as_str())
            .with(format!("{}.fullname", prefix), site.fullname.as_str())
            .with(format!("{}.country", prefix), site.country.as_str())
            .with(format!("{}.notes", prefix), site.notes.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Names referenced by the template, in order of first use
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&self.source) {
            if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn render(&self, context: &Context, sentinel: &str) -> String {
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures<'_>| match context.get(&caps[1]) {
                Some(value) => escape(value),
                None => sentinel.to_string(),
            })
            .into_owned()
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
