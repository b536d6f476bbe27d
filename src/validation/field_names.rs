//! Display names for struct fields in validation messages.
//!
//! Rust has no runtime struct tags, so a validated type lists its fields once
//! through [`Describe`]. The engine turns that list into a [`FieldNames`]
//! mapping the first time it validates the type. Fields holding nested
//! validated types point at that type's metadata with [`FieldMeta::nested`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Declared metadata of one struct field.
///
/// Tag values follow the usual `name,options` convention: only the part before
/// the first comma is used, and `-` hides the field name from messages.
#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    /// The Rust field name, as reported by `validator`.
    pub name: &'static str,
    /// Human-readable label in the application's language.
    pub label: Option<&'static str>,
    /// Name on the wire, usually the `serde` name.
    pub wire: Option<&'static str>,
    /// Name in form submissions.
    pub form: Option<&'static str>,
    /// Metadata of the validated type held by this field, for
    /// `#[validate(nested)]` structs and collections of them.
    pub nested: Option<fn() -> &'static [FieldMeta]>,
}

impl FieldMeta {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            label: None,
            wire: None,
            form: None,
            nested: None,
        }
    }

    pub const fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub const fn wire(mut self, wire: &'static str) -> Self {
        self.wire = Some(wire);
        self
    }

    pub const fn form(mut self, form: &'static str) -> Self {
        self.form = Some(form);
        self
    }

    /// Names failures inside this field with `fields`, usually `Inner::fields`.
    pub const fn nested(mut self, fields: fn() -> &'static [FieldMeta]) -> Self {
        self.nested = Some(fields);
        self
    }

    fn tag(&self, source: NameSource) -> Option<&'static str> {
        match source {
            NameSource::Localized => self.label,
            NameSource::Wire => self.wire,
            NameSource::Form => self.form,
            NameSource::Declared => Some(self.name),
        }
    }
}

/// Types whose validation messages use declared field names.
///
/// ```rust,ignore
/// impl Describe for SignUp {
///     fn fields() -> &'static [FieldMeta] {
///         const FIELDS: &[FieldMeta] = &[
///             FieldMeta::new("email").label("邮箱地址").wire("email"),
///             FieldMeta::new("phone").label("手机号码").wire("phone"),
///         ];
///         FIELDS
///     }
/// }
/// ```
pub trait Describe {
    /// Field metadata in declaration order.
    fn fields() -> &'static [FieldMeta];
}

/// A place a display name can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Localized,
    Wire,
    Form,
    Declared,
}

/// Resolved field name → display name mapping for one type.
#[derive(Debug, Clone, Default)]
pub struct FieldNames {
    display: HashMap<&'static str, String>,
    order: HashMap<&'static str, usize>,
    nested: HashMap<&'static str, Arc<NestedNames>>,
    sources: Vec<NameSource>,
}

/// Mapping of a nested type, built on first use so recursive types terminate.
#[derive(Debug)]
struct NestedNames {
    fields: fn() -> &'static [FieldMeta],
    names: OnceLock<Arc<FieldNames>>,
}

impl FieldNames {
    /// Sources checked in order; the first non-empty value wins.
    pub const DEFAULT_ORDER: [NameSource; 4] = [
        NameSource::Localized,
        NameSource::Wire,
        NameSource::Form,
        NameSource::Declared,
    ];

    pub fn build(fields: &[FieldMeta], sources: &[NameSource]) -> Self {
        let mut names = Self {
            sources: sources.to_vec(),
            ..Self::default()
        };

        for (position, field) in fields.iter().enumerate() {
            let display = resolve(field, sources);
            let nested = field.nested.map(|fields| {
                Arc::new(NestedNames {
                    fields,
                    names: OnceLock::new(),
                })
            });

            names.display.insert(field.name, display.clone());
            names.order.insert(field.name, position);
            if let Some(nested) = &nested {
                names.nested.insert(field.name, Arc::clone(nested));
            }

            // `validator` reports the serde name when a field is renamed.
            if let Some(wire) = field.wire.map(first_segment)
                && !wire.is_empty()
                && wire != "-"
                && wire != field.name
            {
                names.display.entry(wire).or_insert(display);
                names.order.entry(wire).or_insert(position);
                if let Some(nested) = nested {
                    names.nested.entry(wire).or_insert(nested);
                }
            }
        }

        names
    }

    /// Display name for a reported field, or the field itself if undeclared.
    pub fn display<'a>(&'a self, field: &'a str) -> Cow<'a, str> {
        match self.display.get(field) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Borrowed(field),
        }
    }

    /// Declaration position of a reported field.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.order.get(field).copied()
    }

    /// Mapping for the type nested in `field`, if it was declared.
    pub fn nested(&self, field: &str) -> Option<Arc<FieldNames>> {
        let nested = self.nested.get(field)?;
        let names = nested
            .names
            .get_or_init(|| Arc::new(FieldNames::build((nested.fields)(), &self.sources)));
        Some(Arc::clone(names))
    }
}

fn resolve(field: &FieldMeta, sources: &[NameSource]) -> String {
    for &source in sources {
        let Some(tag) = field.tag(source) else {
            continue;
        };
        let name = first_segment(tag);
        if name == "-" {
            return String::new();
        }
        if !name.is_empty() {
            return name.to_string();
        }
    }
    field.name.to_string()
}

fn first_segment(tag: &str) -> &str {
    tag.split(',').next().unwrap_or_default().trim()
}
