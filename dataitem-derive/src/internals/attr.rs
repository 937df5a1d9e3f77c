// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

use syn::{Attribute, DeriveInput, Lit, Meta, MetaNameValue, NestedMeta};

use crate::internals::case::Case;

pub const DATAITEM: &str = "dataitem";
pub const RENAME_ALL: &str = "rename_all";
pub const RENAME: &str = "rename";
pub const TAG: &str = "tag";
pub const CONTENT: &str = "content";

/// How an enum's variant discriminant is carried on the wire. Built from
/// the container's `#[dataitem(tag = "...")]` / `#[dataitem(tag = "...",
/// content = "...")]` attributes.
#[derive(Clone, Debug)]
pub enum Tagged {
    Internally(String),
    Adjacently { tag: String, content: String },
}

impl Tagged {
    pub fn tag(&self) -> &str {
        match self {
            Tagged::Internally(tag) => tag,
            Tagged::Adjacently { tag, .. } => tag,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Tagged::Internally(_) => None,
            Tagged::Adjacently { content, .. } => Some(content),
        }
    }

    /// An internally-tagged variant's own field names must not collide
    /// with the tag key, or the generated map would carry two entries
    /// under the same name.
    pub fn guard_fields<'a>(&self, mut names: impl Iterator<Item = &'a syn::Ident>) {
        if let Tagged::Internally(tag) = self {
            if names.any(|name| name == tag) {
                panic!(
                    "field name collides with this enum's #[dataitem(tag = \"{}\")] key",
                    tag
                );
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Rules {
    pub casing: Option<Case>,
    pub tagged: Option<Tagged>,
}

impl Rules {
    pub fn new() -> Self {
        Rules::default()
    }

    pub fn from_input(input: &DeriveInput) -> Result<Self, &'static str> {
        let mut rules = Rules::new();
        let mut tag: Option<String> = None;
        let mut content: Option<String> = None;
        let metas = input.attrs.iter().flat_map(get_meta_items);

        for meta in metas {
            match meta {
                NestedMeta::Meta(Meta::NameValue(m)) if m.path.is_ident(RENAME_ALL) => {
                    rules.casing = Some(rename_all_rule(&m)?);
                },
                NestedMeta::Meta(Meta::NameValue(m)) if m.path.is_ident(TAG) => {
                    tag = Some(string_value(&m)?);
                },
                NestedMeta::Meta(Meta::NameValue(m)) if m.path.is_ident(CONTENT) => {
                    content = Some(string_value(&m)?);
                },
                _ => {},
            }
        }

        rules.tagged = match (tag, content) {
            (Some(tag), Some(content)) => Some(Tagged::Adjacently { tag, content }),
            (Some(tag), None) => Some(Tagged::Internally(tag)),
            (None, Some(_)) => return Err("#[dataitem(content = \"...\")] requires #[dataitem(tag = \"...\")]"),
            (None, None) => None,
        };

        Ok(rules)
    }
}

pub fn get_meta_items(attr: &Attribute) -> Vec<NestedMeta> {
    if !attr.path.is_ident(DATAITEM) {
        return Vec::new();
    }

    match attr.parse_meta() {
        Ok(Meta::List(meta)) => meta.nested.into_iter().collect(),
        Ok(_) => {
            panic!("expected #[dataitem(...)]")
        },
        Err(err) => {
            panic!("{}", err)
        },
    }
}

pub fn rename_all_rule(meta: &MetaNameValue) -> Result<Case, &'static str> {
    match &meta.lit {
        Lit::Str(casing) => casing.value().parse(),
        _ => Err("expected a string literal"),
    }
}

fn string_value(meta: &MetaNameValue) -> Result<String, &'static str> {
    match &meta.lit {
        Lit::Str(s) => Ok(s.value()),
        _ => Err("expected a string literal"),
    }
}

/// A field- or variant-level `#[dataitem(rename = "...")]`, independent
/// of the container's `rename_all` casing rule — an explicit rename wins
/// over the computed casing.
pub fn field_rename(attrs: &[Attribute]) -> Option<String> {
    attrs.iter().flat_map(get_meta_items).find_map(|meta| match meta {
        NestedMeta::Meta(Meta::NameValue(m)) if m.path.is_ident(RENAME) => string_value(&m).ok(),
        _ => None,
    })
}
