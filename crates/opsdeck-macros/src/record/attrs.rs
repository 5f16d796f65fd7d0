//! Attribute parsing for the Record derive macro.
//!
//! Field attributes:
//!
//! - `#[record]` exposes the field under its Rust name
//! - `#[record(rename = "...")]` exposes it under another name
//! - `#[record(skip)]` hides it even when the container opts everything in
//!
//! Container attributes:
//!
//! - `#[record(rename_all = "camelCase")]` renames every exposed field
//! - `#[record(all)]` exposes every field without a field attribute

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, Meta, Result, Token,
};

/// Case convention applied by `rename_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    /// `openRate`
    CamelCase,
    /// `OpenRate`
    PascalCase,
    /// `open_rate`
    SnakeCase,
    /// `OPEN_RATE`
    ScreamingSnakeCase,
    /// `open-rate`
    KebabCase,
    /// `openrate`
    LowerCase,
}

impl RenameRule {
    /// Parse a rule from its serde-style name.
    pub fn from_str(s: &str, span: Span) -> Result<Self> {
        match s {
            "camelCase" => Ok(RenameRule::CamelCase),
            "PascalCase" => Ok(RenameRule::PascalCase),
            "snake_case" => Ok(RenameRule::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Ok(RenameRule::ScreamingSnakeCase),
            "kebab-case" => Ok(RenameRule::KebabCase),
            "lowercase" => Ok(RenameRule::LowerCase),
            other => Err(Error::new(
                span,
                format!(
                    "unknown rename rule: '{}'. Expected one of: camelCase, PascalCase, snake_case, SCREAMING_SNAKE_CASE, kebab-case, lowercase",
                    other
                ),
            )),
        }
    }

    /// Applies the rule to a snake_case Rust field name.
    pub fn apply(self, field: &str) -> String {
        let field = field.trim_start_matches("r#");
        match self {
            RenameRule::SnakeCase => field.to_string(),
            RenameRule::ScreamingSnakeCase => field.to_ascii_uppercase(),
            RenameRule::KebabCase => field.replace('_', "-"),
            RenameRule::LowerCase => field.replace('_', ""),
            RenameRule::CamelCase | RenameRule::PascalCase => {
                let mut out = String::with_capacity(field.len());
                let mut upper_next = self == RenameRule::PascalCase;
                for c in field.chars() {
                    if c == '_' {
                        upper_next = !out.is_empty() || self == RenameRule::PascalCase;
                    } else if upper_next {
                        out.push(c.to_ascii_uppercase());
                        upper_next = false;
                    } else {
                        out.push(c);
                    }
                }
                out
            }
        }
    }
}

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone)]
pub struct RecordAttr {
    /// The field carries a `#[record]` attribute.
    pub present: bool,
    /// Hide this field.
    pub skip: bool,
    /// Custom field name for queries.
    pub rename: Option<String>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for RecordAttr {
    fn default() -> Self {
        RecordAttr {
            present: false,
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for RecordAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RecordAttr {
            present: true,
            ..RecordAttr::default()
        };

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => {
                    attr.skip = true;
                    attr.span = p.span();
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_value(&nv.value, "rename")?);
                    attr.span = nv.span();
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Container-level attributes from `#[record(...)]` on the struct.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    /// Case convention for exposed names.
    pub rename_all: Option<RenameRule>,
    /// Expose fields that carry no field attribute.
    pub all: bool,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("all") => attr.all = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    let rule = string_value(&nv.value, "rename_all")?;
                    attr.rename_all = Some(RenameRule::from_str(&rule, nv.value.span())?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record container attribute. Expected: all or rename_all = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

fn string_value(expr: &syn::Expr, name: &str) -> Result<String> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(Error::new(
            other.span(),
            format!("{} must be a string literal", name),
        )),
    }
}

/// Extract `#[record(...)]` from a field's attributes.
///
/// A bare `#[record]` marks the field as exposed with no options.
pub fn parse_record_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return match &attr.meta {
                Meta::Path(p) => Ok(RecordAttr {
                    present: true,
                    span: p.span(),
                    ..RecordAttr::default()
                }),
                _ => attr.parse_args::<RecordAttr>(),
            };
        }
    }
    Ok(RecordAttr::default())
}

/// Extract `#[record(...)]` from the struct's attributes.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<ContainerAttr>();
        }
    }
    Ok(ContainerAttr::default())
}
