//! Implementation of the `#[derive(Record)]` macro.
//!
//! This macro generates an implementation of the `Record` trait and field
//! name constants for type-safe query building.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_container_attrs, parse_record_attrs};

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let container = parse_container_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut names: Vec<String> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_record_attrs(&field.attrs)?;

        if attrs.skip {
            if attrs.rename.is_some() {
                return Err(Error::new(attrs.span, "a skipped field cannot be renamed"));
            }
            continue;
        }
        if !attrs.present && !container.all {
            continue;
        }

        let rust_name = field_name.to_string();
        let query_name = match (attrs.rename, container.rename_all) {
            (Some(rename), _) => rename,
            (None, Some(rule)) => rule.apply(&rust_name),
            (None, None) => rust_name.trim_start_matches("r#").to_string(),
        };

        if names.contains(&query_name) {
            return Err(Error::new(
                field.span(),
                format!("duplicate record field name '{}'", query_name),
            ));
        }
        names.push(query_name.clone());

        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));

        field_constants.push(quote! {
            /// Field name constant for type-safe queries.
            pub const #const_name: &'static str = #query_name;
        });

        field_matches.push(quote! {
            #query_name => ::opsdeck_query::ToValue::to_value(&self.#field_name),
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*

            /// Names of all record fields, in declaration order.
            pub const RECORD_FIELDS: &'static [&'static str] = &[#(#names),*];
        }

        impl #impl_generics ::opsdeck_query::Record for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::opsdeck_query::Value<'_> {
                match field {
                    #(#field_matches)*
                    _ => ::opsdeck_query::Value::None,
                }
            }
        }
    };

    Ok(expanded)
}

/// Convert a field name to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}
