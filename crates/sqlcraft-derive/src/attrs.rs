//! Parsing of `#[sqlcraft(...)]` attributes.

use syn::ext::IdentExt;
use syn::{DeriveInput, Field, LitStr, Result};

const ATTR: &str = "sqlcraft";

/// Struct-level `#[sqlcraft(table = "...")]`.
pub(crate) fn table_name(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident(ATTR)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                table = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported sqlcraft attribute, expected `table`"))
            }
        })?;
    }
    Ok(table)
}

/// Field-level attributes.
pub(crate) struct FieldAttrs {
    /// Column name, defaults to the field name.
    pub column: String,
    /// `#[sqlcraft(skip)]`: not a column.
    pub skip: bool,
}

pub(crate) fn field_attrs(field: &Field) -> Result<FieldAttrs> {
    let mut column = None;
    let mut skip = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident(ATTR)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let value: LitStr = meta.value()?.parse()?;
                column = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported sqlcraft attribute, expected `column` or `skip`"))
            }
        })?;
    }

    let column = match column {
        Some(column) => column,
        None => field
            .ident
            .as_ref()
            .map(|ident| ident.unraw().to_string())
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?,
    };
    Ok(FieldAttrs { column, skip })
}

/// Named fields of a struct, or an error naming the derive.
pub(crate) fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> Result<&'a syn::punctuated::Punctuated<Field, syn::Token![,]>> {
    match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}
