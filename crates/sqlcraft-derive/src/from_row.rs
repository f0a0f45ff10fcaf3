//! FromRow derive macro implementation

use crate::attrs::{field_attrs, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(&input, "FromRow")?;

    let mut field_extracts = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = field_attrs(field)?;
        let ident = &field.ident;
        let column = attrs.column;
        field_extracts.push(if attrs.skip {
            quote! { #ident: ::core::default::Default::default() }
        } else {
            quote! { #ident: row.try_get_column(#column)? }
        });
    }

    Ok(quote! {
        impl #impl_generics ::sqlcraft::FromRow<::sqlcraft::tokio_postgres::Row>
            for #name #ty_generics #where_clause
        {
            fn from_row(
                row: &::sqlcraft::tokio_postgres::Row,
            ) -> ::sqlcraft::SqlResult<Self> {
                use ::sqlcraft::RowExt;
                Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}
