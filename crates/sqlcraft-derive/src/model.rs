//! Model derive macro implementation

use crate::attrs::{field_attrs, named_fields, table_name};
use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let table = table_name(&input)?.unwrap_or_else(|| name.to_string().to_snake_case());
    let fields = named_fields(&input, "Model")?;

    let mut columns = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = field_attrs(field)?;
        if attrs.skip {
            continue;
        }
        let ident = &field.ident;
        columns.push(attrs.column);
        values.push(quote! {
            ::sqlcraft::Value::from(::core::clone::Clone::clone(&self.#ident))
        });
    }

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Table name.
            pub const TABLE: &'static str = #table;

            /// Column names, in declaration order.
            pub const FIELDS: &'static [&'static str] = &[#(#columns),*];

            /// The table, declaring every column.
            pub fn table_ref() -> ::sqlcraft::Table {
                ::sqlcraft::Table::with_fields(Self::TABLE, Self::FIELDS)
            }
        }

        impl #impl_generics ::sqlcraft::Model for #name #ty_generics #where_clause {
            fn table(&self) -> ::sqlcraft::Table {
                Self::table_ref()
            }

            fn values(&self) -> ::std::vec::Vec<::sqlcraft::Value> {
                ::std::vec![#(#values),*]
            }
        }
    })
}
