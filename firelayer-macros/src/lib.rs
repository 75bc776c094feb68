//! Procedural macros for the firelayer project.
//!
//! `#[derive(Model)]` implements `firelayer::model::Model` for a struct with named
//! fields. The struct needs an `id: Option<String>` field and a `DocMeta` field;
//! fields typed `SubCollection<T>` are registered as subcollections and bound to the
//! owner's document path.
//!
//! ```ignore
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Model)]
//! #[model(collection = "library_books")]
//! pub struct Book {
//!     #[serde(default)]
//!     pub id: Option<String>,
//!     pub title: String,
//!     #[serde(skip)]
//!     pub tags: SubCollection<Tag>,
//!     #[serde(skip)]
//!     meta: DocMeta,
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as firelayer_macros;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Fields, GenericArgument, Ident, LitStr, PathArguments, Type,
    parse_macro_input, spanned::Spanned,
};

#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_model(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct ModelArgs {
    name: Option<LitStr>,
    collection: Option<LitStr>,
}

fn parse_model_args(input: &DeriveInput) -> syn::Result<ModelArgs> {
    let mut args = ModelArgs::default();

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("model")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                args.name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("collection") {
                args.collection = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `name` or `collection`"))
            }
        })?;
    }

    Ok(args)
}

/// Returns the last path segment of a plain type path, e.g. `DocMeta` for `firelayer::DocMeta`.
fn type_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        _ => None,
    }
}

/// Returns `T` when the type is `SubCollection<T>`.
fn subcollection_member(ty: &Type) -> Option<&Type> {
    let segment = type_segment(ty).filter(|s| s.ident == "SubCollection")?;
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

fn expand_model(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let args = parse_model_args(input)?;
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "Model can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            input.span(),
            "Model requires a struct with named fields",
        ));
    };

    let mut has_id = false;
    let mut meta_field: Option<&Ident> = None;
    let mut field_entries = Vec::new();
    let mut bindings = Vec::new();

    for field in &fields.named {
        let Some(name) = field.ident.as_ref() else {
            continue;
        };
        let key = name.to_string();

        if key == "id" {
            has_id = true;
        } else if type_segment(&field.ty).is_some_and(|s| s.ident == "DocMeta") {
            meta_field = Some(name);
        } else if let Some(member) = subcollection_member(&field.ty) {
            field_entries.push(quote! {
                ::firelayer::model::Field::subcollection::<#member>(#key)
            });
            bindings.push(quote! {
                self.#name.bind(path);
            });
        } else {
            field_entries.push(quote! {
                ::firelayer::model::Field::value(#key)
            });
        }
    }

    if !has_id {
        return Err(syn::Error::new(
            ident.span(),
            "Model requires an `id: Option<String>` field",
        ));
    }
    let Some(meta_field) = meta_field else {
        return Err(syn::Error::new(
            ident.span(),
            "Model requires a field of type `DocMeta`",
        ));
    };

    let model_name = args
        .name
        .map(|lit| lit.value())
        .unwrap_or_else(|| ident.to_string());

    let collection_name = args.collection.map(|lit| {
        quote! {
            fn collection_name() -> ::std::string::String {
                ::std::string::String::from(#lit)
            }
        }
    });

    let bind = (!bindings.is_empty()).then(|| {
        quote! {
            fn bind_subcollections(&mut self, path: &str) {
                #(#bindings)*
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::firelayer::model::Model for #ident #ty_generics #where_clause {
            fn model_name() -> &'static str {
                #model_name
            }

            #collection_name

            fn fields() -> ::std::vec::Vec<::firelayer::model::Field> {
                ::std::vec![#(#field_entries),*]
            }

            fn id(&self) -> ::std::option::Option<&str> {
                self.id.as_deref()
            }

            fn set_id(&mut self, id: ::std::option::Option<::std::string::String>) {
                self.id = id;
            }

            fn meta(&self) -> &::firelayer::model::DocMeta {
                &self.#meta_field
            }

            fn meta_mut(&mut self) -> &mut ::firelayer::model::DocMeta {
                &mut self.#meta_field
            }

            #bind
        }
    })
}
