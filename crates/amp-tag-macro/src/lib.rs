//! `#[derive(Prototype)]` — declares the canonical tag expression a type owns.
//!
//! The canonical path is assembled from the declaration site, never from a
//! central table: `prefix . TypeName [. sub]`. The type name is appended the
//! same way the registry would reflect it, so two modules deriving under the
//! same prefix with distinct type names can never claim the same path.
//!
//! ```ignore
//! use amp_tag::Prototype;
//!
//! #[derive(Default, Prototype)]
//! #[tag(prefix = "session")]
//! struct LoginChallenge {
//!     challenge: Vec<u8>,
//! }
//!
//! // LoginChallenge::tag_expr().canonic() == "session.loginchallenge"
//! ```

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{DeriveInput, Ident, LitStr, parse_macro_input};

use proc_macro_crate::{FoundCrate, crate_name};

/// Attribute payload of `#[tag(prefix = "...", sub = "...")]`.
#[derive(Default)]
struct TagAttr {
    prefix: Option<String>,
    sub: Option<String>,
}

fn parse_tag_attr(input: &DeriveInput) -> syn::Result<TagAttr> {
    let mut out = TagAttr::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("tag") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("prefix") {
                let lit: LitStr = meta.value()?.parse()?;
                out.prefix = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("sub") {
                let lit: LitStr = meta.value()?.parse()?;
                out.sub = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("expected `prefix = \"...\"` or `sub = \"...\"`"))
            }
        })?;
    }

    Ok(out)
}

fn tag_crate_path() -> TokenStream2 {
    match crate_name("amp-tag") {
        Ok(FoundCrate::Itself) => quote!(amp_tag),
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(amp_tag),
    }
}

#[proc_macro_derive(Prototype, attributes(tag))]
pub fn derive_prototype(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &input.generics,
            "#[derive(Prototype)] does not support generic types: \
             a prototype owns exactly one canonical tag expression",
        )
        .to_compile_error()
        .into();
    }

    let attr = match parse_tag_attr(&input) {
        Ok(attr) => attr,
        Err(err) => return err.to_compile_error().into(),
    };

    let ident = &input.ident;
    let name_lit = LitStr::new(&ident.to_string(), ident.span());
    let prefix_lit = LitStr::new(attr.prefix.as_deref().unwrap_or(""), Span::call_site());
    let sub_lit = LitStr::new(attr.sub.as_deref().unwrap_or(""), Span::call_site());

    let tag_crate = tag_crate_path();

    // Empty prefix/sub terms are dropped by the expression canonicalizer,
    // so the unconfigured cases need no special casing here.
    let expanded = quote! {
        impl #tag_crate::Prototype for #ident {
            fn tag_expr() -> #tag_crate::TagExpr {
                static EXPR: ::std::sync::LazyLock<#tag_crate::TagExpr> =
                    ::std::sync::LazyLock::new(|| {
                        #tag_crate::TagExpr::from_expr(#prefix_lit)
                            .with(#name_lit)
                            .with(#sub_lit)
                    });
                EXPR.clone()
            }

            fn type_label() -> &'static str {
                #name_lit
            }
        }
    };

    expanded.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn parses_prefix_and_sub() {
        let input: DeriveInput = parse_quote! {
            #[tag(prefix = "session", sub = "v2")]
            struct PinRequest;
        };
        let attr = parse_tag_attr(&input).unwrap();
        assert_eq!(attr.prefix.as_deref(), Some("session"));
        assert_eq!(attr.sub.as_deref(), Some("v2"));
    }

    #[test]
    fn tag_attr_is_optional() {
        let input: DeriveInput = parse_quote! {
            struct Bare;
        };
        let attr = parse_tag_attr(&input).unwrap();
        assert!(attr.prefix.is_none());
        assert!(attr.sub.is_none());
    }

    #[test]
    fn rejects_unknown_keys() {
        let input: DeriveInput = parse_quote! {
            #[tag(path = "nope")]
            struct Bad;
        };
        assert!(parse_tag_attr(&input).is_err());
    }

    #[test]
    fn generated_impl_names_the_type() {
        let input: DeriveInput = parse_quote! {
            #[tag(prefix = "session")]
            struct LoginChallenge;
        };
        let attr = parse_tag_attr(&input).unwrap();
        let ident = &input.ident;
        let name_lit = LitStr::new(&ident.to_string(), ident.span());
        let prefix_lit = LitStr::new(attr.prefix.as_deref().unwrap_or(""), Span::call_site());
        let code = quote! { #prefix_lit #name_lit }.to_string();

        assert!(code.contains("\"session\""));
        assert!(code.contains("\"LoginChallenge\""));
    }
}
