use proc_macro::TokenStream;
use quote::quote;

use syn::spanned::Spanned as _;
use syn::{Data, DeriveInput, Error, GenericArgument, LitStr, PathArguments, Type};

const PARAM_ATTR: &str = "param";
const SERVICE_ATTR: &str = "service";

enum Source {
    Param(LitStr),
    Service(LitStr),
}

fn extract_arc_type(ty: &Type) -> Option<Type> {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == "Arc"
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(inner)) = args.args.first()
    {
        return Some(inner.clone());
    }
    None
}

fn extract_source(field: &syn::Field) -> Result<Source, Error> {
    let mut source = None;
    for attr in &field.attrs {
        let make: fn(LitStr) -> Source = if attr.path().is_ident(PARAM_ATTR) {
            Source::Param
        } else if attr.path().is_ident(SERVICE_ATTR) {
            Source::Service
        } else {
            continue;
        };
        if source.is_some() {
            return Err(Error::new(
                attr.span(),
                format!("Only one of #[{PARAM_ATTR}] or #[{SERVICE_ATTR}] allowed"),
            ));
        }
        source = Some(make(attr.parse_args::<LitStr>()?));
    }
    source.ok_or_else(|| {
        Error::new(
            field.span(),
            format!("Field must use #[{PARAM_ATTR}(\"name\")] or #[{SERVICE_ATTR}(\"name\")]"),
        )
    })
}

/// Derive macro for the Inject trait.
///
/// Every field is looked up by name with `#[param("name")]` or `#[service("name")]`.
/// Fields of type `Arc<T>` receive the shared value, other fields receive a clone.
#[proc_macro_derive(Inject, attributes(param, service))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    handle_derive_inject(input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn handle_derive_inject(input: DeriveInput) -> Result<proc_macro2::TokenStream, Error> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(s) => &s.fields,
        _ => return Err(Error::new(name.span(), "Only structs are supported")),
    };

    let mut field_lets = Vec::new();
    let mut field_inits = Vec::new();

    match fields {
        syn::Fields::Named(fields) => {
            for field in &fields.named {
                let field_ident = field
                    .ident
                    .as_ref()
                    .ok_or_else(|| Error::new(field.span(), "Expected named field"))?;
                let field_ty = &field.ty;
                let (lookup, key) = match extract_source(field)? {
                    Source::Param(key) => (quote! { param_as }, key),
                    Source::Service(key) => (quote! { service_as }, key),
                };

                if let Some(inner_type) = extract_arc_type(field_ty) {
                    field_lets.push(quote! {
                        let #field_ident = ::vial::ResolverExt::#lookup::<#inner_type>(resolver, #key)?;
                    });
                } else {
                    field_lets.push(quote! {
                        let #field_ident = ::std::clone::Clone::clone(
                            ::vial::ResolverExt::#lookup::<#field_ty>(resolver, #key)?.as_ref(),
                        );
                    });
                }
                field_inits.push(quote! { #field_ident });
            }
        }
        syn::Fields::Unnamed(_) => {
            return Err(Error::new(name.span(), "Tuple structs are not supported"));
        }
        syn::Fields::Unit => {}
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::vial::Inject for #name #ty_generics #where_clause {
            fn inject(
                resolver: &dyn ::vial::Resolver
            ) -> ::std::result::Result<Self, ::vial::StdError> {
                #(#field_lets)*
                Ok(Self {
                    #(#field_inits,)*
                })
            }
        }
    })
}
