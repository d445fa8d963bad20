use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, Lit, LitFloat, parse_macro_input, spanned::Spanned,
};

/// Variant attribute: #[weight(<expr>)]
#[proc_macro_derive(WeightedEnum, attributes(weight))]
pub fn derive_weighted_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_ident = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "WeightedEnum can only be derived for enums",
        ));
    };

    let mut entries = Vec::with_capacity(data_enum.variants.len());

    for variant in &data_enum.variants {
        // Each variant is one item, so it must be a plain value
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "WeightedEnum only supports fieldless variants",
            ));
        }

        let Some(weight) = weight_expr(&variant.attrs)? else {
            return Err(syn::Error::new(
                variant.span(),
                "missing #[weight(...)] on variant",
            ));
        };

        let ident = &variant.ident;
        let weight = to_f64_expr(weight);
        entries.push(quote! { (Self::#ident, (#weight) as f64) });
    }

    Ok(quote! {
        impl ::weighted_collection::WeightedEnum for #enum_ident {
            const ENTRIES: &'static [(Self, f64)] = &[
                #(#entries),*
            ];
        }

        impl #enum_ident {
            /// Build an `ImmutableWeightedCollection<#enum_ident>` from the annotated weights.
            pub fn collection() -> ::core::result::Result<
                ::weighted_collection::ImmutableWeightedCollection<Self>,
                ::weighted_collection::ProbError,
            >
            where
                Self: Copy,
            {
                <Self as ::weighted_collection::WeightedEnum>::collection()
            }
        }
    })
}

/// Find `#[weight(...)]` and parse its contents as an expression
/// (e.g. `1.0/100.0` or `1/100`). The last one wins if repeated.
fn weight_expr(attrs: &[Attribute]) -> syn::Result<Option<Expr>> {
    let mut found = None;
    for Attribute { meta, .. } in attrs {
        if !meta.path().is_ident("weight") {
            continue;
        }
        let syn::Meta::List(list) = meta else {
            return Err(syn::Error::new(meta.span(), "use #[weight(<expr>)]"));
        };
        let expr = syn::parse2::<Expr>(list.tokens.clone())
            .map_err(|e| syn::Error::new(list.span(), format!("invalid weight expr: {e}")))?;
        found = Some(expr);
    }
    Ok(found)
}

/// Turn every integer literal in a weight expression into a float literal,
/// so `1/100` divides as `1.0/100.0` instead of truncating to zero.
/// Only arithmetic shapes are walked; anything else is left to the
/// trailing `as f64` cast.
fn to_f64_expr(expr: Expr) -> Expr {
    match expr {
        Expr::Lit(mut lit) => {
            if let Lit::Int(int) = &lit.lit {
                let promoted = format!("{}.0", int.base10_digits());
                lit.lit = Lit::Float(LitFloat::new(&promoted, int.span()));
            }
            Expr::Lit(lit)
        }
        Expr::Binary(mut bin) => {
            *bin.left = to_f64_expr(*bin.left);
            *bin.right = to_f64_expr(*bin.right);
            Expr::Binary(bin)
        }
        Expr::Paren(mut paren) => {
            *paren.expr = to_f64_expr(*paren.expr);
            Expr::Paren(paren)
        }
        Expr::Group(mut group) => {
            *group.expr = to_f64_expr(*group.expr);
            Expr::Group(group)
        }
        Expr::Unary(mut unary) => {
            *unary.expr = to_f64_expr(*unary.expr);
            Expr::Unary(unary)
        }
        other => other,
    }
}
