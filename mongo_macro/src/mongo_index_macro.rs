use proc_macro2::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Attribute, DeriveInput, LitStr, Token};

/// 单个 `#[mongo_index(...)]` 声明
struct IndexSpec {
    fields: Vec<String>,
    unique: bool,
    sort_order: i32,
    name: Option<String>,
}

impl IndexSpec {
    /// 未显式命名时沿用 MongoDB 的默认命名：`field_1_other_-1`
    fn resolved_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .fields
                .iter()
                .map(|f| format!("{}_{}", f, self.sort_order))
                .collect::<Vec<_>>()
                .join("_"),
        }
    }

    fn to_model(&self) -> TokenStream {
        let sort_order = self.sort_order;
        let keys = self.fields.iter().map(|field| quote! { keys.insert(#field, #sort_order); });
        let unique = self.unique;
        let name = self.resolved_name();
        quote! {
            {
                let mut keys = ::mongodb::bson::Document::new();
                #(#keys)*
                ::mongodb::IndexModel::builder()
                    .keys(keys)
                    .options(Some(
                        ::mongodb::options::IndexOptions::builder()
                            .unique(#unique)
                            .name(Some(#name.to_string()))
                            .build(),
                    ))
                    .build()
            }
        }
    }
}

fn parse_index_attr(attr: &Attribute) -> syn::Result<IndexSpec> {
    let mut spec = IndexSpec { fields: vec![], unique: false, sort_order: 1, name: None };

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("fields") {
            let content;
            syn::bracketed!(content in meta.input);
            let fields = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
            spec.fields.extend(fields.iter().map(LitStr::value));
            Ok(())
        } else if meta.path.is_ident("unique") {
            spec.unique = true;
            Ok(())
        } else if meta.path.is_ident("order") {
            let content;
            syn::parenthesized!(content in meta.input);
            let lit: LitStr = content.parse()?;
            spec.sort_order = if lit.value().eq_ignore_ascii_case("desc") { -1 } else { 1 };
            Ok(())
        } else if meta.path.is_ident("name") {
            let content;
            syn::parenthesized!(content in meta.input);
            let lit: LitStr = content.parse()?;
            spec.name = Some(lit.value());
            Ok(())
        } else {
            Err(meta.error("unsupported mongo_index option, expected fields/unique/order/name"))
        }
    })?;

    if spec.fields.is_empty() {
        return Err(syn::Error::new_spanned(attr, "mongo_index requires at least one field"));
    }
    Ok(spec)
}

pub fn expand_index_model_provider(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut models = vec![];
    for attr in ast.attrs.iter().filter(|a| a.path().is_ident("mongo_index")) {
        match parse_index_attr(attr) {
            Ok(spec) => models.push(spec.to_model()),
            Err(e) => return e.to_compile_error().into(),
        }
    }

    let gen = quote! {
        impl #impl_generics MongoIndexModelProvider for #name #ty_generics #where_clause {
            fn index_models() -> Vec<::mongodb::IndexModel> {
                vec![
                    #(#models),*
                ]
            }
        }
    };

    gen.into()
}
