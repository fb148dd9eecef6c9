extern crate proc_macro;

mod mongo_index_macro;

use proc_macro::TokenStream;

/// 根据 `#[mongo_index(...)]` 属性生成 `MongoIndexModelProvider` 实现
///
/// ```ignore
/// #[derive(MongoIndexModelProvider)]
/// #[mongo_index(fields["alpha2Code"], unique)]
/// #[mongo_index(name("idx_a_b"), fields["a", "b"], order("desc"))]
/// struct Entity { .. }
/// ```
#[proc_macro_derive(MongoIndexModelProvider, attributes(mongo_index))]
pub fn mongo_index_model_provider(input: TokenStream) -> TokenStream {
    mongo_index_macro::expand_index_model_provider(input)
}
