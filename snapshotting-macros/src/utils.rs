use proc_macro2::Span;
use quote::ToTokens;
use std::collections::HashSet;
use syn::{Attribute, Field, FieldsNamed, Ident, Path, Token, Type, punctuated::Punctuated};

/// 将 `required` 派生与已有 `#[derive(..)]` 合并为一个属性并置于最前（按末段名去重）
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<Path>) {
    let mut others = Vec::new();
    let mut existing = Vec::new();
    for attr in attrs.drain(..) {
        if !attr.path().is_ident("derive") {
            others.push(attr);
            continue;
        }
        match attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated) {
            Ok(list) => existing.extend(list),
            Err(_) => others.push(attr),
        }
    }

    let mut seen = HashSet::new();
    let merged: Vec<Path> = required
        .into_iter()
        .chain(existing)
        .filter(|p| seen.insert(derive_key(p)))
        .collect();

    attrs.push(syn::parse_quote!(#[derive(#(#merged),*)]));
    attrs.extend(others);
}

// Serialize 与 serde::Serialize 视为同一派生
fn derive_key(path: &Path) -> String {
    match path.segments.last() {
        Some(last) => last.ident.to_string(),
        None => path.to_token_stream().to_string(),
    }
}

/// 确保具名字段包含 `required` 中的字段，并按给定顺序置于最前
/// - `keep_existing = true`：已存在的同名字段沿用用户定义（仅移动位置）
/// - `keep_existing = false`：仅在缺失时补齐，已存在的字段保持原位
pub(crate) fn ensure_leading_fields(
    fields: &mut FieldsNamed,
    required: &[(&str, &Type)],
    keep_existing: bool,
) {
    let old = std::mem::take(&mut fields.named);
    let mut leading: Punctuated<Field, Token![,]> = Punctuated::new();
    let mut rest: Vec<Field> = Vec::new();

    for (name, ty) in required {
        let found = old
            .iter()
            .find(|f| f.ident.as_ref().is_some_and(|i| i == name));
        match found {
            Some(existing) if keep_existing => leading.push(existing.clone()),
            Some(_) => {}
            None => {
                let ident = Ident::new(name, Span::call_site());
                leading.push(syn::parse_quote! { #ident: #ty });
            }
        }
    }

    for field in old {
        let moved = keep_existing
            && field
                .ident
                .as_ref()
                .is_some_and(|i| required.iter().any(|(n, _)| i == n));
        if !moved {
            rest.push(field);
        }
    }

    leading.extend(rest);
    fields.named = leading;
}
