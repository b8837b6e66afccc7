use crate::utils::{apply_derives, ensure_leading_fields};
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, LitBool, LitInt, LitStr, Type, Variant, parse_macro_input};

/// #[event] 宏实现
/// - 仅支持具名字段变体：`Variant { .. }`
/// - 确保每个变体具备字段：`id: IdType`, `aggregate_version: Version`
/// - 生成 `::snapshotting_core::domain_event::DomainEvent` 实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut id_ty: Option<Type> = None;
    let mut version: Option<LitInt> = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("id") {
            if id_ty.is_some() {
                return Err(meta.error("duplicate key 'id' in attribute"));
            }
            id_ty = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("version") {
            if version.is_some() {
                return Err(meta.error("duplicate key 'version' in attribute"));
            }
            version = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unknown key; expected 'id' | 'version'"))
        }
    });
    parse_macro_input!(attr with parser);

    let mut input = parse_macro_input!(item as Item);
    let enum_item = match &mut input {
        Item::Enum(e) => e,
        other => {
            return syn::Error::new(other.span(), "#[event] can only be used on enum types")
                .to_compile_error()
                .into();
        }
    };

    let id_type = id_ty.unwrap_or_else(|| syn::parse_quote! { String });
    let default_version = version.unwrap_or_else(|| syn::parse_quote! { 1 });
    let version_ty: Type = syn::parse_quote! { ::snapshotting_core::value_object::Version };

    // 合并默认派生：Debug, Clone, PartialEq, Serialize, Deserialize
    apply_derives(
        &mut enum_item.attrs,
        vec![
            syn::parse_quote!(Debug),
            syn::parse_quote!(Clone),
            syn::parse_quote!(PartialEq),
            syn::parse_quote!(serde::Serialize),
            syn::parse_quote!(serde::Deserialize),
        ],
    );

    let enum_name = enum_item.ident.to_string();
    let mut variants = Vec::new();

    for v in &mut enum_item.variants {
        let syn::Fields::Named(fields) = &mut v.fields else {
            return syn::Error::new(
                v.span(),
                "#[event] supports only named-field enum variants, e.g., Variant { x: T }",
            )
            .to_compile_error()
            .into();
        };
        ensure_leading_fields(
            fields,
            &[("id", &id_type), ("aggregate_version", &version_ty)],
            false,
        );

        match take_variant_config(v) {
            Ok(cfg) => variants.push((v.ident.clone(), cfg)),
            Err(err) => return err.to_compile_error().into(),
        }
    }

    let type_arms = variants.iter().map(|(ident, cfg)| {
        let lit = cfg
            .event_type
            .clone()
            .unwrap_or_else(|| LitStr::new(&format!("{enum_name}.{ident}"), ident.span()));
        quote! { Self::#ident { .. } => #lit }
    });
    let version_arms = variants.iter().map(|(ident, cfg)| {
        let lit = cfg.event_version.as_ref().unwrap_or(&default_version);
        quote! { Self::#ident { .. } => #lit }
    });
    let skip_arms = variants.iter().map(|(ident, cfg)| {
        let skip = cfg.skip_snapshot;
        quote! { Self::#ident { .. } => #skip }
    });
    let id_arms = variants.iter().map(|(ident, _)| {
        quote! { Self::#ident { id, .. } => id.as_str() }
    });
    let agg_version_arms = variants.iter().map(|(ident, _)| {
        quote! { Self::#ident { aggregate_version, .. } => *aggregate_version }
    });

    let enum_ident = &enum_item.ident;
    let (impl_generics, ty_generics, where_clause) = enum_item.generics.split_for_impl();

    let out = quote! {
        #enum_item

        impl #impl_generics ::snapshotting_core::domain_event::DomainEvent for #enum_ident #ty_generics #where_clause {
            fn event_id(&self) -> &str { match self { #( #id_arms, )* } }
            fn event_type(&self) -> &str { match self { #( #type_arms, )* } }
            fn event_version(&self) -> usize { match self { #( #version_arms, )* } }
            fn aggregate_version(&self) -> ::snapshotting_core::value_object::Version {
                match self { #( #agg_version_arms, )* }
            }
            fn skips_snapshot(&self) -> bool { match self { #( #skip_arms, )* } }
        }
    };

    TokenStream::from(out)
}

#[derive(Default)]
struct VariantConfig {
    event_type: Option<LitStr>,
    event_version: Option<LitInt>,
    skip_snapshot: bool,
}

// 解析并移除变体上的 #[event(...)]
fn take_variant_config(variant: &mut Variant) -> syn::Result<VariantConfig> {
    let mut cfg = VariantConfig::default();
    let mut seen_skip = false;
    let mut retained = Vec::new();

    for attr in std::mem::take(&mut variant.attrs) {
        if !attr.path().is_ident("event") {
            retained.push(attr);
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("event_type") {
                if cfg.event_type.is_some() {
                    return Err(meta.error("duplicate key 'event_type' in attribute"));
                }
                cfg.event_type = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("event_version") {
                if cfg.event_version.is_some() {
                    return Err(meta.error("duplicate key 'event_version' in attribute"));
                }
                cfg.event_version = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("skip_snapshot") {
                if seen_skip {
                    return Err(meta.error("duplicate key 'skip_snapshot' in attribute"));
                }
                seen_skip = true;
                // 允许简写 #[event(skip_snapshot)]
                cfg.skip_snapshot = if meta.input.peek(syn::Token![=]) {
                    meta.value()?.parse::<LitBool>()?.value()
                } else {
                    true
                };
            } else {
                return Err(meta.error(
                    "unknown key; expected 'event_type' | 'event_version' | 'skip_snapshot'",
                ));
            }
            Ok(())
        })?;
    }

    variant.attrs = retained;
    Ok(cfg)
}
