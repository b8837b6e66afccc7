use crate::utils::{apply_derives, ensure_leading_fields};
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, Type, parse_macro_input};

/// #[aggregate] 宏实现
/// - 追加（或前移）字段：`id`, `version`, `pending_events`
/// - 合并派生：Debug（可关闭）, Clone, Default
/// - 实现 `Entity`（new/id/version/restore_version）与 `EventSourced`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut id_ty: Option<Type> = None;
    let mut event_ty: Option<Type> = None;
    let mut derive_debug = true;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("id") {
            if id_ty.is_some() {
                return Err(meta.error("duplicate key 'id' in attribute"));
            }
            id_ty = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("event") {
            if event_ty.is_some() {
                return Err(meta.error("duplicate key 'event' in attribute"));
            }
            event_ty = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("debug") {
            derive_debug = meta.value()?.parse::<syn::LitBool>()?.value();
        } else {
            return Err(meta.error("unknown key in attribute; expected 'id' | 'event' | 'debug'"));
        }
        Ok(())
    });
    parse_macro_input!(attr with parser);

    let input = parse_macro_input!(item as Item);
    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[aggregate] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let Some(event_ty) = event_ty else {
        return syn::Error::new(
            st.ident.span(),
            "#[aggregate] requires the event type, e.g. #[aggregate(event = OrderEvent)]",
        )
        .to_compile_error()
        .into();
    };
    let id_type = id_ty.unwrap_or_else(|| syn::parse_quote! { String });

    let syn::Fields::Named(fields) = &mut st.fields else {
        return syn::Error::new(st.span(), "only supports named-field struct")
            .to_compile_error()
            .into();
    };

    let version_ty: Type = syn::parse_quote! { ::snapshotting_core::value_object::Version };
    let pending_ty: Type =
        syn::parse_quote! { ::snapshotting_core::domain_event::PendingEvents<#event_ty> };
    ensure_leading_fields(
        fields,
        &[
            ("id", &id_type),
            ("version", &version_ty),
            ("pending_events", &pending_ty),
        ],
        true,
    );

    let mut required: Vec<syn::Path> = vec![syn::parse_quote!(Clone), syn::parse_quote!(Default)];
    if derive_debug {
        required.insert(0, syn::parse_quote!(Debug));
    }
    apply_derives(&mut st.attrs, required);

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let expanded = quote! {
        #st

        impl #impl_generics ::snapshotting_core::entity::Entity for #ident #ty_generics #where_clause {
            type Id = #id_type;

            fn new(aggregate_id: Self::Id) -> Self {
                Self { id: aggregate_id, ..::core::default::Default::default() }
            }

            fn id(&self) -> &Self::Id { &self.id }

            fn version(&self) -> ::snapshotting_core::value_object::Version { self.version }

            fn restore_version(
                &mut self,
                version: ::snapshotting_core::value_object::Version,
                _token: ::snapshotting_core::entity::RestoreToken,
            ) {
                self.version = version;
            }
        }

        impl #impl_generics ::snapshotting_core::aggregate::EventSourced for #ident #ty_generics #where_clause {
            fn pending_events(&self) -> &::snapshotting_core::domain_event::PendingEvents<#event_ty> {
                &self.pending_events
            }

            fn pending_events_mut(&mut self) -> &mut ::snapshotting_core::domain_event::PendingEvents<#event_ty> {
                &mut self.pending_events
            }
        }
    };

    TokenStream::from(expanded)
}
