extern crate proc_macro;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, parse_macro_input};

/// Marks a function as the credman matcher entrypoint.
///
/// Expands to the function itself plus a `main()` that installs the tracing
/// collector, constructs the function's arguments from the host buffers via
/// `FromRequest`/`FromCredentials`, runs the matcher and flushes collected
/// diagnostics.
#[proc_macro_attribute]
pub fn credential_matcher(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);
    let fn_name = &input_fn.sig.ident;

    let expanded = quote! {
        #input_fn

        pub fn main() {
            ::matcher_core::tracing_backend::install();
            #fn_name(
                ::credman_host::FromRequest::from_request(),
                ::credman_host::FromCredentials::from_credentials(),
            );
            ::matcher_core::tracing_backend::flush_to_picker();
        }
    };

    TokenStream::from(expanded)
}
