use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one and inject dependencies.
///
/// Each test gets a fresh server whose election ledger runs on its own
/// [`crate::ledger::MockClock`]. Injectable dependencies are
/// [`rocket::local::asynchronous::Client`] and that `MockClock`.
///
/// `#[backend_test(admin)]` and `#[backend_test(voter)]` log the client in with the
/// example admin or voter key before the test body runs.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Log in the client as admin/voter if needed.
    let maybe_login = match parse_macro_input!(args as Option<Ident>) {
        None => quote! {},
        Some(arg) if arg == "admin" => quote! {
            crate::model::auth::examples::login(
                &rocket_client,
                &crate::model::auth::examples::admin_key(),
            )
            .await;
        },
        Some(arg) if arg == "voter" => quote! {
            crate::model::auth::examples::login(
                &rocket_client,
                &crate::model::auth::examples::voter_key(),
            )
            .await;
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `admin` or `voter`")
                .into_compile_error()
                .into();
        }
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup(
                clock: crate::ledger::MockClock,
            ) -> rocket::local::asynchronous::Client {
                let rocket_client =
                    rocket::local::asynchronous::Client::tracked(crate::rocket_for_tests(clock))
                        .await
                        .unwrap();

                #maybe_login

                rocket_client
            }

            /// The test itself.
            #item_fn

            log4rs_test_utils::test_logging::init_logging_once_for(["dvote_ledger"], None, None);

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            let clock = crate::ledger::MockClock::default();
            let rocket_client = runtime.block_on(setup(clock.clone()));
            runtime.block_on(#new_name(#(#test_args),*));
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_clock = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(_) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    if let Some(type_ident) = type_path.path.get_ident() {
                        if type_ident == "Client" {
                            if has_client {
                                return Err(syn::Error::new(input.span(), "Test cannot accept more than one `rocket::local::asynchronous::Client`"));
                            }
                            has_client = true;
                            args.push(quote! { rocket_client });
                            continue;
                        } else if type_ident == "MockClock" {
                            if has_clock {
                                return Err(syn::Error::new(
                                    input.span(),
                                    "Test cannot accept more than one `MockClock`",
                                ));
                            }
                            has_clock = true;
                            args.push(quote! { clock });
                            continue;
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `clock_ident: MockClock`",
        ));
    }

    Ok(args)
}
