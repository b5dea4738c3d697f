use crate::notify::{Toaster, Toasts};
use crate::pages::{AuthCallbackPage, BookmarksPage, LoginPage, NotFoundPage, RecoveryPage};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));
    provide_context(Toasts::new());

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Toaster />
            <ErrorBoundary fallback=|_errors| view! { <RecoveryPage /> }>
                <Routes fallback=|| view! { <NotFoundPage /> }>
                    <Route path=path!("login") view=LoginPage />
                    <Route path=path!("auth/callback") view=AuthCallbackPage />
                    <Route path=path!("") view=BookmarksPage />
                </Routes>
            </ErrorBoundary>
        </Router>
    }
}
