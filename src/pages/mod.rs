use crate::api::ApiErrorKind;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardItem, CardList, CardTitle, Input, Label, Spinner,
};
use crate::feed::FeedSubscription;
use crate::models::{Identity, NewBookmark};
use crate::notify::Toasts;
use crate::state::{list_sync, AppContext};
use crate::storage::save_identity_to_storage;
use icons::{Bookmark as BookmarkIcon, Trash2};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

/// Extracts the access token from an OAuth callback fragment
/// (`#access_token=...&refresh_token=...`).
pub(crate) fn parse_fragment_token(hash: &str) -> Option<String> {
    let hash = hash.strip_prefix('#').unwrap_or(hash);
    for pair in hash.split('&') {
        if let Some(value) = pair.strip_prefix("access_token=") {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Both fields are required; a blank one means no remote call is issued.
pub(crate) fn has_blank_field(title: &str, url: &str) -> bool {
    title.trim().is_empty() || url.trim().is_empty()
}

pub(crate) fn welcome_name(identity: &Option<Identity>) -> String {
    identity
        .as_ref()
        .and_then(|i| i.email.as_deref())
        .map(email_local_part)
        .unwrap_or("there")
        .to_string()
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Short display form of a server timestamp ("Mar 5, 2026"). Falls back to
/// the raw string when it is not a date-prefixed RFC3339 value.
pub(crate) fn format_created_date(created_at: &str) -> String {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    let date = created_at.get(..10).unwrap_or("");
    let mut parts = date.splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return created_at.to_string();
    };
    let (Ok(month), Ok(day)) = (month.parse::<usize>(), day.parse::<u32>()) else {
        return created_at.to_string();
    };
    if month == 0 || month > 12 {
        return created_at.to_string();
    }

    format!("{} {}, {}", MONTHS[month - 1], day, year)
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let toasts = expect_context::<Toasts>();
    let api_client = app_state.0.api_client;
    let analytics = app_state.0.analytics.clone();
    let navigate = StoredValue::new(use_navigate());

    let loading: RwSignal<bool> = RwSignal::new(false);

    Effect::new(move |_| {
        // Already signed in: straight to the list.
        if api_client.get_untracked().is_authenticated() {
            navigate.with_value(|nav| nav("/", Default::default()));
            return;
        }
        analytics.page_view("/login");
    });

    let on_google_login = move |_| {
        loading.set(true);
        let toast_id = toasts.loading("Redirecting to Google...");

        let origin = window().location().origin().unwrap_or_default();
        let url = api_client
            .get_untracked()
            .oauth_authorize_url("google", &format!("{origin}/auth/callback"));

        // On success the browser leaves this page, so the pending toast is
        // intentionally left up.
        if window().location().set_href(&url).is_err() {
            toasts.resolve_error(toast_id, "Failed to sign in with Google");
            loading.set(false);
        }
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-md flex-col justify-center px-4 py-12">
                <Card>
                    <CardHeader class="items-center text-center">
                        <BookmarkIcon class="size-10 text-primary" />
                        <CardTitle class="text-2xl">"Linkmark"</CardTitle>
                        <CardDescription>"Save and organize your favorite links"</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <Button
                            class="w-full"
                            variant=ButtonVariant::Outline
                            attr:disabled=move || loading.get()
                            on:click=on_google_login
                        >
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if loading.get() { "Signing in..." } else { "Sign in with Google" }}
                            </span>
                        </Button>

                        <div class="mt-6 text-center text-xs text-muted-foreground">
                            "Fast, secure, and easy to use"
                        </div>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

/// OAuth landing target: the provider returns here with the access token in
/// the URL fragment.
#[component]
pub fn AuthCallbackPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let api_client = app_state.0.api_client;
    let navigate = StoredValue::new(use_navigate());

    Effect::new(move |_| {
        let hash = window().location().hash().unwrap_or_default();
        match parse_fragment_token(&hash) {
            Some(token) => {
                let mut client = api_client.get_untracked();
                client.set_token(token);
                client.save_to_storage();
                api_client.set(client);
                navigate.with_value(|nav| nav("/", Default::default()));
            }
            None => {
                navigate.with_value(|nav| nav("/login", Default::default()));
            }
        }
    });

    view! {
        <div class="flex min-h-screen items-center justify-center bg-background">
            <div class="flex items-center gap-2 text-sm text-muted-foreground">
                <Spinner />
                "Signing you in..."
            </div>
        </div>
    }
}

#[component]
fn BookmarkForm() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let toasts = expect_context::<Toasts>();
    let api_client = app_state.0.api_client;
    let identity = app_state.0.identity;
    let bookmarks = app_state.0.bookmarks;
    let session_epoch = app_state.0.session_epoch;
    let analytics = app_state.0.analytics.clone();

    let title: RwSignal<String> = RwSignal::new(String::new());
    let url: RwSignal<String> = RwSignal::new(String::new());
    let adding: RwSignal<bool> = RwSignal::new(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let title_val = title.get_untracked();
        let url_val = url.get_untracked();

        // The inputs are `required`, but the browser check is advisory;
        // nothing leaves this handler on blank input.
        if has_blank_field(&title_val, &url_val) {
            return;
        }
        let Some(current) = identity.get_untracked() else {
            return;
        };

        adding.set(true);
        let toast_id = toasts.loading("Adding bookmark...");

        let client = api_client.get_untracked();
        let epoch = session_epoch.get_untracked();
        let analytics = analytics.clone();
        let record = NewBookmark {
            url: url_val.trim().to_string(),
            title: title_val.trim().to_string(),
            owner_id: current.id,
        };

        spawn_local(async move {
            match client.insert_bookmark(&record).await {
                Ok(row) => {
                    if session_epoch.get_untracked() == epoch {
                        // The feed event may have landed first; dedupe by id.
                        bookmarks.update(|list| {
                            list_sync::prepend_unique(list, row);
                        });
                    }
                    title.set(String::new());
                    url.set(String::new());
                    toasts.resolve_success(toast_id, "Bookmark added");
                    analytics.track("bookmark_created", "bookmarks", None);
                }
                Err(_) => {
                    // Inputs keep their text so the user can retry.
                    toasts.resolve_error(toast_id, "Failed to add bookmark");
                }
            }
            adding.set(false);
        });
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle>"Add new bookmark"</CardTitle>
            </CardHeader>

            <CardContent>
                <form class="flex flex-col gap-4" on:submit=on_submit>
                    <div class="flex flex-col gap-2">
                        <Label html_for="title">"Title"</Label>
                        <Input
                            id="title"
                            placeholder="Enter bookmark title"
                            bind_value=title
                            required=true
                        />
                    </div>

                    <div class="flex flex-col gap-2">
                        <Label html_for="url">"URL"</Label>
                        <Input
                            id="url"
                            r#type="url"
                            placeholder="https://example.com"
                            bind_value=url
                            required=true
                        />
                    </div>

                    <Button class="w-full" attr:disabled=move || adding.get()>
                        <span class="inline-flex items-center gap-2">
                            <Show when=move || adding.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            {move || if adding.get() { "Adding..." } else { "Add bookmark" }}
                        </span>
                    </Button>
                </form>
            </CardContent>
        </Card>
    }
}

#[component]
pub fn BookmarksPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let toasts = expect_context::<Toasts>();
    let api_client = app_state.0.api_client;
    let identity = app_state.0.identity;
    let bookmarks = app_state.0.bookmarks;
    let bookmarks_loading = app_state.0.bookmarks_loading;
    let session_epoch = app_state.0.session_epoch;
    let analytics = app_state.0.analytics.clone();
    let navigate = StoredValue::new(use_navigate());

    // Flips only after a fresh identity lookup; the cached identity alone
    // never triggers data loading.
    let session_ready: RwSignal<bool> = RwSignal::new(false);
    let deleting_id: RwSignal<Option<String>> = RwSignal::new(None);
    // The subscription owns JS callbacks, so it lives in local storage.
    let feed = StoredValue::new_local(None::<FeedSubscription>);

    // Session guard: resolve the identity before any bookmark data moves.
    Effect::new(move |_| {
        let client = api_client.get_untracked();
        if !client.is_authenticated() {
            navigate.with_value(|nav| nav("/login", Default::default()));
            return;
        }
        analytics.page_view("/");

        let epoch = session_epoch.get_untracked();
        spawn_local(async move {
            match client.current_identity().await {
                Ok(resolved) => {
                    if session_epoch.get_untracked() != epoch {
                        return;
                    }
                    save_identity_to_storage(&resolved);
                    identity.set(Some(resolved));
                    session_ready.set(true);
                }
                Err(_) => {
                    // A failed lookup counts as signed out; no retry.
                    if session_epoch.get_untracked() != epoch {
                        return;
                    }
                    let mut client = api_client.get_untracked();
                    client.sign_out_local();
                    api_client.set(client);
                    identity.set(None);
                    navigate.with_value(|nav| nav("/login", Default::default()));
                }
            }
        });
    });

    // Initial fetch + feed subscription, once the session is resolved.
    Effect::new(move |_| {
        if !session_ready.get() {
            return;
        }
        let Some(current) = identity.get_untracked() else {
            return;
        };

        let client = api_client.get_untracked();
        let epoch = session_epoch.get_untracked();
        let owner_id = current.id.clone();

        bookmarks_loading.set(true);
        spawn_local(async move {
            match client.list_bookmarks(&owner_id).await {
                Ok(rows) => {
                    if session_epoch.get_untracked() == epoch {
                        bookmarks.set(rows);
                    }
                }
                Err(e) => {
                    if session_epoch.get_untracked() == epoch {
                        if e.kind == ApiErrorKind::Unauthorized {
                            let mut client = api_client.get_untracked();
                            client.sign_out_local();
                            api_client.set(client);
                            identity.set(None);
                            navigate.with_value(|nav| nav("/login", Default::default()));
                        } else {
                            // Collection stays empty; a re-entry is the retry.
                            toasts.error("Failed to load bookmarks");
                        }
                    }
                }
            }
            bookmarks_loading.set(false);
        });

        let client = api_client.get_untracked();
        let sub = FeedSubscription::open(&client, &current.id, move |event| {
            bookmarks.update(|list| list_sync::apply_change_event(list, event));
        });
        feed.set_value(sub);
    });

    on_cleanup(move || {
        // Late confirmations become no-ops, and the feed stops delivering.
        session_epoch.update(|e| *e += 1);
        feed.try_update_value(|slot| {
            if let Some(sub) = slot.take() {
                sub.unsubscribe();
            }
        });
    });

    let on_sign_out = move |_| {
        let client = api_client.get_untracked();
        spawn_local(async move {
            // Best-effort remote revocation; the local session is gone
            // either way.
            let _ = client.sign_out().await;
        });

        let mut client = api_client.get_untracked();
        client.sign_out_local();
        api_client.set(client);
        identity.set(None);
        bookmarks.set(vec![]);
        session_epoch.update(|e| *e += 1);
        navigate.with_value(|nav| nav("/login", Default::default()));
    };

    let delete_bookmark = move |id: String, title: String| {
        deleting_id.set(Some(id.clone()));
        let toast_id = toasts.loading("Deleting bookmark...");

        let client = api_client.get_untracked();
        let epoch = session_epoch.get_untracked();

        spawn_local(async move {
            match client.delete_bookmark(&id).await {
                Ok(()) => {
                    // The row leaves the list only after the service
                    // confirms, so a failure needs no rollback.
                    if session_epoch.get_untracked() == epoch {
                        bookmarks.update(|list| {
                            list_sync::remove_by_id(list, &id);
                        });
                    }
                    toasts.resolve_success(toast_id, format!("\"{title}\" deleted"));
                }
                Err(_) => {
                    toasts.resolve_error(toast_id, "Failed to delete bookmark");
                }
            }
            deleting_id.set(None);
        });
    };

    view! {
        <Show
            when=move || session_ready.get()
            fallback=move || view! {
                <div class="flex min-h-screen items-center justify-center bg-background">
                    <div class="flex items-center gap-2 text-sm text-muted-foreground">
                        <Spinner />
                        "Loading your bookmarks..."
                    </div>
                </div>
            }
        >
            <div class="min-h-screen bg-background">
                <div class="mx-auto w-full max-w-[720px] px-4 py-8">
                    <div class="mb-6 flex items-center justify-between">
                        <div class="space-y-1">
                            <h1 class="flex items-center gap-2 text-xl font-semibold">
                                <BookmarkIcon class="size-5 text-primary" />
                                "My bookmarks"
                            </h1>
                            <p class="text-xs text-muted-foreground">
                                {move || format!("Welcome back, {}!", welcome_name(&identity.get()))}
                            </p>
                        </div>

                        <Button variant=ButtonVariant::Outline on:click=on_sign_out>
                            "Sign out"
                        </Button>
                    </div>

                    <div class="mb-6">
                        <BookmarkForm />
                    </div>

                    <Show
                        when=move || !bookmarks.get().is_empty()
                        fallback=move || view! {
                            <Card>
                                <CardContent class="py-6 text-center">
                                    <div class="text-sm font-medium">
                                        {move || if bookmarks_loading.get() {
                                            "Loading bookmarks..."
                                        } else {
                                            "No bookmarks yet"
                                        }}
                                    </div>
                                    <div class="mt-1 text-xs text-muted-foreground">
                                        "Add your first bookmark to get started!"
                                    </div>
                                </CardContent>
                            </Card>
                        }
                    >
                        <CardList>
                            {move || {
                                bookmarks
                                    .get()
                                    .into_iter()
                                    .map(|bookmark| {
                                        let id = bookmark.id.clone();
                                        let title = bookmark.title.clone();
                                        let date = format_created_date(&bookmark.created_at);
                                        let row_id = bookmark.id.clone();
                                        let is_deleting = move || {
                                            deleting_id.get().as_deref() == Some(row_id.as_str())
                                        };
                                        let is_deleting_btn = is_deleting.clone();

                                        view! {
                                            <CardItem class="items-start justify-between gap-4 rounded-md border bg-card px-4 py-3">
                                                <div class="min-w-0 flex-1 space-y-1">
                                                    <div class="text-sm font-medium">{bookmark.title.clone()}</div>
                                                    <a
                                                        class="block break-all text-xs text-primary hover:underline"
                                                        href=bookmark.url.clone()
                                                        target="_blank"
                                                        rel="noopener noreferrer"
                                                    >
                                                        {bookmark.url.clone()}
                                                    </a>
                                                    <div class="text-xs text-muted-foreground">{date}</div>
                                                </div>

                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Icon
                                                    attr:disabled=is_deleting_btn
                                                    attr:title="Delete bookmark"
                                                    on:click=move |_| delete_bookmark(id.clone(), title.clone())
                                                >
                                                    <Show
                                                        when=is_deleting
                                                        fallback=|| view! { <Trash2 class="size-4 text-muted-foreground" /> }
                                                    >
                                                        <Spinner />
                                                    </Show>
                                                </Button>
                                            </CardItem>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </CardList>
                    </Show>
                </div>
            </div>
        </Show>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="flex min-h-screen items-center justify-center bg-background px-4">
            <Card class="w-full max-w-md text-center">
                <CardHeader class="items-center">
                    <CardTitle class="text-4xl">"404"</CardTitle>
                    <CardDescription>"Sorry, we couldn't find the page you're looking for."</CardDescription>
                </CardHeader>
                <CardContent>
                    <Button class="w-full" href="/">
                        "Go back home"
                    </Button>
                </CardContent>
            </Card>
        </div>
    }
}

/// Top-level recovery screen for uncaught rendering errors.
#[component]
pub fn RecoveryPage() -> impl IntoView {
    let on_retry = move |_| {
        let _ = window().location().reload();
    };

    view! {
        <div class="flex min-h-screen items-center justify-center bg-background px-4">
            <Card class="w-full max-w-md">
                <CardHeader>
                    <CardTitle>"Something went wrong"</CardTitle>
                    <CardDescription>"We encountered an unexpected error. Please try again."</CardDescription>
                </CardHeader>
                <CardContent class="flex flex-col gap-3">
                    <Alert class="border-destructive/30">
                        <AlertDescription class="text-destructive">
                            "The page failed to render."
                        </AlertDescription>
                    </Alert>
                    <Button class="w-full" on:click=on_retry>
                        "Try again"
                    </Button>
                    <Button class="w-full" variant=ButtonVariant::Outline href="/">
                        "Go to home"
                    </Button>
                </CardContent>
            </Card>
        </div>
    }
}
