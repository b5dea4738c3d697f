use crate::components::ui::Spinner;
use leptos::prelude::*;
use std::time::Duration;
use tw_merge::tw_merge;

/// Success/error toasts linger this long; loading toasts stay until their
/// operation resolves them.
const DISMISS_MS: u64 = 3_000;

pub(crate) type ToastId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToastKind {
    Loading,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
}

/// Replaces the toast with the same id in place (a pending toast resolves
/// where it stands instead of stacking); otherwise appends.
pub(crate) fn upsert(list: &mut Vec<Toast>, toast: Toast) {
    if let Some(slot) = list.iter_mut().find(|t| t.id == toast.id) {
        *slot = toast;
    } else {
        list.push(toast);
    }
}

pub(crate) fn remove(list: &mut Vec<Toast>, id: ToastId) {
    list.retain(|t| t.id != id);
}

/// App-global toast store, provided once as context. Copy, like the signal
/// bundles it wraps.
#[derive(Clone, Copy)]
pub(crate) struct Toasts {
    pub items: RwSignal<Vec<Toast>>,
    next_id: RwSignal<ToastId>,
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            items: RwSignal::new(vec![]),
            next_id: RwSignal::new(0),
        }
    }

    fn alloc_id(&self) -> ToastId {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);
        id
    }

    /// Shows a pending toast and hands back its id so the issuing operation
    /// can resolve it in place.
    pub fn loading(&self, message: impl Into<String>) -> ToastId {
        let id = self.alloc_id();
        let toast = Toast {
            id,
            kind: ToastKind::Loading,
            message: message.into(),
        };
        self.items.update(|l| upsert(l, toast));
        id
    }

    #[allow(dead_code)]
    pub fn success(&self, message: impl Into<String>) {
        let id = self.alloc_id();
        self.show_transient(id, ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        let id = self.alloc_id();
        self.show_transient(id, ToastKind::Error, message.into());
    }

    pub fn resolve_success(&self, id: ToastId, message: impl Into<String>) {
        self.show_transient(id, ToastKind::Success, message.into());
    }

    pub fn resolve_error(&self, id: ToastId, message: impl Into<String>) {
        self.show_transient(id, ToastKind::Error, message.into());
    }

    fn show_transient(&self, id: ToastId, kind: ToastKind, message: String) {
        let toast = Toast { id, kind, message };
        self.items.update(|l| upsert(l, toast));

        let items = self.items;
        leptos_dom::helpers::set_timeout(
            move || items.update(|l| remove(l, id)),
            Duration::from_millis(DISMISS_MS),
        );
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub(crate) fn Toaster() -> impl IntoView {
    let toasts = expect_context::<Toasts>();

    view! {
        <div class="pointer-events-none fixed right-4 top-4 z-50 flex w-80 flex-col gap-2">
            {move || {
                toasts
                    .items
                    .get()
                    .into_iter()
                    .map(|toast| {
                        let tone = match toast.kind {
                            ToastKind::Loading => "border-border",
                            ToastKind::Success => "border-success/40",
                            ToastKind::Error => "border-destructive/40 text-destructive",
                        };
                        let class = tw_merge!(
                            "pointer-events-auto flex items-center gap-2 rounded-md border bg-card px-4 py-3 text-sm shadow-sm",
                            tone
                        );
                        view! {
                            <div class=class>
                                <Show
                                    when=move || toast.kind == ToastKind::Loading
                                    fallback=|| ().into_view()
                                >
                                    <Spinner />
                                </Show>
                                <span>{toast.message.clone()}</span>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toast(id: ToastId, kind: ToastKind, message: &str) -> Toast {
        Toast {
            id,
            kind,
            message: message.to_string(),
        }
    }

    #[test]
    fn resolve_replaces_pending_in_place() {
        let mut list = vec![
            toast(0, ToastKind::Loading, "Adding bookmark..."),
            toast(1, ToastKind::Loading, "Deleting bookmark..."),
        ];

        upsert(&mut list, toast(0, ToastKind::Success, "Bookmark added"));

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].kind, ToastKind::Success);
        assert_eq!(list[0].message, "Bookmark added");
        // The other pending toast is untouched.
        assert_eq!(list[1].kind, ToastKind::Loading);
    }

    #[test]
    fn unknown_id_appends() {
        let mut list = vec![toast(0, ToastKind::Loading, "one")];
        upsert(&mut list, toast(7, ToastKind::Error, "boom"));
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].id, 7);
    }

    #[test]
    fn concurrent_operations_keep_independent_toasts() {
        let mut list = vec![];
        upsert(&mut list, toast(0, ToastKind::Loading, "op a"));
        upsert(&mut list, toast(1, ToastKind::Loading, "op b"));

        upsert(&mut list, toast(1, ToastKind::Error, "op b failed"));

        assert_eq!(list[0].kind, ToastKind::Loading);
        assert_eq!(list[1].kind, ToastKind::Error);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut list = vec![toast(0, ToastKind::Success, "done")];
        remove(&mut list, 0);
        remove(&mut list, 0);
        assert!(list.is_empty());
    }
}
