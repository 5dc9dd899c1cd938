//! Filter hooks and render observers.
//!
//! Filters the template engine does not recognize are resolved here. Two
//! independent extension points exist, and both run for every unresolved
//! filter, in this order:
//!
//! 1. Field filters: every registered callback is called with
//!    `(text, field_name, filter_name, ctx)`, each receiving the previous
//!    callback's output. A callback that does not handle `filter_name` must
//!    return the text unchanged.
//! 2. Legacy named filters: callbacks registered under exactly
//!    `fmod_{filter_name}` are called with
//!    `(text, "", note_items, field_name, "")`. The two empty arguments are
//!    kept for call-signature compatibility and carry nothing.
//!
//! A filter nobody handles leaves the text as it was. Templates naming a
//! filter from a missing extension still render.
//!
//! A callback returning [`FilterError`] is skipped: its input flows on to the
//! next callback and a warning is logged. One broken extension cannot blank
//! a field for the others.
//!
//! # Pipeline Position
//!
//! ```text
//! partial render (engine filters)
//!   → FIELD FILTERS ← (per unresolved filter, registration order)
//!   → LEGACY NAMED FILTERS ← (fmod_<name>)
//!   → AV tag extraction
//!   → CARD DID RENDER ← (observers may edit the output)
//! ```
//!
//! # Registration
//!
//! [`Hooks`] is a plain value, built up with [`Hooks::field_filter`] and
//! friends and passed to
//! [`RenderContext::render_with_hooks`](crate::RenderContext::render_with_hooks).
//! The process-wide instance used by [`RenderContext::render`](crate::RenderContext::render)
//! is edited through [`register_general_filter`], [`register_named_filter`],
//! [`register_card_did_render`], and [`unregister`]. Registration swaps in a
//! new copy; renders already running keep the [`snapshot`] they started with.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::context::RenderContext;
use crate::error::FilterError;
use crate::render::RenderOutput;

/// Prefix of the hook names legacy filters are registered under.
pub const LEGACY_FILTER_PREFIX: &str = "fmod_";

/// Returns the legacy hook name for a filter: `fmod_{filter_name}`.
pub fn legacy_hook_name(filter_name: &str) -> String {
    format!("{}{}", LEGACY_FILTER_PREFIX, filter_name)
}

/// Handle for removing a registered hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hook#{}", self.0)
    }
}

static NEXT_HOOK_ID: AtomicU64 = AtomicU64::new(1);

fn next_hook_id() -> HookId {
    HookId(NEXT_HOOK_ID.fetch_add(1, Ordering::Relaxed))
}

/// Field filter signature: `(text, field_name, filter_name, ctx) -> text`.
pub type FieldFilterFn = Arc<
    dyn Fn(&str, &str, &str, &RenderContext<'_>) -> Result<String, FilterError> + Send + Sync,
>;

/// Legacy filter signature: `(text, "", note_items, field_name, "") -> text`.
pub type LegacyFilterFn = Arc<
    dyn Fn(&str, &str, &[(String, String)], &str, &str) -> Result<String, FilterError>
        + Send
        + Sync,
>;

/// Observer called with the assembled output before it is returned.
pub type CardDidRenderFn = Arc<dyn Fn(&mut RenderOutput, &RenderContext<'_>) + Send + Sync>;

/// Ordered hook lists.
///
/// Cloning is cheap: callbacks are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct Hooks {
    field_filters: Vec<(HookId, FieldFilterFn)>,
    legacy_filters: HashMap<String, Vec<(HookId, LegacyFilterFn)>>,
    card_did_render: Vec<(HookId, CardDidRenderFn)>,
}

impl Hooks {
    /// Creates a new empty hooks configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.field_filters.is_empty()
            && self.legacy_filters.values().all(Vec::is_empty)
            && self.card_did_render.is_empty()
    }

    /// Adds a field filter.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cardface_render::Hooks;
    ///
    /// let hooks = Hooks::new().field_filter(|text, _field, filter, _ctx| {
    ///     Ok(if filter == "upper" { text.to_uppercase() } else { text.to_string() })
    /// });
    /// ```
    pub fn field_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, &str, &RenderContext<'_>) -> Result<String, FilterError>
            + Send
            + Sync
            + 'static,
    {
        self.add_field_filter(f);
        self
    }

    /// Adds a legacy filter under `hook_name` (e.g. `fmod_upper`).
    pub fn legacy_filter<F>(mut self, hook_name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str, &str, &[(String, String)], &str, &str) -> Result<String, FilterError>
            + Send
            + Sync
            + 'static,
    {
        self.add_legacy_filter(hook_name, f);
        self
    }

    /// Adds a render observer.
    pub fn card_did_render<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut RenderOutput, &RenderContext<'_>) + Send + Sync + 'static,
    {
        self.add_card_did_render(f);
        self
    }

    pub fn add_field_filter<F>(&mut self, f: F) -> HookId
    where
        F: Fn(&str, &str, &str, &RenderContext<'_>) -> Result<String, FilterError>
            + Send
            + Sync
            + 'static,
    {
        let id = next_hook_id();
        self.field_filters.push((id, Arc::new(f)));
        id
    }

    pub fn add_legacy_filter<F>(&mut self, hook_name: impl Into<String>, f: F) -> HookId
    where
        F: Fn(&str, &str, &[(String, String)], &str, &str) -> Result<String, FilterError>
            + Send
            + Sync
            + 'static,
    {
        let id = next_hook_id();
        self.legacy_filters
            .entry(hook_name.into())
            .or_default()
            .push((id, Arc::new(f)));
        id
    }

    pub fn add_card_did_render<F>(&mut self, f: F) -> HookId
    where
        F: Fn(&mut RenderOutput, &RenderContext<'_>) + Send + Sync + 'static,
    {
        let id = next_hook_id();
        self.card_did_render.push((id, Arc::new(f)));
        id
    }

    /// Removes the hook with the given id. Returns false if it was not found.
    pub fn remove(&mut self, id: HookId) -> bool {
        if let Some(pos) = self.field_filters.iter().position(|(h, _)| *h == id) {
            self.field_filters.remove(pos);
            return true;
        }
        for hooks in self.legacy_filters.values_mut() {
            if let Some(pos) = hooks.iter().position(|(h, _)| *h == id) {
                hooks.remove(pos);
                return true;
            }
        }
        if let Some(pos) = self.card_did_render.iter().position(|(h, _)| *h == id) {
            self.card_did_render.remove(pos);
            return true;
        }
        false
    }

    /// Applies one unresolved filter: field filters first, then legacy
    /// filters registered under `fmod_{filter_name}`.
    pub fn apply_filter(
        &self,
        text: String,
        field_name: &str,
        filter_name: &str,
        ctx: &RenderContext<'_>,
    ) -> String {
        let text = self.run_field_filters(text, field_name, filter_name, ctx);
        self.run_legacy_filters(text, field_name, filter_name, ctx.note().items())
    }

    /// Runs all field filters, chaining transformations.
    pub fn run_field_filters(
        &self,
        text: String,
        field_name: &str,
        filter_name: &str,
        ctx: &RenderContext<'_>,
    ) -> String {
        self.field_filters
            .iter()
            .fold(text, |text, (id, hook)| match hook(&text, field_name, filter_name, ctx) {
                Ok(out) => out,
                Err(err) => {
                    tracing::warn!(
                        %id,
                        field = field_name,
                        error = %err,
                        "field filter failed, keeping its input"
                    );
                    text
                }
            })
    }

    /// Runs the legacy filters registered for `filter_name`, chaining transformations.
    pub fn run_legacy_filters(
        &self,
        text: String,
        field_name: &str,
        filter_name: &str,
        note_items: &[(String, String)],
    ) -> String {
        let Some(hooks) = self.legacy_filters.get(&legacy_hook_name(filter_name)) else {
            return text;
        };
        hooks
            .iter()
            .fold(text, |text, (id, hook)| match hook(&text, "", note_items, field_name, "") {
                Ok(out) => out,
                Err(err) => {
                    tracing::warn!(
                        %id,
                        field = field_name,
                        error = %err,
                        "legacy filter failed, keeping its input"
                    );
                    text
                }
            })
    }

    /// Runs all render observers in registration order.
    pub fn run_card_did_render(&self, output: &mut RenderOutput, ctx: &RenderContext<'_>) {
        for (_, hook) in &self.card_did_render {
            hook(output, ctx);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut legacy: Vec<_> = self
            .legacy_filters
            .iter()
            .filter(|(_, hooks)| !hooks.is_empty())
            .map(|(name, hooks)| (name.as_str(), hooks.len()))
            .collect();
        legacy.sort_unstable();
        f.debug_struct("Hooks")
            .field("field_filter_count", &self.field_filters.len())
            .field("legacy_filters", &legacy)
            .field("card_did_render_count", &self.card_did_render.len())
            .finish()
    }
}

static GLOBAL_HOOKS: Lazy<RwLock<Arc<Hooks>>> = Lazy::new(|| RwLock::new(Arc::new(Hooks::new())));

/// The current process-wide hooks.
///
/// The returned value is immutable; later registrations do not affect it.
pub fn snapshot() -> Arc<Hooks> {
    GLOBAL_HOOKS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn update_global<R>(f: impl FnOnce(&mut Hooks) -> R) -> R {
    let mut guard = GLOBAL_HOOKS.write().unwrap_or_else(PoisonError::into_inner);
    // Clones only if a render still holds the previous snapshot
    f(Arc::make_mut(&mut *guard))
}

/// Appends a process-wide field filter.
pub fn register_general_filter<F>(f: F) -> HookId
where
    F: Fn(&str, &str, &str, &RenderContext<'_>) -> Result<String, FilterError>
        + Send
        + Sync
        + 'static,
{
    update_global(|hooks| hooks.add_field_filter(f))
}

/// Appends a process-wide legacy filter under `hook_name` (e.g. `fmod_upper`).
pub fn register_named_filter<F>(hook_name: impl Into<String>, f: F) -> HookId
where
    F: Fn(&str, &str, &[(String, String)], &str, &str) -> Result<String, FilterError>
        + Send
        + Sync
        + 'static,
{
    update_global(|hooks| hooks.add_legacy_filter(hook_name, f))
}

/// Appends a process-wide render observer.
pub fn register_card_did_render<F>(f: F) -> HookId
where
    F: Fn(&mut RenderOutput, &RenderContext<'_>) + Send + Sync + 'static,
{
    update_global(|hooks| hooks.add_card_did_render(f))
}

/// Removes a process-wide hook. Returns false if it was not registered.
pub fn unregister(id: HookId) -> bool {
    update_global(|hooks| hooks.remove(id))
}
