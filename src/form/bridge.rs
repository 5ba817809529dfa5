//! Debounced form-to-filter and filter-to-form synchronization.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::debounce;
use crate::params::{deep_equal, shallow_equal_coalesced, ParamsPatch};
use crate::source::QuerySource;

use super::FormBinding;

/// What the apply predicate gets to see for one settled form value.
#[derive(Debug)]
pub struct ApplyContext<'a, V> {
    pub form: &'a V,
    pub has_changed: bool,
    pub previous_filter: Option<&'a V>,
}

/// Decides whether a settled form value becomes the filter.
pub type ApplyPredicate<V> = Arc<dyn Fn(&ApplyContext<'_, V>) -> bool + Send + Sync>;

pub struct BridgeOptions<V> {
    pub debounce: Duration,
    pub equality_depth: usize,
    /// Defaults to "apply iff the value changed".
    pub should_apply: ApplyPredicate<V>,
}

fn apply_when_changed<V>(ctx: &ApplyContext<'_, V>) -> bool {
    ctx.has_changed
}

impl<V: 'static> BridgeOptions<V> {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            debounce: config.form_debounce(),
            equality_depth: config.equality_depth,
            should_apply: Arc::new(apply_when_changed::<V>),
        }
    }

    pub fn should_apply(
        mut self,
        predicate: impl Fn(&ApplyContext<'_, V>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.should_apply = Arc::new(predicate);
        self
    }
}

impl<V: 'static> Default for BridgeOptions<V> {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Keeps a form and a source's filter in step while alive.
///
/// - form → filter: each debounced form value is offered to the apply
///   predicate; when accepted it becomes the filter and a non-zero `skip`
///   is reset to 0.
/// - filter → form: every filter change that differs structurally from the
///   form's value is patched into the form. A cleared filter resets a
///   non-empty form to `V::default()`. The patched value then matches the
///   filter, so it does not bounce back as a change.
pub struct FilterFormBridge {
    tasks: Vec<JoinHandle<()>>,
}

impl FilterFormBridge {
    pub fn attach<S, V, B>(source: S, form: Arc<B>, options: BridgeOptions<V>) -> Self
    where
        S: QuerySource<V> + Clone + 'static,
        V: Clone + PartialEq + Default + Serialize + Send + Sync + 'static,
        B: FormBinding<V> + 'static,
    {
        let to_filter = tokio::spawn(form_to_filter(
            source.clone(),
            Arc::clone(&form),
            options.debounce,
            options.should_apply,
        ));
        let to_form = tokio::spawn(filter_to_form(source, form, options.equality_depth));
        Self {
            tasks: vec![to_filter, to_form],
        }
    }

    /// Stop both directions.
    pub fn detach(self) {}
}

impl Drop for FilterFormBridge {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn form_to_filter<S, V, B>(
    source: S,
    form: Arc<B>,
    window: Duration,
    should_apply: ApplyPredicate<V>,
) where
    S: QuerySource<V>,
    V: Clone + PartialEq + Serialize + Send + Sync + 'static,
    B: FormBinding<V>,
{
    let mut changes = form.value_changes();
    while debounce::next_settled(&mut changes, window).await {
        let value = changes.borrow_and_update().clone();
        let params = source.query_params();
        let previous = params.filter.as_ref();
        let has_changed = !shallow_equal_coalesced(&value, previous);

        let apply = should_apply(&ApplyContext {
            form: &value,
            has_changed,
            previous_filter: previous,
        });
        tracing::debug!(has_changed, apply, "Form value settled");
        if !apply {
            continue;
        }

        source.update(ParamsPatch::new().filter(value));
        if params.skip.is_some_and(|skip| skip != 0) {
            source.update(ParamsPatch::new().skip(0));
        }
    }
}

async fn filter_to_form<S, V, B>(source: S, form: Arc<B>, depth: usize)
where
    S: QuerySource<V>,
    V: Clone + PartialEq + Default + Serialize + Send + Sync + 'static,
    B: FormBinding<V>,
{
    let mut filters = source.subscribe_filter();
    loop {
        let filter = filters.borrow_and_update().clone();
        let current = form.value();
        match filter {
            Some(filter) => {
                if !deep_equal(&filter, &current, depth) {
                    tracing::debug!("Patching form from external filter change");
                    form.patch_value(filter);
                }
            }
            None => {
                if !shallow_equal_coalesced(&current, None) {
                    tracing::debug!("Clearing form after external filter clear");
                    form.patch_value(V::default());
                }
            }
        }
        if filters.changed().await.is_err() {
            return;
        }
    }
}
