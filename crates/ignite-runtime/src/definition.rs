#![forbid(unsafe_code)]

//! Component definitions: what a custom element renders and from which store.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use ignite_core::{IgniteConfig, RendererKind, global_config};
use ignite_render::{
    DiffStrategy, Fallback, FallbackReporter, NoDiffRegistry, RenderStrategy, Renderable,
    create_strategy,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::adapter::DynAdapter;
use crate::scope::AdapterFactory;

/// Facade callback contract violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FacadeError {
    #[error("states callback must return a JSON object, got {found}")]
    StatesNotObject { found: &'static str },

    #[error("no command named {name:?}")]
    UnknownCommand { name: String },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Handle for sending events to the component's adapter.
pub struct Sender<S, E> {
    adapter: DynAdapter<S, E>,
}

impl<S, E> Clone for Sender<S, E> {
    fn clone(&self) -> Self {
        Self {
            adapter: Rc::clone(&self.adapter),
        }
    }
}

impl<S: Clone + 'static, E: 'static> fmt::Debug for Sender<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("stopped", &self.adapter.is_stopped())
            .finish()
    }
}

impl<S: Clone + 'static, E: 'static> Sender<S, E> {
    pub(crate) fn new(adapter: DynAdapter<S, E>) -> Self {
        Self { adapter }
    }

    pub fn send(&self, event: impl Into<E>) {
        self.adapter.send(event.into());
    }
}

/// Named command bound by a `commands` callback.
pub type CommandFn = Rc<dyn Fn(Value)>;
pub type CommandTable = IndexMap<String, CommandFn>;

type StatesFn<S> = Rc<dyn Fn(&S) -> Value>;
type CommandsFn<S, E> = Rc<dyn Fn(&Sender<S, E>) -> CommandTable>;

/// Everything a view sees for one render pass.
pub struct RenderArgs<S, E> {
    pub state: S,
    send: Sender<S, E>,
    states: Map<String, Value>,
    commands: CommandTable,
}

impl<S: fmt::Debug, E> fmt::Debug for RenderArgs<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderArgs")
            .field("state", &self.state)
            .field("states", &self.states)
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<S: Clone + 'static, E: 'static> RenderArgs<S, E> {
    pub fn send(&self, event: impl Into<E>) {
        self.send.send(event);
    }

    /// A clonable sender, for use inside event handlers.
    pub fn sender(&self) -> Sender<S, E> {
        self.send.clone()
    }

    /// Derived values from the `states` callback.
    pub fn states(&self) -> &Map<String, Value> {
        &self.states
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Run a named command.
    ///
    /// # Errors
    /// [`FacadeError::UnknownCommand`] when no command has that name.
    pub fn command(&self, name: &str, payload: Value) -> Result<(), FacadeError> {
        let command = self
            .commands
            .get(name)
            .ok_or_else(|| FacadeError::UnknownCommand {
                name: name.to_string(),
            })?;
        command(payload);
        Ok(())
    }
}

/// Renders state into a [`Renderable`].
pub trait View<S, E> {
    fn render(&self, args: &RenderArgs<S, E>) -> Renderable;
}

impl<S, E, F> View<S, E> for F
where
    F: Fn(&RenderArgs<S, E>) -> Renderable,
{
    fn render(&self, args: &RenderArgs<S, E>) -> Renderable {
        self(args)
    }
}

/// Blueprint for a custom element.
pub struct ComponentDefinition<S, E> {
    factory: AdapterFactory<S, E>,
    view: Rc<dyn View<S, E>>,
    states: Option<StatesFn<S>>,
    commands: Option<CommandsFn<S, E>>,
    manage_lifecycle: bool,
    config: Option<IgniteConfig>,
    denylist: Option<Arc<NoDiffRegistry>>,
    fallback_hook: Option<Rc<dyn Fn(&Fallback)>>,
}

impl<S, E> Clone for ComponentDefinition<S, E> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            view: Rc::clone(&self.view),
            states: self.states.clone(),
            commands: self.commands.clone(),
            manage_lifecycle: self.manage_lifecycle,
            config: self.config.clone(),
            denylist: self.denylist.clone(),
            fallback_hook: self.fallback_hook.clone(),
        }
    }
}

impl<S, E> fmt::Debug for ComponentDefinition<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("factory", &self.factory)
            .field("states", &self.states.is_some())
            .field("commands", &self.commands.is_some())
            .field("manage_lifecycle", &self.manage_lifecycle)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: Clone + 'static, E: 'static> ComponentDefinition<S, E> {
    pub fn new(factory: impl Into<AdapterFactory<S, E>>, view: impl View<S, E> + 'static) -> Self {
        Self {
            factory: factory.into(),
            view: Rc::new(view),
            states: None,
            commands: None,
            manage_lifecycle: true,
            config: None,
            denylist: None,
            fallback_hook: None,
        }
    }

    /// Derive a JSON object of view-facing values from each state.
    #[must_use]
    pub fn with_states(mut self, states: impl Fn(&S) -> Value + 'static) -> Self {
        self.states = Some(Rc::new(states));
        self
    }

    #[must_use]
    pub fn with_commands(mut self, commands: impl Fn(&Sender<S, E>) -> CommandTable + 'static) -> Self {
        self.commands = Some(Rc::new(commands));
        self
    }

    /// When `false`, disconnect never stops the adapter; the caller does.
    #[must_use]
    pub fn with_manage_lifecycle(mut self, manage: bool) -> Self {
        self.manage_lifecycle = manage;
        self
    }

    /// Pin a configuration instead of reading the global one.
    #[must_use]
    pub fn with_config(mut self, config: IgniteConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn with_denylist(mut self, denylist: Arc<NoDiffRegistry>) -> Self {
        self.denylist = Some(denylist);
        self
    }

    /// Observe structural fallbacks of every instance.
    #[must_use]
    pub fn with_fallback_hook(mut self, hook: impl Fn(&Fallback) + 'static) -> Self {
        self.fallback_hook = Some(Rc::new(hook));
        self
    }

    pub fn factory(&self) -> &AdapterFactory<S, E> {
        &self.factory
    }

    pub fn manage_lifecycle(&self) -> bool {
        self.manage_lifecycle
    }

    /// The pinned configuration, else the current global one.
    pub fn config(&self) -> IgniteConfig {
        self.config.clone().unwrap_or_else(global_config)
    }

    pub(crate) fn build_strategy(&self) -> Box<dyn RenderStrategy> {
        let config = self.config();
        if config.renderer != RendererKind::IgniteJsx
            || (self.denylist.is_none() && self.fallback_hook.is_none())
        {
            return create_strategy(&config);
        }
        let mut reporter = FallbackReporter::new(config.log_level);
        if let Some(hook) = &self.fallback_hook {
            let hook = Rc::clone(hook);
            reporter = reporter.with_hook(move |fallback| hook(fallback));
        }
        let mut strategy = DiffStrategy::new(config).with_reporter(reporter);
        if let Some(denylist) = &self.denylist {
            strategy = strategy.with_denylist(Arc::clone(denylist));
        }
        Box::new(strategy)
    }

    pub(crate) fn render_args(&self, adapter: &DynAdapter<S, E>) -> Result<RenderArgs<S, E>, FacadeError> {
        let state = adapter.get_state();
        let states = match &self.states {
            None => Map::new(),
            Some(derive) => match derive(&state) {
                Value::Object(map) => map,
                other => {
                    return Err(FacadeError::StatesNotObject {
                        found: json_kind(&other),
                    });
                }
            },
        };
        let send = Sender::new(Rc::clone(adapter));
        let commands = self
            .commands
            .as_ref()
            .map(|bind| bind(&send))
            .unwrap_or_default();
        Ok(RenderArgs {
            state,
            send,
            states,
            commands,
        })
    }

    pub(crate) fn view(&self) -> &dyn View<S, E> {
        self.view.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::adapter::Scope;
    use crate::reducer::{ReducerAdapter, ReducerStore};

    fn counter() -> (Rc<ReducerStore<i64, i64>>, AdapterFactory<i64, i64>) {
        let store = Rc::new(ReducerStore::new(0, |s: &i64, a: &i64| s + a));
        let shared = Rc::clone(&store);
        let factory = AdapterFactory::new(Scope::Shared, move || {
            Rc::new(ReducerAdapter::new(Rc::clone(&shared), Scope::Shared)) as DynAdapter<i64, i64>
        });
        (store, factory)
    }

    fn blank(_: &RenderArgs<i64, i64>) -> Renderable {
        Renderable::Null
    }

    #[test]
    fn sender_debug_reports_stopped_adapter() {
        let (_, factory) = counter();
        let adapter = factory.create();
        let sender = Sender::new(Rc::clone(&adapter));
        assert_eq!(format!("{sender:?}"), "Sender { stopped: false }");
        adapter.stop();
        assert_eq!(format!("{sender:?}"), "Sender { stopped: true }");
    }

    #[test]
    fn states_must_be_an_object() {
        let (_, factory) = counter();
        let def = ComponentDefinition::new(factory.clone(), blank).with_states(|n| json!(n));
        let adapter = factory.create();
        assert_eq!(
            def.render_args(&adapter).err(),
            Some(FacadeError::StatesNotObject { found: "number" })
        );

        let def = ComponentDefinition::new(factory, blank)
            .with_states(|n| json!({ "double": n * 2 }));
        store_send(&adapter, 4);
        let args = def.render_args(&adapter).unwrap();
        assert_eq!(args.states().get("double"), Some(&json!(8)));
    }

    fn store_send(adapter: &DynAdapter<i64, i64>, n: i64) {
        adapter.send(n);
    }

    #[test]
    fn commands_are_bound_to_the_sender() {
        let (store, factory) = counter();
        let def = ComponentDefinition::new(factory.clone(), blank).with_commands(|send| {
            let send = send.clone();
            let mut table = CommandTable::new();
            table.insert(
                "add".into(),
                Rc::new(move |payload: Value| send.send(payload.as_i64().unwrap_or(0))),
            );
            table
        });
        let args = def.render_args(&factory.create()).unwrap();
        args.command("add", json!(5)).unwrap();
        assert_eq!(store.get_state(), 5);
        assert_eq!(
            args.command("remove", Value::Null),
            Err(FacadeError::UnknownCommand {
                name: "remove".into()
            })
        );
    }

    #[test]
    fn hook_receives_strategy_fallbacks() {
        let (_, factory) = counter();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let def = ComponentDefinition::new(factory, blank)
            .with_config(IgniteConfig::default().with_renderer(RendererKind::IgniteJsx))
            .with_fallback_hook(move |f| sink.borrow_mut().push(f.reason));
        let strategy = def.build_strategy();
        assert_eq!(strategy.name(), "ignite-jsx");
        assert!(seen.borrow().is_empty());
    }
}
