use crate::pipeline::{Args, Step, Value};
use crate::shared::{ContextId, ViewId, WindowId};
use std::collections::{BTreeSet, VecDeque};

/// Identity of the window/view that started a pipeline. Resolved against the
/// host on every step since either may be gone by then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Origin {
    pub window: Option<WindowId>,
    pub view: Option<ViewId>,
}

impl Origin {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn in_window(window: WindowId) -> Self {
        Self {
            window: Some(window),
            view: None,
        }
    }

    pub fn in_view(window: WindowId, view: ViewId) -> Self {
        Self {
            window: Some(window),
            view: Some(view),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineContext {
    id: ContextId,
    pub origin: Origin,
    pub input: Value,
    pub args: Args,
    steps: VecDeque<Step>,
    declared: BTreeSet<String>,
}

impl PipelineContext {
    pub(crate) fn new(id: ContextId, origin: Origin, steps: Vec<Step>) -> Self {
        Self {
            id,
            origin,
            input: Value::Empty,
            args: Args::new(),
            steps: steps.into(),
            declared: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn steps(&self) -> &VecDeque<Step> {
        &self.steps
    }

    pub fn is_exhausted(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn pop_step(&mut self) -> Option<Step> {
        self.steps.pop_front()
    }

    /// Whether the running step named `key` in its own args, as opposed to
    /// inheriting it from the collected `args`.
    pub fn declares(&self, key: &str) -> bool {
        self.declared.contains(key)
    }

    pub(crate) fn set_declared(&mut self, step: &Step) {
        self.declared = step.args.keys().cloned().collect();
    }

    /// Puts `steps` in front of the pending queue, keeping their order.
    pub fn prepend_steps(&mut self, steps: Vec<Step>) {
        for step in steps.into_iter().rev() {
            self.steps.push_front(step);
        }
    }

    pub fn take_steps(&mut self) -> Vec<Step> {
        self.steps.drain(..).collect()
    }

    pub fn replace_steps(&mut self, steps: Vec<Step>) {
        self.steps = steps.into();
    }

    pub(crate) fn fork(&self, id: ContextId, input: Value, steps: Vec<Step>) -> Self {
        Self {
            id,
            origin: self.origin,
            input,
            args: self.args.clone(),
            steps: steps.into(),
            declared: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(context: &PipelineContext) -> Vec<&str> {
        context.steps().iter().map(|step| step.name.as_str()).collect()
    }

    #[test]
    fn prepend_keeps_order_ahead_of_pending_steps() {
        let mut context = PipelineContext::new(
            ContextId::new(1),
            Origin::global(),
            vec![Step::new("show-panel")],
        );
        context.prepend_steps(vec![Step::new("split"), Step::new("confirm")]);
        assert_eq!(names(&context), vec!["split", "confirm", "show-panel"]);

        assert_eq!(context.pop_step(), Some(Step::new("split")));
        let rest = context.take_steps();
        assert_eq!(rest.len(), 2);
        assert!(context.is_exhausted());
    }

    #[test]
    fn fork_keeps_origin_and_args_with_a_fresh_queue() {
        let mut context = PipelineContext::new(
            ContextId::new(1),
            Origin::in_view(WindowId::new(1), ViewId::new(2)),
            vec![Step::new("show-panel")],
        );
        context
            .args
            .insert("branch".to_string(), serde_json::json!("main"));

        let child = context.fork(ContextId::new(5), Value::text("x"), vec![Step::new("confirm")]);
        assert_eq!(child.id(), ContextId::new(5));
        assert_eq!(child.origin, context.origin);
        assert_eq!(child.args, context.args);
        assert_eq!(child.input, Value::text("x"));
        assert_eq!(names(&child), vec!["confirm"]);
        assert_eq!(names(&context), vec!["show-panel"]);
    }

    #[test]
    fn declared_keys_follow_the_running_step_only() {
        let mut context = PipelineContext::new(ContextId::new(1), Origin::global(), Vec::new());
        context
            .args
            .insert("branch".to_string(), serde_json::json!("feature"));
        context.set_declared(&Step::new("switch").arg("main", serde_json::json!([])));
        assert!(context.declares("main"));
        assert!(!context.declares("branch"));

        context.set_declared(&Step::new("show-panel"));
        assert!(!context.declares("main"));
    }
}
