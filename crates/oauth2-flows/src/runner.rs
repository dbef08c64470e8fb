//! Sequential step execution.
//!
//! Both flows are expressed as an ordered checklist of steps run against a
//! per-request context. [`StepRunner`] drives the checklist: steps run
//! strictly in order, one at a time, and the first failure ends the run.
//!
//! A step completes by resolving its future, which happens exactly once,
//! so a step can neither continue the chain twice nor skip completion
//! and still let the runner advance.

use std::fmt;

use async_trait::async_trait;

use crate::OAuthResult;

/// A context that knows how to execute the steps of one flow.
#[async_trait]
pub trait StepContext: Send {
    /// Identifier of a single step.
    type Step: Copy + fmt::Debug + Send + Sync + 'static;

    /// Value produced by the final step.
    type Output: Send;

    /// Executes a single step against this context.
    ///
    /// A step returns `Ok(None)` to continue, `Ok(Some(_))` to hand a result
    /// to the runner, or `Err(_)` to terminate the run.
    async fn run_step(&mut self, step: Self::Step) -> OAuthResult<Option<Self::Output>>;
}

/// Runs a fixed sequence of steps, short-circuiting on the first error.
#[derive(Debug, Clone, Copy)]
pub struct StepRunner<S: 'static> {
    name: &'static str,
    steps: &'static [S],
}

impl<S> StepRunner<S>
where
    S: Copy + fmt::Debug + Send + Sync + 'static,
{
    /// Creates a runner over the given ordered steps.
    #[must_use]
    pub const fn new(name: &'static str, steps: &'static [S]) -> Self {
        Self { name, steps }
    }

    /// Returns the flow name used in log events.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the ordered steps.
    #[must_use]
    pub fn steps(&self) -> &'static [S] {
        self.steps
    }

    /// Runs every step in order against `context`.
    ///
    /// Returns the first error, or the result of the last step. Results of
    /// earlier steps are discarded. An empty step list yields `Ok(None)`.
    pub async fn run<C>(&self, context: &mut C) -> OAuthResult<Option<C::Output>>
    where
        C: StepContext<Step = S>,
    {
        let mut output = None;

        for (position, step) in self.steps.iter().enumerate() {
            tracing::trace!(flow = self.name, step = ?step, position, "Running step");

            match context.run_step(*step).await {
                Ok(result) => output = result,
                Err(err) => {
                    tracing::debug!(
                        flow = self.name,
                        step = ?step,
                        error = %err.kind(),
                        "Step failed"
                    );
                    return Err(err);
                }
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, OAuthError};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStep {
        Pass,
        Emit(u32),
        Fail,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<TestStep>,
    }

    #[async_trait]
    impl StepContext for Recorder {
        type Step = TestStep;
        type Output = u32;

        async fn run_step(&mut self, step: TestStep) -> OAuthResult<Option<u32>> {
            self.calls.push(step);
            tokio::task::yield_now().await;
            match step {
                TestStep::Pass => Ok(None),
                TestStep::Emit(value) => Ok(Some(value)),
                TestStep::Fail => Err(OAuthError::invalid_request("step failed")),
            }
        }
    }

    #[tokio::test]
    async fn test_runs_steps_in_order_exactly_once() {
        static STEPS: &[TestStep] = &[
            TestStep::Pass,
            TestStep::Emit(1),
            TestStep::Pass,
            TestStep::Emit(7),
        ];
        let mut ctx = Recorder::default();

        let result = StepRunner::new("test", STEPS).run(&mut ctx).await.unwrap();

        assert_eq!(result, Some(7));
        assert_eq!(ctx.calls, STEPS.to_vec());
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        static STEPS: &[TestStep] = &[
            TestStep::Pass,
            TestStep::Fail,
            TestStep::Emit(3),
            TestStep::Fail,
        ];
        let mut ctx = Recorder::default();

        let err = StepRunner::new("test", STEPS).run(&mut ctx).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(ctx.calls, vec![TestStep::Pass, TestStep::Fail]);
    }

    #[tokio::test]
    async fn test_intermediate_results_are_discarded() {
        static STEPS: &[TestStep] = &[TestStep::Emit(5), TestStep::Pass];
        let mut ctx = Recorder::default();

        let result = StepRunner::new("test", STEPS).run(&mut ctx).await.unwrap();

        assert_eq!(result, None);
        assert_eq!(ctx.calls.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_step_list() {
        static STEPS: &[TestStep] = &[];
        let mut ctx = Recorder::default();

        let result = StepRunner::new("empty", STEPS).run(&mut ctx).await.unwrap();

        assert!(result.is_none());
        assert!(ctx.calls.is_empty());
    }

    #[tokio::test]
    async fn test_runner_is_reusable_across_contexts() {
        static STEPS: &[TestStep] = &[TestStep::Pass, TestStep::Emit(2)];
        let runner = StepRunner::new("test", STEPS);

        let mut first = Recorder::default();
        let mut second = Recorder::default();
        assert_eq!(runner.run(&mut first).await.unwrap(), Some(2));
        assert_eq!(runner.run(&mut second).await.unwrap(), Some(2));
        assert_eq!(first.calls, second.calls);
        assert_eq!(runner.name(), "test");
        assert_eq!(runner.steps().len(), 2);
    }
}
